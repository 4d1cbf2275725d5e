//! Typed value parsers for identity document fields.

pub mod dates;
pub mod license;
pub mod numbers;
pub mod patterns;
pub mod sex;

pub use dates::{
    DATE_FORMAT, DateExtractor, days_in_month, extract_date, is_leap_year, is_valid_date,
};
pub use license::{LicenseClassExtractor, extract_license_class};
pub use numbers::{
    DocumentNumberExtractor, NumberFormat, extract_document_number, extract_id_card_number,
};
pub use sex::{SexExtractor, extract_sex};

/// Trait for typed field parsers.
///
/// A parser either returns a fully validated value or `None`; it never
/// returns partially parsed input.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first valid value from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}
