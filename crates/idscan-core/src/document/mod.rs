//! Identity document field extraction module.

pub mod keywords;
mod parser;
pub mod rules;
pub mod schema;

pub use crate::models::RepeatPolicy;
pub use parser::{DocumentParser, ExtractionResult, FieldConflict, value_from_line};

use crate::error::ExtractionError;
use crate::models::{DocumentRecord, DocumentType};
use crate::text::NormalizedLine;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for identity document field extractors.
pub trait DocumentExtractor {
    /// Extract a record from already normalized lines.
    fn extract(&self, lines: &[NormalizedLine], document_type: &DocumentType) -> DocumentRecord;
}

/// Extract a record with default settings.
///
/// Unknown document types produce a record carrying only the type tag.
pub fn extract(lines: &[NormalizedLine], document_type: &DocumentType) -> DocumentRecord {
    DocumentParser::new().extract(lines, document_type)
}
