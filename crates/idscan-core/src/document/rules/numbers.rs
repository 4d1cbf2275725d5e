//! Document and identity card number parsing.

use regex::Regex;

use super::FieldExtractor;
use super::patterns::{CITIZEN_NUMBER, PASSPORT_NUMBER};
use crate::models::DocumentType;

/// Shape of a document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// One uppercase letter followed by seven digits.
    Passport,
    /// Nine or twelve digits.
    Citizen,
}

impl NumberFormat {
    /// Number format used by a document type, if it has one.
    pub fn for_document(document_type: &DocumentType) -> Option<Self> {
        match document_type {
            DocumentType::Passport => Some(NumberFormat::Passport),
            DocumentType::CitizenId => Some(NumberFormat::Citizen),
            DocumentType::Other(_) => None,
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            NumberFormat::Passport => &*PASSPORT_NUMBER,
            NumberFormat::Citizen => &*CITIZEN_NUMBER,
        }
    }
}

/// Document number extractor for one number format.
pub struct DocumentNumberExtractor {
    format: NumberFormat,
}

impl DocumentNumberExtractor {
    pub fn new(format: NumberFormat) -> Self {
        Self { format }
    }
}

impl FieldExtractor for DocumentNumberExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.format.pattern().find(text).map(|m| m.as_str().to_string())
    }
}

/// Extract the document number for a document type.
///
/// Unknown document types have no number format and yield `None`.
pub fn extract_document_number(text: &str, document_type: &DocumentType) -> Option<String> {
    NumberFormat::for_document(document_type)
        .and_then(|format| DocumentNumberExtractor::new(format).extract(text))
}

/// Extract a 9 or 12 digit identity card number.
pub fn extract_id_card_number(text: &str) -> Option<String> {
    DocumentNumberExtractor::new(NumberFormat::Citizen).extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_passport_number() {
        let passport = DocumentType::Passport;
        let number = |text: &str| extract_document_number(text, &passport);

        assert_eq!(number("A1234567").as_deref(), Some("A1234567"));
        assert_eq!(number("No. C9876543 ").as_deref(), Some("C9876543"));
        assert_eq!(number("a1234567"), None);
        assert_eq!(number("A123456"), None);
    }

    #[test]
    fn test_citizen_number() {
        let citizen = DocumentType::CitizenId;
        let number = |text: &str| extract_document_number(text, &citizen);

        assert_eq!(number("012345678901").as_deref(), Some("012345678901"));
        assert_eq!(number("Số 123456789").as_deref(), Some("123456789"));
        assert_eq!(number("12345678901"), None);
        assert_eq!(number("A1234567"), None);
    }

    #[test]
    fn test_document_number_depends_on_type() {
        let passport = DocumentType::Passport;
        let visa = DocumentType::Other("visa".into());
        assert_eq!(extract_document_number("012345678901", &passport), None);
        assert_eq!(extract_document_number("A1234567", &visa), None);
    }

    #[test]
    fn test_id_card_number() {
        let number = |text: &str| extract_id_card_number(text);

        assert_eq!(number("123456789").as_deref(), Some("123456789"));
        assert_eq!(number("CMND 001199012345").as_deref(), Some("001199012345"));
        assert_eq!(number("1234567"), None);
    }
}
