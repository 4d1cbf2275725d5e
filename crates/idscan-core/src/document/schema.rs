//! Per-document-type field tables.
//!
//! A table lists, in priority order, which label announces each field, where
//! its value is read from and how the value is parsed. A line is consumed by
//! the first entry whose field is still empty and whose keywords it contains.

use lazy_static::lazy_static;

use super::keywords::{self, KeywordSet};
use super::rules::{
    extract_date, extract_document_number, extract_id_card_number, extract_license_class,
    extract_sex,
};
use crate::models::{DocumentType, Field, FieldValue};

/// Where the value for a label line is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The line directly after the label.
    NextLine,
    /// The first following line long enough to hold a value, else the label line.
    NextCandidate,
    /// The label line with its keywords removed, else the following line.
    SameLineOrNext,
}

/// How a candidate string becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Date,
    Sex,
    PassportNumber,
    CitizenNumber,
    IdCardNumber,
    LicenseClass,
}

impl ValueKind {
    /// Typed kinds may fall back to the label line itself.
    pub fn is_typed(&self) -> bool {
        !matches!(self, ValueKind::Text)
    }

    /// Parse a candidate; `None` leaves the field unset.
    pub fn parse(&self, candidate: &str) -> Option<FieldValue> {
        match self {
            ValueKind::Text => {
                let text = candidate.trim();
                (!text.is_empty()).then(|| FieldValue::Text(text.to_string()))
            }
            ValueKind::Date => extract_date(candidate).map(FieldValue::Text),
            ValueKind::Sex => extract_sex(candidate).map(FieldValue::Sex),
            ValueKind::PassportNumber => {
                extract_document_number(candidate, &DocumentType::Passport).map(FieldValue::Text)
            }
            ValueKind::CitizenNumber => {
                extract_document_number(candidate, &DocumentType::CitizenId).map(FieldValue::Text)
            }
            ValueKind::IdCardNumber => extract_id_card_number(candidate).map(FieldValue::Text),
            ValueKind::LicenseClass => extract_license_class(candidate).map(FieldValue::Text),
        }
    }
}

/// One entry of a document type's field table.
#[derive(Debug)]
pub struct FieldRule {
    pub field: Field,
    pub keywords: &'static KeywordSet,
    pub source: ValueSource,
    pub kind: ValueKind,
}

impl FieldRule {
    fn new(
        field: Field,
        keywords: &'static KeywordSet,
        source: ValueSource,
        kind: ValueKind,
    ) -> Self {
        Self {
            field,
            keywords,
            source,
            kind,
        }
    }
}

lazy_static! {
    static ref PASSPORT_RULES: Vec<FieldRule> = {
        use ValueKind::*;
        use ValueSource::*;
        vec![
            FieldRule::new(Field::FullName, &keywords::FULL_NAME, NextLine, Text),
            FieldRule::new(
                Field::DateOfBirth,
                &keywords::DATE_OF_BIRTH,
                NextCandidate,
                Date,
            ),
            FieldRule::new(Field::Sex, &keywords::SEX, NextCandidate, Sex),
            FieldRule::new(
                Field::DateOfIssue,
                &keywords::DATE_OF_ISSUE,
                NextCandidate,
                Date,
            ),
            FieldRule::new(
                Field::DateOfExpiry,
                &keywords::DATE_OF_EXPIRY,
                NextCandidate,
                Date,
            ),
            FieldRule::new(
                Field::DocumentNumber,
                &keywords::DOCUMENT_NUMBER,
                NextCandidate,
                PassportNumber,
            ),
            FieldRule::new(
                Field::PlaceOfBirth,
                &keywords::PLACE_OF_BIRTH,
                NextLine,
                Text,
            ),
            FieldRule::new(
                Field::IdCardNumber,
                &keywords::ID_CARD_NUMBER,
                NextCandidate,
                IdCardNumber,
            ),
            FieldRule::new(Field::Address, &keywords::ADDRESS, NextLine, Text),
            FieldRule::new(
                Field::LicenseClass,
                &keywords::LICENSE_CLASS,
                NextCandidate,
                LicenseClass,
            ),
            FieldRule::new(
                Field::PlaceOfOrigin,
                &keywords::PLACE_OF_ORIGIN,
                NextLine,
                Text,
            ),
        ]
    };

    static ref CITIZEN_ID_RULES: Vec<FieldRule> = {
        use ValueKind::*;
        use ValueSource::*;
        vec![
            FieldRule::new(Field::FullName, &keywords::FULL_NAME, NextLine, Text),
            FieldRule::new(
                Field::DateOfBirth,
                &keywords::DATE_OF_BIRTH,
                SameLineOrNext,
                Date,
            ),
            FieldRule::new(Field::Sex, &keywords::SEX, SameLineOrNext, Sex),
            FieldRule::new(
                Field::DocumentNumber,
                &keywords::CITIZEN_NUMBER,
                SameLineOrNext,
                CitizenNumber,
            ),
            FieldRule::new(Field::Address, &keywords::ADDRESS, SameLineOrNext, Text),
            FieldRule::new(
                Field::PlaceOfOrigin,
                &keywords::PLACE_OF_ORIGIN,
                SameLineOrNext,
                Text,
            ),
            FieldRule::new(
                Field::Nationality,
                &keywords::NATIONALITY,
                SameLineOrNext,
                Text,
            ),
        ]
    };
}

/// Field table for a document type. Unknown types have an empty table.
pub fn rules_for(document_type: &DocumentType) -> &'static [FieldRule] {
    match document_type {
        DocumentType::Passport => PASSPORT_RULES.as_slice(),
        DocumentType::CitizenId => CITIZEN_ID_RULES.as_slice(),
        DocumentType::Other(_) => &[],
    }
}
