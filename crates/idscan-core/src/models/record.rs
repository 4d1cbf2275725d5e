//! Structured identity document record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Kind of identity document the text was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    /// Passport (hộ chiếu).
    Passport,
    /// Citizen identity card (căn cước công dân).
    CitizenId,
    /// Any other tag; extraction yields a type-only record.
    Other(String),
}

impl DocumentType {
    /// Map a caller-supplied tag to a document type, keeping unknown tags.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "passport" => Self::Passport,
            "citizen_id" => Self::CitizenId,
            _ => Self::Other(tag.to_string()),
        }
    }

    /// Like [`DocumentType::from_tag`], but rejects unsupported tags.
    pub fn parse_strict(tag: &str) -> Result<Self, ExtractionError> {
        match Self::from_tag(tag) {
            Self::Other(tag) => Err(ExtractionError::UnknownDocumentType(tag)),
            known => Ok(known),
        }
    }

    /// The canonical tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passport => "passport",
            Self::CitizenId => "citizen_id",
            Self::Other(tag) => tag,
        }
    }

    /// Whether the extractor has a field table for this type.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for DocumentType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<DocumentType> for String {
    fn from(document_type: DocumentType) -> Self {
        document_type.as_str().to_string()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical sex classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            _ => Err(()),
        }
    }
}

/// A personal-data field of a [`DocumentRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    DateOfBirth,
    Sex,
    DateOfIssue,
    DateOfExpiry,
    DocumentNumber,
    PlaceOfBirth,
    IdCardNumber,
    Address,
    LicenseClass,
    PlaceOfOrigin,
    Nationality,
}

impl Field {
    /// All fields in record order.
    pub const ALL: [Field; 12] = [
        Field::FullName,
        Field::DateOfBirth,
        Field::Sex,
        Field::DateOfIssue,
        Field::DateOfExpiry,
        Field::DocumentNumber,
        Field::PlaceOfBirth,
        Field::IdCardNumber,
        Field::Address,
        Field::LicenseClass,
        Field::PlaceOfOrigin,
        Field::Nationality,
    ];

    /// Field name as used in serialized records.
    pub fn name(&self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::DateOfBirth => "date_of_birth",
            Field::Sex => "sex",
            Field::DateOfIssue => "date_of_issue",
            Field::DateOfExpiry => "date_of_expiry",
            Field::DocumentNumber => "document_number",
            Field::PlaceOfBirth => "place_of_birth",
            Field::IdCardNumber => "id_card_number",
            Field::Address => "address",
            Field::LicenseClass => "license_class",
            Field::PlaceOfOrigin => "place_of_origin",
            Field::Nationality => "nationality",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated value ready to be stored in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Sex(Sex),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Sex(sex) => sex.fmt(f),
        }
    }
}

/// Structured personal data read from one identity document.
///
/// Every field is optional. A field is only present when its value passed
/// typed validation; absent fields are omitted from serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document type tag.
    pub document_type: DocumentType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Date of birth, `DD/MM/YYYY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,

    /// Date of issue, `DD/MM/YYYY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_issue: Option<String>,

    /// Date of expiry, `DD/MM/YYYY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_expiry: Option<String>,

    /// Passport number or citizen ID number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,

    /// Legacy identity card (CMND) number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_card_number: Option<String>,

    /// Address or place of residence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

impl DocumentRecord {
    /// Create an empty record carrying only the type tag.
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            full_name: None,
            date_of_birth: None,
            sex: None,
            date_of_issue: None,
            date_of_expiry: None,
            document_number: None,
            place_of_birth: None,
            id_card_number: None,
            address: None,
            license_class: None,
            place_of_origin: None,
            nationality: None,
        }
    }

    /// Value of a field rendered as a string.
    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::Sex => self.sex.map(|s| s.as_str().to_string()),
            other => self.text_slot(other).and_then(|v| v.clone()),
        }
    }

    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Sex => self.sex.is_some(),
            other => self.text_slot(other).is_some_and(|v| v.is_some()),
        }
    }

    /// Return a copy of the record with `field` set to `value`.
    pub fn with_value(mut self, field: Field, value: FieldValue) -> Self {
        match (field, value) {
            (Field::Sex, FieldValue::Sex(sex)) => self.sex = Some(sex),
            (Field::Sex, FieldValue::Text(text)) => self.sex = text.parse().ok(),
            (field, value) => {
                if let Some(slot) = self.text_slot_mut(field) {
                    *slot = Some(value.to_string());
                }
            }
        }
        self
    }

    /// Present fields in record order as `(name, value)` pairs.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        Field::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (f.name(), v)))
            .collect()
    }

    /// True when no field besides the type tag is present.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| !self.is_set(*f))
    }

    fn text_slot(&self, field: Field) -> Option<&Option<String>> {
        Some(match field {
            Field::FullName => &self.full_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::DateOfIssue => &self.date_of_issue,
            Field::DateOfExpiry => &self.date_of_expiry,
            Field::DocumentNumber => &self.document_number,
            Field::PlaceOfBirth => &self.place_of_birth,
            Field::IdCardNumber => &self.id_card_number,
            Field::Address => &self.address,
            Field::LicenseClass => &self.license_class,
            Field::PlaceOfOrigin => &self.place_of_origin,
            Field::Nationality => &self.nationality,
            Field::Sex => return None,
        })
    }

    fn text_slot_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        Some(match field {
            Field::FullName => &mut self.full_name,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::DateOfIssue => &mut self.date_of_issue,
            Field::DateOfExpiry => &mut self.date_of_expiry,
            Field::DocumentNumber => &mut self.document_number,
            Field::PlaceOfBirth => &mut self.place_of_birth,
            Field::IdCardNumber => &mut self.id_card_number,
            Field::Address => &mut self.address,
            Field::LicenseClass => &mut self.license_class,
            Field::PlaceOfOrigin => &mut self.place_of_origin,
            Field::Nationality => &mut self.nationality,
            Field::Sex => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_type_tags() {
        assert_eq!(DocumentType::from_tag("passport"), DocumentType::Passport);
        assert_eq!(
            DocumentType::from_tag("citizen_id"),
            DocumentType::CitizenId
        );
        assert_eq!(
            DocumentType::from_tag("driving_license"),
            DocumentType::Other("driving_license".to_string())
        );
        assert!(DocumentType::parse_strict("visa").is_err());
        let strict = DocumentType::parse_strict("passport").unwrap();
        assert_eq!(strict, DocumentType::Passport);
    }

    #[test]
    fn test_with_value_sets_single_field() {
        let name = FieldValue::Text("NGUYEN VAN A".to_string());
        let record = DocumentRecord::new(DocumentType::Passport)
            .with_value(Field::FullName, name)
            .with_value(Field::Sex, FieldValue::Sex(Sex::Male));

        assert_eq!(record.full_name.as_deref(), Some("NGUYEN VAN A"));
        assert_eq!(record.sex, Some(Sex::Male));
        assert!(!record.is_set(Field::DateOfBirth));
        assert_eq!(
            record.fields(),
            vec![
                ("full_name", "NGUYEN VAN A".to_string()),
                ("sex", "male".to_string())
            ]
        );
    }

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let record = DocumentRecord::new(DocumentType::CitizenId)
            .with_value(Field::Nationality, FieldValue::Text("Việt Nam".to_string()));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "document_type": "citizen_id", "nationality": "Việt Nam" })
        );

        let back: DocumentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_empty_record() {
        let record = DocumentRecord::new(DocumentType::Other("visa".to_string()));
        assert!(record.is_empty());
        assert!(record.fields().is_empty());
    }
}
