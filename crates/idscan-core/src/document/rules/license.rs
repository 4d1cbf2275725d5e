//! Driving license class parsing.

use super::FieldExtractor;
use super::patterns::LICENSE_CLASS;

/// License class extractor: a letter A-F with an optional digit.
pub struct LicenseClassExtractor;

impl LicenseClassExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LicenseClassExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LicenseClassExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        LICENSE_CLASS.find(text).map(|m| m.as_str().to_string())
    }
}

/// Extract a license class such as `A1` or `B2`.
pub fn extract_license_class(text: &str) -> Option<String> {
    LicenseClassExtractor::new().extract(text)
}
