//! Sex marker parsing.

use super::FieldExtractor;
use crate::models::Sex;

// Female tokens are checked first so that "female" never reads as "male".
const FEMALE_TOKENS: [&str; 4] = ["nữ", "nu", "female", "f"];
const MALE_TOKENS: [&str; 3] = ["nam", "male", "m"];

/// Sex field extractor.
pub struct SexExtractor;

impl SexExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SexExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SexExtractor {
    type Output = Sex;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lower = text.to_lowercase();
        if FEMALE_TOKENS.iter().any(|token| lower.contains(token)) {
            Some(Sex::Female)
        } else if MALE_TOKENS.iter().any(|token| lower.contains(token)) {
            Some(Sex::Male)
        } else {
            None
        }
    }
}

/// Extract a sex marker from text.
pub fn extract_sex(text: &str) -> Option<Sex> {
    SexExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sex() {
        assert_eq!(extract_sex("Nữ"), Some(Sex::Female));
        assert_eq!(extract_sex("Nu / F"), Some(Sex::Female));
        assert_eq!(extract_sex("FEMALE"), Some(Sex::Female));
        assert_eq!(extract_sex("Nam"), Some(Sex::Male));
        assert_eq!(extract_sex("Nam / M"), Some(Sex::Male));
        assert_eq!(extract_sex("male"), Some(Sex::Male));
        assert_eq!(extract_sex("M"), Some(Sex::Male));
    }

    #[test]
    fn test_female_checked_before_male() {
        assert_eq!(extract_sex("Female"), Some(Sex::Female));
        assert_eq!(extract_sex("Giới tính Nữ"), Some(Sex::Female));
        assert_eq!(extract_sex("Nam / Nữ"), Some(Sex::Female));
    }

    #[test]
    fn test_extract_sex_none() {
        assert_eq!(extract_sex(""), None);
        assert_eq!(extract_sex("01/01/1990"), None);
        assert_eq!(extract_sex("X"), None);
        assert_eq!(extract_sex("xyz"), None);
    }
}
