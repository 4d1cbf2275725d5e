//! Normalization of raw OCR text into label/value candidate lines.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// One cleaned line of recognized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLine {
    /// Position in the normalized sequence (contiguous from 0).
    pub index: usize,
    /// Line number in the raw recognizer output.
    pub source_index: usize,
    /// Trimmed, whitespace-collapsed text without colon separators.
    pub text: String,
}

impl NormalizedLine {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Split raw OCR output into cleaned, non-empty lines.
///
/// Each line loses `:` and `：`, has whitespace runs collapsed to one space
/// and is trimmed. Blank lines are dropped; reading order is kept.
pub fn normalize(raw_text: &str) -> Vec<NormalizedLine> {
    raw_text
        .lines()
        .enumerate()
        .filter_map(|(source_index, line)| {
            let cleaned = normalize_line(line);
            (!cleaned.is_empty()).then_some((source_index, cleaned))
        })
        .enumerate()
        .map(|(index, (source_index, text))| NormalizedLine {
            index,
            source_index,
            text,
        })
        .collect()
}

/// Clean a single line.
pub fn normalize_line(line: &str) -> String {
    let stripped = line.replace([':', '：'], "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}
