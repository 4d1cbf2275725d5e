//! Keyword-driven field extractor.
//!
//! Lines are scanned top to bottom. A line that contains a field's label
//! keywords supplies the value for that field, either from the label line
//! itself or from the lines that follow it. The first valid value wins.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::keywords::KeywordSet;
use super::schema::{FieldRule, ValueSource, rules_for};
use super::{DocumentExtractor, Result};
use crate::models::{
    DocumentRecord, DocumentType, ExtractionConfig, Field, FieldValue, RepeatPolicy,
};
use crate::text::{NormalizedLine, normalize};

/// Characters separating a bilingual label from its value, e.g. `Số / No.`.
const LABEL_SEPARATORS: &[char] = &['/', '|', '-', '.', ','];

/// A later label line that disagreed with an already extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConflict {
    pub field: Field,
    /// Value kept in the record.
    pub kept: String,
    /// Valid value found later and discarded.
    pub ignored: String,
    /// Normalized line index of the later label.
    pub line: usize,
}

/// Result of document extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: DocumentRecord,
    /// Normalized lines the record was read from.
    pub lines: Vec<NormalizedLine>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Repeated labels with differing values.
    pub conflicts: Vec<FieldConflict>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Keyword-driven document parser.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    config: ExtractionConfig,
}

/// Fold accumulator for one pass over the lines.
struct ScanState {
    record: DocumentRecord,
    conflicts: Vec<FieldConflict>,
}

impl ScanState {
    fn new(document_type: DocumentType) -> Self {
        Self {
            record: DocumentRecord::new(document_type),
            conflicts: Vec::new(),
        }
    }

    fn with_value(self, field: Field, value: FieldValue) -> Self {
        Self {
            record: self.record.with_value(field, value),
            ..self
        }
    }

    fn with_conflict(mut self, conflict: FieldConflict) -> Self {
        self.conflicts.push(conflict);
        self
    }
}

impl DocumentParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how repeated labels are handled.
    pub fn with_repeat_policy(mut self, policy: RepeatPolicy) -> Self {
        self.config.repeat_policy = policy;
        self
    }

    /// Set the length a following line must exceed to hold a value.
    pub fn with_min_candidate_len(mut self, len: usize) -> Self {
        self.config.min_candidate_len = len;
        self
    }

    /// Reject unsupported document types instead of returning a bare record.
    pub fn with_strict_document_type(mut self, strict: bool) -> Self {
        self.config.strict_document_type = strict;
        self
    }

    /// Normalize `text` and extract a record, collecting diagnostics.
    pub fn parse(&self, text: &str, document_type: &DocumentType) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        if self.config.strict_document_type {
            DocumentType::parse_strict(document_type.as_str())?;
        }

        info!(
            "Parsing {} document from {} characters of text",
            document_type,
            text.len()
        );

        let lines = normalize(text);
        if lines.is_empty() {
            warnings.push("No text lines to extract from".to_string());
        }

        if !document_type.is_supported() {
            warn!("Unsupported document type '{}'", document_type);
            warnings.push(format!(
                "Unsupported document type '{}'; no fields extracted",
                document_type
            ));
        }

        let state = self.scan(&lines, document_type);

        for rule in rules_for(document_type) {
            if !state.record.is_set(rule.field) {
                warnings.push(format!("Could not extract {}", rule.field));
            }
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Extracted {} fields in {}ms with {} warnings",
            state.record.fields().len(),
            processing_time_ms,
            warnings.len()
        );

        Ok(ExtractionResult {
            record: state.record,
            lines,
            warnings,
            conflicts: state.conflicts,
            processing_time_ms,
        })
    }

    fn scan(&self, lines: &[NormalizedLine], document_type: &DocumentType) -> ScanState {
        let rules = rules_for(document_type);
        (0..lines.len()).fold(ScanState::new(document_type.clone()), |state, position| {
            self.scan_line(state, rules, lines, position)
        })
    }

    fn scan_line(
        &self,
        state: ScanState,
        rules: &[FieldRule],
        lines: &[NormalizedLine],
        position: usize,
    ) -> ScanState {
        let line = &lines[position];
        let lower = line.text.to_lowercase();
        debug!("Processing line {}: {}", line.index, lower);

        let pending = rules
            .iter()
            .find(|rule| !state.record.is_set(rule.field) && rule.keywords.matches(&lower));

        match pending {
            Some(rule) => match self.read_value(rule, lines, position) {
                Some(value) => {
                    debug!("{} extracted: {}", rule.field, value);
                    state.with_value(rule.field, value)
                }
                None => {
                    debug!(
                        "No valid {} found for label on line {}",
                        rule.field, line.index
                    );
                    state
                }
            },
            None if self.config.repeat_policy == RepeatPolicy::ReportConflicts => {
                self.check_repeat(state, rules, lines, position, &lower)
            }
            None => state,
        }
    }

    fn check_repeat(
        &self,
        state: ScanState,
        rules: &[FieldRule],
        lines: &[NormalizedLine],
        position: usize,
        lower: &str,
    ) -> ScanState {
        let line = &lines[position];
        let Some(rule) = rules.iter().find(|rule| rule.keywords.matches(lower)) else {
            return state;
        };
        let Some(kept) = state.record.get(rule.field) else {
            return state;
        };
        let Some(value) = self.read_value(rule, lines, position) else {
            return state;
        };

        let ignored = value.to_string();
        if ignored == kept {
            return state;
        }

        warn!(
            "Conflicting {} on line {}: keeping '{}', ignoring '{}'",
            rule.field, line.index, kept, ignored
        );
        state.with_conflict(FieldConflict {
            field: rule.field,
            kept,
            ignored,
            line: line.index,
        })
    }

    fn read_value(
        &self,
        rule: &FieldRule,
        lines: &[NormalizedLine],
        position: usize,
    ) -> Option<FieldValue> {
        let line = &lines[position];
        let following = &lines[position + 1..];
        let next = following.first().map(NormalizedLine::as_str);
        let min_len = self.config.min_candidate_len;

        match rule.source {
            ValueSource::NextLine => next.and_then(|candidate| rule.kind.parse(candidate)),
            ValueSource::NextCandidate => {
                let candidate = following
                    .iter()
                    .map(NormalizedLine::as_str)
                    .find(|text| text.chars().count() > min_len)
                    .unwrap_or(line.as_str());
                rule.kind.parse(candidate)
            }
            ValueSource::SameLineOrNext if rule.kind.is_typed() => {
                let remainder = label_remainder(line.as_str(), rule.keywords);
                (!remainder.is_empty())
                    .then(|| rule.kind.parse(&remainder))
                    .flatten()
                    .or_else(|| {
                        let candidate = next.filter(|text| text.chars().count() > min_len)?;
                        rule.kind.parse(candidate)
                    })
                    .or_else(|| rule.kind.parse(line.as_str()))
            }
            ValueSource::SameLineOrNext => {
                value_from_line(line.as_str(), rule.keywords, next, min_len)
                    .and_then(|candidate| rule.kind.parse(&candidate))
            }
        }
    }
}

impl DocumentExtractor for DocumentParser {
    fn extract(&self, lines: &[NormalizedLine], document_type: &DocumentType) -> DocumentRecord {
        self.scan(lines, document_type).record
    }
}

/// Value written after the label on the same line, else the next line.
///
/// The remainder is used when it is longer than `min_len` characters and
/// holds no further label keyword. Otherwise the next line is used when it
/// is longer than `min_len`.
pub fn value_from_line(
    line: &str,
    keywords: &KeywordSet,
    next_line: Option<&str>,
    min_len: usize,
) -> Option<String> {
    let remainder = label_remainder(line, keywords);
    if remainder.chars().count() > min_len && !keywords.matches(&remainder) {
        return Some(remainder);
    }
    next_line
        .filter(|text| text.chars().count() > min_len)
        .map(str::to_string)
}

fn label_remainder(line: &str, keywords: &KeywordSet) -> String {
    let stripped = keywords.strip(line);
    let words: Vec<&str> = stripped.split_whitespace().collect();
    words
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || LABEL_SEPARATORS.contains(&c))
        .to_string()
}
