//! Configuration structures for region selection and field extraction.

use serde::{Deserialize, Serialize};

use crate::error::IdScanError;

/// Main configuration for the idscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdScanConfig {
    /// Face and document cropping configuration.
    pub region: RegionConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Region selector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Padding added on each side of a face box, as a fraction of its size.
    pub face_padding: f32,

    /// Target face crop aspect ratio (width / height).
    pub face_aspect_ratio: f32,

    /// Pixel margin added around the selected document box.
    pub document_margin: i32,

    /// Minimum box width and height as a fraction of the image dimensions.
    pub min_document_fraction: f32,

    /// Smallest accepted document aspect ratio (width / height).
    pub min_aspect_ratio: f32,

    /// Largest accepted document aspect ratio (width / height).
    pub max_aspect_ratio: f32,

    /// Score multiplier for boxes outside the accepted aspect range.
    pub aspect_penalty: f32,

    /// Number of text lines at which text density saturates.
    pub max_text_lines: usize,

    /// Grayscale value below which a pixel counts as content (0 - 255).
    pub content_threshold: u8,

    /// Pixel margin added around detected content bounds.
    pub content_margin: i32,

    /// Sharpen and correct brightness before recognizing candidate regions.
    pub enhance_for_scoring: bool,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            face_padding: 0.4,
            face_aspect_ratio: 4.0 / 5.0,
            document_margin: 10,
            min_document_fraction: 0.4,
            min_aspect_ratio: 0.5,
            max_aspect_ratio: 2.0,
            aspect_penalty: 0.5,
            max_text_lines: 10,
            content_threshold: 200,
            content_margin: 10,
            enhance_for_scoring: true,
        }
    }
}

/// How repeated occurrences of an already extracted field are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// Keep the first value and ignore later occurrences.
    #[default]
    FirstWins,
    /// Keep the first value and report later occurrences that disagree.
    ReportConflicts,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Handling of repeated labels.
    pub repeat_policy: RepeatPolicy,

    /// Candidate lines for typed fields must be longer than this.
    pub min_candidate_len: usize,

    /// Reject unknown document types instead of returning a type-only record.
    pub strict_document_type: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            repeat_policy: RepeatPolicy::FirstWins,
            min_candidate_len: 2,
            strict_document_type: false,
        }
    }
}

impl IdScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject values the selector cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        let region = &self.region;
        let invalid = |message: String| Err(IdScanError::Config(message));

        if !(region.face_padding >= 0.0) {
            return invalid(format!("face_padding must be >= 0, got {}", region.face_padding));
        }
        if !(region.face_aspect_ratio > 0.0) {
            return invalid(format!(
                "face_aspect_ratio must be > 0, got {}",
                region.face_aspect_ratio
            ));
        }
        if !(region.min_aspect_ratio > 0.0 && region.min_aspect_ratio <= region.max_aspect_ratio) {
            return invalid(format!(
                "aspect ratio range {}..={} is empty",
                region.min_aspect_ratio, region.max_aspect_ratio
            ));
        }
        if !(0.0..=1.0).contains(&region.min_document_fraction) {
            return invalid(format!(
                "min_document_fraction must be within 0..=1, got {}",
                region.min_document_fraction
            ));
        }
        if region.max_text_lines == 0 {
            return invalid("max_text_lines must be at least 1".to_string());
        }
        Ok(())
    }
}
