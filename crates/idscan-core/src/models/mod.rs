//! Data models for identity document processing.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, IdScanConfig, RegionConfig, RepeatPolicy};
pub use record::{DocumentRecord, DocumentType, Field, FieldValue, Sex};
