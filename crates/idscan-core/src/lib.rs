//! Core library for identity document understanding.
//!
//! This crate provides:
//! - Region selection (face crop and document crop with deterministic fallback)
//! - OCR line normalization
//! - Keyword-driven field extraction for passports and citizen ID cards
//! - Typed value parsers (dates, sex, document numbers, license classes)
//! - A one-call [`scan`] running both halves on a capture

pub mod document;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod region;
pub mod text;

pub use document::{DocumentExtractor, DocumentParser, ExtractionResult, RepeatPolicy, extract};
pub use error::{IdScanError, Result};
pub use models::config::IdScanConfig;
pub use models::record::{DocumentRecord, DocumentType, Field, Sex};
pub use pipeline::{ScanInput, ScanOutput, scan};
pub use region::{
    CandidateBox, CropStrategy, DocumentCrop, PixelRect, RegionSelector, TextRecognizer,
    select_document, select_face,
};
pub use text::{NormalizedLine, normalize};
