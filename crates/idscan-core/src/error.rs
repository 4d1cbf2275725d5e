//! Error types for the idscan-core library.

use thiserror::Error;

/// Main error type for the idscan library.
#[derive(Error, Debug)]
pub enum IdScanError {
    /// Region selection error.
    #[error("region error: {0}")]
    Region(#[from] RegionError),

    /// Text recognition error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to cropping the source image.
#[derive(Error, Debug)]
pub enum RegionError {
    /// The source image has no pixels to crop from.
    #[error("invalid source image: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
}

/// Errors reported by an external text recognizer.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors related to document field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The caller asked for strict validation and the type is not supported.
    #[error("unknown document type: {0}")]
    UnknownDocumentType(String),
}

/// Result type for the idscan library.
pub type Result<T> = std::result::Result<T, IdScanError>;
