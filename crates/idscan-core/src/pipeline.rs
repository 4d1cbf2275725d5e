//! One-call document scan: face crop, document crop and field extraction.

use image::DynamicImage;
use tracing::info;

use crate::Result;
use crate::document::{DocumentParser, ExtractionResult};
use crate::models::{DocumentType, IdScanConfig};
use crate::region::{CandidateBox, DocumentCrop, RegionSelector, TextRecognizer};

/// Detector and recognizer output for one capture.
pub struct ScanInput<'a> {
    pub image: &'a DynamicImage,
    /// Recognized text of the whole capture.
    pub text: &'a str,
    /// Face detector boxes, best first.
    pub faces: &'a [CandidateBox],
    /// Object detector boxes in detector order.
    pub objects: &'a [CandidateBox],
    /// Recognizer used to score object boxes.
    pub recognizer: &'a dyn TextRecognizer,
}

/// Everything read from one capture.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub face: Option<DynamicImage>,
    pub document: DocumentCrop,
    pub extraction: ExtractionResult,
}

/// Run both halves of the pipeline with one configuration.
pub fn scan(
    input: ScanInput<'_>,
    document_type: &DocumentType,
    config: &IdScanConfig,
) -> Result<ScanOutput> {
    config.validate()?;

    let selector = RegionSelector::with_config(config.region.clone());
    let parser = DocumentParser::new().with_config(config.extraction.clone());

    let face = selector.select_face(input.image, input.faces)?;
    let document = selector.select_document(input.image, input.objects, input.recognizer)?;
    let extraction = parser.parse(input.text, document_type)?;

    info!(
        "Scanned {}: face {}, document strategy {:?}, {} fields",
        document_type,
        if face.is_some() { "found" } else { "missing" },
        document.strategy,
        extraction.record.fields().len()
    );

    Ok(ScanOutput {
        face,
        document,
        extraction,
    })
}
