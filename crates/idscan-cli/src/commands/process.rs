//! Process command - crop face and document from one image and extract fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, info};

use idscan_core::DocumentType;
use idscan_core::document::{DocumentParser, ExtractionResult};
use idscan_core::models::config::IdScanConfig;
use idscan_core::region::{
    CandidateBox, CropStrategy, PrecomputedRecognizer, RegionSelector, sanitize_candidates,
};

use super::extract::{OutputFormat, format_record, print_diagnostics};
use super::{load_config, resolve_document_type};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image (photo or scan of the document)
    #[arg(required = true)]
    input: PathBuf,

    /// Text file with recognizer output for the image
    #[arg(short, long)]
    text: PathBuf,

    /// JSON file with face and object detector boxes
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Document type tag (passport, citizen_id)
    #[arg(short, long)]
    document_type: String,

    /// Reject unknown document types
    #[arg(long)]
    strict: bool,

    /// Directory for face.png and document.png
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings and conflicts to stderr
    #[arg(long)]
    show_warnings: bool,
}

/// Detector output for one image.
#[derive(Debug, Default, Deserialize)]
pub struct Detections {
    /// Face boxes, best first.
    #[serde(default)]
    pub faces: Vec<CandidateBox>,
    /// Generic object boxes with the text recognized inside them.
    #[serde(default)]
    pub objects: Vec<ObjectDetection>,
}

/// One object box, optionally carrying the text recognized inside it.
#[derive(Debug, Deserialize)]
pub struct ObjectDetection {
    #[serde(flatten)]
    pub candidate: CandidateBox,
    #[serde(default)]
    pub text: Option<String>,
}

impl Detections {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn face_boxes(&self) -> Vec<CandidateBox> {
        sanitize_candidates(self.faces.iter().copied())
    }

    pub fn object_boxes(&self) -> Vec<CandidateBox> {
        sanitize_candidates(self.objects.iter().map(|o| o.candidate))
    }

    /// Recognizer answering region queries from the precomputed object texts.
    pub fn recognizer(&self, full_text: &str) -> PrecomputedRecognizer {
        self.objects
            .iter()
            .filter_map(|o| o.text.as_ref().map(|text| (o.candidate.rect, text)))
            .fold(PrecomputedRecognizer::new(full_text), |recognizer, (rect, text)| {
                recognizer.with_region(rect, text.as_str())
            })
    }
}

/// Everything produced for one image.
pub struct ProcessOutcome {
    pub extraction: ExtractionResult,
    pub face: Option<DynamicImage>,
    pub document: DynamicImage,
    pub strategy: CropStrategy,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !args.text.exists() {
        anyhow::bail!("Text file not found: {}", args.text.display());
    }

    let strict = args.strict || config.extraction.strict_document_type;
    let document_type = resolve_document_type(&args.document_type, strict)?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Loading image...");

    let image = image::open(&args.input)?;
    let text = fs::read_to_string(&args.text)?;
    let detections = match &args.detections {
        Some(path) => Detections::from_file(path)?,
        None => Detections::default(),
    };

    pb.set_message("Selecting regions and extracting fields...");
    let outcome = process_image(image, text, &detections, document_type, &config).await?;
    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        let written = save_crops(&outcome, output_dir)?;
        for path in written {
            println!("{} Wrote {}", style("✓").green(), path.display());
        }
    }

    if args.show_warnings {
        print_diagnostics(&outcome.extraction);
    }

    eprintln!(
        "{} Document crop: {}",
        style("ℹ").blue(),
        describe_strategy(&outcome.strategy)
    );
    if outcome.face.is_none() {
        eprintln!("{} No face found", style("ℹ").blue());
    }

    let output = format_record(&outcome.extraction.record, args.format)?;
    println!("{}", output);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run field extraction, face selection and document selection concurrently.
pub async fn process_image(
    image: DynamicImage,
    text: String,
    detections: &Detections,
    document_type: DocumentType,
    config: &IdScanConfig,
) -> anyhow::Result<ProcessOutcome> {
    let image = Arc::new(image);
    let selector = RegionSelector::with_config(config.region.clone());
    let parser = DocumentParser::new().with_config(config.extraction.clone());
    let recognizer = detections.recognizer(&text);
    let face_boxes = detections.face_boxes();
    let object_boxes = detections.object_boxes();

    let extraction_task = tokio::task::spawn_blocking(move || parser.parse(&text, &document_type));

    let face_task = {
        let image = Arc::clone(&image);
        let selector = selector.clone();
        tokio::task::spawn_blocking(move || selector.select_face(&image, &face_boxes))
    };

    let document_task = {
        let image = Arc::clone(&image);
        tokio::task::spawn_blocking(move || {
            selector.select_document(&image, &object_boxes, &recognizer)
        })
    };

    let (extraction, face, document) = tokio::try_join!(extraction_task, face_task, document_task)?;
    let document = document?;

    Ok(ProcessOutcome {
        extraction: extraction?,
        face: face?,
        document: document.image,
        strategy: document.strategy,
    })
}

/// Write `face.png` (when present) and `document.png` into `output_dir`.
pub fn save_crops(outcome: &ProcessOutcome, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    if let Some(face) = &outcome.face {
        let path = output_dir.join("face.png");
        face.save(&path)?;
        written.push(path);
    }

    let path = output_dir.join("document.png");
    outcome.document.save(&path)?;
    written.push(path);

    Ok(written)
}

pub fn describe_strategy(strategy: &CropStrategy) -> String {
    match strategy {
        CropStrategy::Detector { index, score, rect } => format!(
            "detector box {} (score {:.3}) at {},{} {}x{}",
            index,
            score,
            rect.left,
            rect.top,
            rect.width(),
            rect.height()
        ),
        CropStrategy::ContentBounds { rect } => format!(
            "content bounds at {},{} {}x{}",
            rect.left,
            rect.top,
            rect.width(),
            rect.height()
        ),
        CropStrategy::Original => "original image".to_string(),
    }
}
