//! Batch processing command for multiple document images.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use idscan_core::models::config::IdScanConfig;
use idscan_core::region::CropStrategy;
use idscan_core::{DocumentRecord, DocumentType};

use super::extract::{OutputFormat, format_record};
use super::process::{Detections, process_image, save_crops};
use super::{load_config, resolve_document_type, write_in_dir};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Document type tag shared by all inputs
    #[arg(short, long)]
    document_type: String,

    /// Reject unknown document types
    #[arg(long)]
    strict: bool,

    /// Output directory; each image gets a sub-directory named after it
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each record
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<DocumentRecord>,
    strategy: Option<CropStrategy>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let strict = args.strict || config.extraction.strict_document_type;
    let document_type = resolve_document_type(&args.document_type, strict)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &document_type, &args, &config).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok((record, strategy)) => {
                results.push(ProcessResult {
                    path,
                    record: Some(record),
                    strategy: Some(strategy),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        strategy: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let successful = results.iter().filter(|r| r.record.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn is_image(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(
        ext.to_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" | "webp"
    )
}

/// Sidecar file next to `image` with the same stem.
fn sidecar(image: &Path, extension: &str) -> PathBuf {
    image.with_extension(extension)
}

async fn process_single_file(
    path: &Path,
    document_type: &DocumentType,
    args: &BatchArgs,
    config: &IdScanConfig,
) -> anyhow::Result<(DocumentRecord, CropStrategy)> {
    let text_path = sidecar(path, "txt");
    if !text_path.exists() {
        anyhow::bail!("Missing recognized text {}", text_path.display());
    }
    let text = fs::read_to_string(&text_path)?;

    let detections_path = sidecar(path, "json");
    let detections = if detections_path.exists() {
        Detections::from_file(&detections_path)?
    } else {
        debug!("No detections for {}", path.display());
        Detections::default()
    };

    let image = image::open(path)?;
    let outcome = process_image(image, text, &detections, document_type.clone(), config).await?;

    if let Some(output_dir) = &args.output_dir {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
        let target = output_dir.join(stem);
        save_crops(&outcome, &target)?;

        let extension = match args.format {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        };
        let content = format_record(&outcome.extraction.record, args.format)?;
        let written = write_in_dir(&target, &format!("record.{}", extension), &content)?;
        debug!("Wrote output to {}", written.display());
    }

    Ok((outcome.extraction.record, outcome.strategy))
}

fn strategy_name(strategy: &CropStrategy) -> &'static str {
    match strategy {
        CropStrategy::Detector { .. } => "detector",
        CropStrategy::ContentBounds { .. } => "content_bounds",
        CropStrategy::Original => "original",
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "document_type",
        "crop_strategy",
        "fields_extracted",
        "full_name",
        "document_number",
        "date_of_birth",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(record) = &result.record {
            wtr.write_record([
                filename,
                "success",
                record.document_type.as_str(),
                result.strategy.as_ref().map(strategy_name).unwrap_or(""),
                &record.fields().len().to_string(),
                record.full_name.as_deref().unwrap_or(""),
                record.document_number.as_deref().unwrap_or(""),
                record.date_of_birth.as_deref().unwrap_or(""),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("scan.PNG")));
        assert!(is_image(Path::new("dir/photo.jpeg")));
        assert!(!is_image(Path::new("scan.txt")));
        assert!(!is_image(Path::new("noext")));
    }

    #[test]
    fn test_sidecar_paths() {
        let image = Path::new("in/card_01.jpg");
        assert_eq!(sidecar(image, "txt"), PathBuf::from("in/card_01.txt"));
        assert_eq!(sidecar(image, "json"), PathBuf::from("in/card_01.json"));
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let results = vec![
            ProcessResult {
                path: PathBuf::from("a.png"),
                record: Some(DocumentRecord::new(DocumentType::Passport)),
                strategy: Some(CropStrategy::Original),
                error: None,
                processing_time_ms: 3,
            },
            ProcessResult {
                path: PathBuf::from("b.png"),
                record: None,
                strategy: None,
                error: Some("Missing recognized text b.txt".to_string()),
                processing_time_ms: 1,
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "a.png,success,passport,original,0,,,,3,");
        assert_eq!(
            lines[2],
            "b.png,error,,,,,,,1,Missing recognized text b.txt"
        );
    }
}
