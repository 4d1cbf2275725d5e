//! Extract command - read fields from recognized document text.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use idscan_core::DocumentRecord;
use idscan_core::document::{DocumentParser, ExtractionResult};

use super::{load_config, resolve_document_type};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file with recognizer output, one line per text line
    #[arg(required = true)]
    input: PathBuf,

    /// Document type tag (passport, citizen_id)
    #[arg(short, long)]
    document_type: String,

    /// Reject unknown document types
    #[arg(long)]
    strict: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings and conflicts to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let strict = args.strict || config.extraction.strict_document_type;
    let document_type = resolve_document_type(&args.document_type, strict)?;

    info!(
        "Extracting {} fields from {}",
        document_type,
        args.input.display()
    );

    let text = fs::read_to_string(&args.input)?;
    let parser = DocumentParser::new().with_config(config.extraction.clone());
    let result = parser.parse(&text, &document_type)?;

    debug!(
        "Read {} lines in {}ms",
        result.lines.len(),
        result.processing_time_ms
    );

    if args.show_warnings {
        print_diagnostics(&result);
    }

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

pub fn print_diagnostics(result: &ExtractionResult) {
    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
    for conflict in &result.conflicts {
        eprintln!(
            "{} {} on line {}: kept '{}', ignored '{}'",
            style("!").yellow(),
            conflict.field,
            conflict.line,
            conflict.kept,
            conflict.ignored
        );
    }
}

pub fn format_record(record: &DocumentRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &DocumentRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["field", "value"])?;
    wtr.write_record(["document_type", record.document_type.as_str()])?;
    for (name, value) in record.fields() {
        wtr.write_record([name, value.as_str()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &DocumentRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document: {}\n", record.document_type));

    let fields = record.fields();
    if fields.is_empty() {
        output.push_str("No fields extracted\n");
        return output;
    }

    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in fields {
        output.push_str(&format!("  {:width$}  {}\n", name, value, width = width));
    }

    output
}
