//! Process command - extract fields from a single OCR text file.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcpt_core::receipt::FieldCandidate;
use rcpt_core::{OutputFormat, ParsedReceipt, ReceiptExtractor, ReceiptParser};

use super::load_config;
use super::output::{FormatArg, format_record};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file, or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Show extraction confidence scores and warnings
    #[arg(long)]
    show_confidence: bool,

    /// Show the normalized text the extractors saw
    #[arg(long)]
    show_normalized: bool,

    /// List every candidate found for each field
    #[arg(long)]
    candidates: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("Processing {} ({} bytes)", args.input, text.len());

    let parser = ReceiptParser::from_config(&config.extraction);
    let parsed = parser.parse(&text);

    let format: OutputFormat = args.format.map(Into::into).unwrap_or(config.output.format);
    let output = format_record(&parsed.fields, format, config.output.pretty)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    if args.show_normalized {
        println!();
        println!("{}", style("Normalized text:").bold());
        println!("{}", parsed.normalized_text);
    }

    if args.show_confidence {
        print_confidence(&parsed);
    }

    if args.candidates {
        let candidates = parser.candidates(&text);
        println!();
        print_candidates("amount", &candidates.amount);
        print_candidates("trx_ref_last4", &candidates.trx_ref_last4);
        print_candidates("date_time", &candidates.date_time);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        return Ok(io::read_to_string(io::stdin())?);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    Ok(fs::read_to_string(&path)?)
}

fn print_confidence(parsed: &ParsedReceipt) {
    let metadata = &parsed.metadata;

    println!();
    println!(
        "{} Extraction confidence: {:.1}%",
        style("ℹ").blue(),
        metadata.confidence * 100.0
    );

    let mut fields: Vec<_> = metadata.field_confidence.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    for (field, confidence) in fields {
        println!("    {:<14} {:.0}%", field, confidence * 100.0);
    }

    println!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        metadata.processing_time_ms
    );

    for warning in &metadata.warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
}

fn print_candidates(field: &str, candidates: &[FieldCandidate]) {
    println!("{}", style(format!("Candidates for {}:", field)).bold());

    if candidates.is_empty() {
        println!("    (none)");
        return;
    }

    for candidate in candidates {
        println!(
            "    {:<24} {:>4.0}%  from {:?}",
            candidate.value,
            candidate.confidence * 100.0,
            candidate.source
        );
    }
}
