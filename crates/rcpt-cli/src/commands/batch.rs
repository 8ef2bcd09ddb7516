//! Batch processing command for multiple OCR text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use rcpt_core::{OutputFormat, ParsedReceipt, ReceiptExtractor, ReceiptParser};

use super::load_config;
use super::output::{FormatArg, format_record};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    parsed: Option<ParsedReceipt>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(ReceiptParser::from_config(&config.extraction));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let parser = Arc::clone(&parser);
            let semaphore = Arc::clone(&semaphore);
            let progress = progress.clone();

            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let result = tokio::task::spawn_blocking(move || process_single_file(path, &parser))
                    .await?;
                progress.inc(1);
                anyhow::Ok(result)
            })
        })
        .collect();

    // Results are collected in input order
    let mut results = Vec::with_capacity(handles.len());
    let mut handles = handles.into_iter();
    while let Some(handle) = handles.next() {
        let result = match handle.await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                abort_remaining(handles.by_ref());
                return Err(e);
            }
            Err(e) => {
                abort_remaining(handles.by_ref());
                return Err(e.into());
            }
        };

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                abort_remaining(handles.by_ref());
                progress.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }

        results.push(result);
    }

    progress.finish_and_clear();

    let format: OutputFormat = args.format.map(Into::into).unwrap_or(config.output.format);

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.parsed.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            let Some(parsed) = &result.parsed else {
                continue;
            };

            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("receipt");

            let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));
            let content = format_record(&parsed.fields, format, config.output.pretty)?;

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
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

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
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

/// Cancel workers that have not reported yet.
fn abort_remaining<T>(handles: impl Iterator<Item = JoinHandle<T>>) {
    for handle in handles {
        handle.abort();
    }
}

fn process_single_file(path: PathBuf, parser: &ReceiptParser) -> ProcessResult {
    let file_start = Instant::now();

    let (parsed, error) = match fs::read_to_string(&path) {
        Ok(text) => (Some(parser.parse(&text)), None),
        Err(e) => (None, Some(e.to_string())),
    };

    ProcessResult {
        path,
        parsed,
        error,
        processing_time_ms: file_start.elapsed().as_millis() as u64,
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "amount",
        "trx_ref_last4",
        "date_time",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let time_ms = result.processing_time_ms.to_string();

        if let Some(parsed) = &result.parsed {
            let fields = &parsed.fields;
            let amount = fields.amount.map(|a| a.to_string()).unwrap_or_default();
            let confidence = format!("{:.2}", parsed.metadata.confidence);

            wtr.write_record([
                filename,
                "success",
                amount.as_str(),
                fields.trx_ref_last4.as_deref().unwrap_or(""),
                fields.date_time.as_deref().unwrap_or(""),
                confidence.as_str(),
                time_ms.as_str(),
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
                time_ms.as_str(),
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

    #[tokio::test]
    async fn test_abort_remaining_cancels_pending_workers() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

        let handles: Vec<JoinHandle<()>> = (0..3)
            .map(|_| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let _tx = tx;
                    std::future::pending::<()>().await;
                })
            })
            .collect();
        drop(tx);

        abort_remaining(handles.into_iter());

        // Every aborted worker drops its sender, closing the channel
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_summary_lists_failures() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        let results = vec![ProcessResult {
            path: PathBuf::from("bad.txt"),
            parsed: None,
            error: Some("stream did not contain valid UTF-8".to_string()),
            processing_time_ms: 1,
        }];

        write_summary(&path, &results).unwrap();
        let summary = fs::read_to_string(&path).unwrap();
        assert!(summary.contains("bad.txt,error,,,,,1,stream did not contain valid UTF-8"));
    }
}
