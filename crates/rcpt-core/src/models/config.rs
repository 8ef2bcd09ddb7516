//! Configuration structures for receipt extraction.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{RcptError, Result};

/// Canonical date/time output format (`HH:MM:SS DD-MM-YYYY`).
pub const CANONICAL_DATETIME_FORMAT: &str = "%H:%M:%S %d-%m-%Y";

/// Main configuration for rcpt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration for the CLI.
    pub output: OutputConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum length of an unlabeled digit run accepted as a transaction
    /// reference.
    pub reference_fallback_min_digits: usize,

    /// Labeled date fragments longer than this (in characters) are
    /// discarded as noise.
    pub date_label_max_chars: usize,

    /// chrono format used to emit parsed date/times.
    pub datetime_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            reference_fallback_min_digits: 8,
            date_label_max_chars: 20,
            datetime_format: CANONICAL_DATETIME_FORMAT.to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Check that thresholds are usable and the output format is valid.
    pub fn validate(&self) -> Result<()> {
        if self.reference_fallback_min_digits < 4 {
            return Err(RcptError::Config(format!(
                "reference_fallback_min_digits must be at least 4, got {}",
                self.reference_fallback_min_digits
            )));
        }

        if self.date_label_max_chars == 0 {
            return Err(RcptError::Config(
                "date_label_max_chars must be greater than 0".to_string(),
            ));
        }

        if !is_valid_datetime_format(&self.datetime_format) {
            return Err(RcptError::Config(format!(
                "invalid datetime_format: {:?}",
                self.datetime_format
            )));
        }

        Ok(())
    }
}

/// Whether `fmt` is a usable chrono strftime format.
pub fn is_valid_datetime_format(fmt: &str) -> bool {
    !fmt.is_empty() && StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}

/// Output format for extracted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON output.
    #[default]
    Json,
    /// CSV output.
    Csv,
    /// Plain text summary.
    Text,
}

impl OutputFormat {
    /// File extension used for per-file outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// CLI output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.extraction.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration file location (`<config dir>/rcpt/config.json`).
    pub fn default_path(config_dir: Option<PathBuf>) -> PathBuf {
        config_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rcpt")
            .join("config.json")
    }
}
