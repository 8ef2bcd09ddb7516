//! Core library for bank receipt OCR text.
//!
//! This crate provides:
//! - OCR text normalization (Arabic-Indic digits, separator look-alikes)
//! - Field extraction for the amount, the last four digits of the
//!   transaction reference and the transaction date/time
//! - The extraction record and configuration models
//!
//! Extraction is pure and infallible: any input, however garbled, yields an
//! [`ExtractionResult`] whose missing fields are `None`.

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{RcptError, Result};
pub use models::config::{ExtractionConfig, OutputConfig, OutputFormat, RcptConfig};
pub use models::receipt::{ExtractionMetadata, ExtractionResult, ReceiptField};
pub use receipt::rules::{
    extract_amount, extract_datetime, extract_reference, normalize, parse_amount,
};
pub use receipt::{extract_fields, ParsedReceipt, ReceiptExtractor, ReceiptParser};
