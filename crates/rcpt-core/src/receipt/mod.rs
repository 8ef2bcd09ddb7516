//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{FieldCandidate, FieldCandidates, ParsedReceipt, ReceiptParser};

use crate::models::receipt::ExtractionResult;

/// Trait for receipt field extractors.
///
/// Extraction never fails: fields that cannot be located are `None`.
pub trait ReceiptExtractor {
    /// Extract the receipt fields from OCR text.
    fn extract(&self, text: &str) -> ExtractionResult;

    /// Extract the receipt fields along with review metadata.
    fn parse(&self, text: &str) -> ParsedReceipt;
}

/// Extract amount, reference suffix and date/time from raw OCR text with
/// the default settings.
pub fn extract_fields(raw_text: &str) -> ExtractionResult {
    ReceiptParser::new().extract(raw_text)
}
