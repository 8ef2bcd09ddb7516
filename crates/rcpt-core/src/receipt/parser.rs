//! Receipt parser combining the field extractors.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::models::config::{CANONICAL_DATETIME_FORMAT, ExtractionConfig};
use crate::models::receipt::{ExtractionMetadata, ExtractionResult, ReceiptField};

use super::ReceiptExtractor;
use super::rules::{
    AmountExtractor, DateTimeExtractor, ExtractionMatch, FieldExtractor, ReferenceExtractor,
    normalize,
};

/// Result of receipt parsing.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedReceipt {
    /// Extracted fields.
    pub fields: ExtractionResult,
    /// OCR text as received.
    pub raw_text: String,
    /// Text after normalization, as seen by the extractors.
    pub normalized_text: String,
    /// Confidence, warnings and timing.
    pub metadata: ExtractionMetadata,
}

/// One candidate value for a field, for review tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCandidate {
    /// Value as it would appear in the extraction record.
    pub value: String,
    pub confidence: f32,
    /// Text the strategy matched.
    pub source: String,
    /// Byte range in the normalized text.
    pub position: Option<(usize, usize)>,
}

impl FieldCandidate {
    fn from_match<T>(found: ExtractionMatch<T>, render: impl Fn(&T) -> String) -> Self {
        Self {
            value: render(&found.value),
            confidence: found.confidence,
            source: found.source,
            position: found.position,
        }
    }
}

/// Every candidate per field, strongest strategy first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldCandidates {
    pub amount: Vec<FieldCandidate>,
    pub trx_ref_last4: Vec<FieldCandidate>,
    pub date_time: Vec<FieldCandidate>,
}

/// Rule-based receipt parser.
///
/// Normalizes the text once, then runs the amount, reference and date/time
/// extractors independently over the normalized text.
pub struct ReceiptParser {
    /// Minimum length of an unlabeled reference digit run.
    reference_min_digits: usize,
    /// Maximum length of a labeled date fragment.
    date_label_max_chars: usize,
    /// Output format for parsed date/times.
    datetime_format: String,
}

impl ReceiptParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            reference_min_digits: 8,
            date_label_max_chars: 20,
            datetime_format: CANONICAL_DATETIME_FORMAT.to_string(),
        }
    }

    /// Create a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_reference_fallback_min_digits(config.reference_fallback_min_digits)
            .with_date_label_max_chars(config.date_label_max_chars)
            .with_datetime_format(config.datetime_format.clone())
    }

    /// Set the minimum length of an unlabeled reference digit run.
    pub fn with_reference_fallback_min_digits(mut self, digits: usize) -> Self {
        self.reference_min_digits = digits;
        self
    }

    /// Set the maximum length of a labeled date fragment.
    pub fn with_date_label_max_chars(mut self, max: usize) -> Self {
        self.date_label_max_chars = max;
        self
    }

    /// Set the chrono format for parsed date/times.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    fn reference_extractor(&self) -> ReferenceExtractor {
        ReferenceExtractor::new().with_min_fallback_digits(self.reference_min_digits)
    }

    fn datetime_extractor(&self) -> DateTimeExtractor {
        DateTimeExtractor::new()
            .with_label_max_chars(self.date_label_max_chars)
            .with_output_format(self.datetime_format.clone())
    }

    /// List every candidate each extractor finds, for manual review.
    pub fn candidates(&self, text: &str) -> FieldCandidates {
        let normalized = normalize(text);
        let datetime = self.datetime_extractor();

        FieldCandidates {
            amount: AmountExtractor::new()
                .extract_all(&normalized)
                .into_iter()
                .map(|m| FieldCandidate::from_match(m, |v| v.to_string()))
                .collect(),
            trx_ref_last4: self
                .reference_extractor()
                .extract_all(&normalized)
                .into_iter()
                .map(|m| FieldCandidate::from_match(m, |v| v.clone()))
                .collect(),
            date_time: datetime
                .extract_all(&normalized)
                .into_iter()
                .map(|m| FieldCandidate::from_match(m, |v| datetime.render(v)))
                .collect(),
        }
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptExtractor for ReceiptParser {
    fn extract(&self, text: &str) -> ExtractionResult {
        self.parse(text).fields
    }

    fn parse(&self, text: &str) -> ParsedReceipt {
        let start = start_timer();
        let normalized = normalize(text);

        debug!("Parsing receipt from {} characters of text", normalized.chars().count());

        let mut field_confidence = HashMap::new();
        let mut warnings = Vec::new();

        let amount = AmountExtractor::new().extract(&normalized).map(|m| {
            field_confidence.insert(ReceiptField::Amount.to_string(), m.confidence);
            m.value
        });

        let trx_ref_last4 = self.reference_extractor().extract(&normalized).map(|m| {
            field_confidence.insert(ReceiptField::TrxRefLast4.to_string(), m.confidence);
            m.value
        });

        let datetime = self.datetime_extractor();
        let date_time = datetime.extract(&normalized).map(|m| {
            field_confidence.insert(ReceiptField::DateTime.to_string(), m.confidence);
            if !m.value.is_parsed() {
                warnings.push(format!(
                    "Date/time {:?} did not match a known format",
                    datetime.render(&m.value)
                ));
            }
            datetime.render(&m.value)
        });

        let fields = ExtractionResult {
            amount,
            trx_ref_last4,
            date_time,
        };

        let missing_fields = fields.missing_fields();
        for field in &missing_fields {
            warnings.push(format!("Could not extract {}", field));
        }

        // Absent fields count as zero
        let confidence = ReceiptField::ALL
            .iter()
            .map(|f| field_confidence.get(f.as_str()).copied().unwrap_or(0.0))
            .sum::<f32>()
            / ReceiptField::ALL.len() as f32;

        let processing_time_ms = start
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or_default();

        debug!(
            "Receipt parsed in {}ms: {} of {} fields, confidence {:.2}",
            processing_time_ms,
            ReceiptField::ALL.len() - missing_fields.len(),
            ReceiptField::ALL.len(),
            confidence
        );

        ParsedReceipt {
            fields,
            raw_text: text.to_string(),
            normalized_text: normalized,
            metadata: ExtractionMetadata {
                confidence,
                processing_time_ms,
                warnings,
                missing_fields,
                field_confidence,
            },
        }
    }
}

/// `Instant::now` panics on wasm32, where no timing is reported.
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const RECEIPT: &str = "CIB Bank\nTransfer receipt\nAmount: 1,250.00 EGP\n\
                           Ref No: 000123456789\nDate: 14/03/2024 Time: 13:05";

    #[test]
    fn test_parse_full_receipt() {
        let parsed = ReceiptParser::new().parse(RECEIPT);

        assert_eq!(parsed.fields.amount, Some(Decimal::from_str("1250.00").unwrap()));
        assert_eq!(parsed.fields.trx_ref_last4, Some("6789".to_string()));
        assert_eq!(parsed.fields.date_time, Some("13:05:00 14-03-2024".to_string()));
        assert!(parsed.metadata.warnings.is_empty());
        assert!(parsed.metadata.missing_fields.is_empty());
        assert_eq!(parsed.raw_text, RECEIPT);
    }

    #[test]
    fn test_confidence_is_mean_with_absent_as_zero() {
        let parsed = ReceiptParser::new().parse("Total: 50");
        // 0.95 for the amount, nothing else
        assert!((parsed.metadata.confidence - 0.95 / 3.0).abs() < 1e-6);
        assert_eq!(
            parsed.metadata.missing_fields,
            vec![ReceiptField::TrxRefLast4, ReceiptField::DateTime]
        );
        assert_eq!(parsed.metadata.warnings.len(), 2);
        assert_eq!(parsed.metadata.field_confidence.get("amount"), Some(&0.95));
    }

    #[test]
    fn test_verbatim_date_warning() {
        let parsed = ReceiptParser::new().parse("31 Feb 2024 10:00");
        assert_eq!(parsed.fields.date_time, Some("31 Feb 2024 10:00".to_string()));
        assert!(
            parsed
                .metadata
                .warnings
                .iter()
                .any(|w| w.contains("did not match a known format"))
        );
    }

    #[test]
    fn test_normalizes_once() {
        let parsed = ReceiptParser::new().parse("المبلغ: ١٬٢٥٠٫٠٠");
        assert_eq!(parsed.normalized_text, "المبلغ: 1,250.00");
        assert_eq!(parsed.fields.amount, Some(Decimal::from_str("1250.00").unwrap()));
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            reference_fallback_min_digits: 6,
            date_label_max_chars: 20,
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
        };
        let parser = ReceiptParser::from_config(&config);
        let result = parser.extract("receipt 123456\n14/03/2024 13:05");

        assert_eq!(result.trx_ref_last4, Some("3456".to_string()));
        assert_eq!(result.date_time, Some("2024-03-14 13:05:00".to_string()));
    }

    #[test]
    fn test_empty_input() {
        let parsed = ReceiptParser::new().parse("");
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.metadata.confidence, 0.0);
        assert_eq!(parsed.metadata.missing_fields, ReceiptField::ALL.to_vec());
    }

    #[test]
    fn test_candidates() {
        let candidates = ReceiptParser::new().candidates("Fee 3.50 Total: 120\nRef: 11112222");

        let amounts: Vec<&str> = candidates.amount.iter().map(|c| c.value.as_str()).collect();
        // Bare digit runs are listed too, weakest last
        assert_eq!(amounts, vec!["120", "3.50", "11112222"]);
        assert_eq!(candidates.trx_ref_last4[0].value, "2222");
        assert!(candidates.date_time.is_empty());
    }
}
