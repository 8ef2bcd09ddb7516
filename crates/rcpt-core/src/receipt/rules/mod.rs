//! Rule-based field extractors for bank receipts.

pub mod amounts;
pub mod datetime;
pub mod normalize;
pub mod patterns;
pub mod reference;

pub use amounts::{extract_amount, parse_amount, AmountExtractor, NumericToken};
pub use datetime::{extract_datetime, parse_datetime, DateTimeExtractor, ExtractedDateTime};
pub use normalize::{normalize, normalize_char};
pub use reference::{extract_reference, ReferenceExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text, honouring the extractor's priority order.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract every candidate for the field, strongest strategy first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
