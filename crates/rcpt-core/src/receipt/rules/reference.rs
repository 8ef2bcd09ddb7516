//! Transaction reference extraction.

use tracing::trace;

use super::normalize::normalize;
use super::patterns::{DIGIT_RUN, REFERENCE_KEYWORD};
use super::{ExtractionMatch, FieldExtractor};

/// Digits kept from a reference.
const REFERENCE_SUFFIX_LEN: usize = 4;

/// Extractor for the last four digits of the transaction reference.
///
/// A digit run after a reference keyword wins; failing that, the first run
/// of at least `min_fallback_digits` digits anywhere in the text. Runs
/// shorter than four digits are never used.
pub struct ReferenceExtractor {
    min_fallback_digits: usize,
}

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self {
            min_fallback_digits: 8,
        }
    }

    /// Minimum length of an unlabeled digit run taken as a reference.
    pub fn with_min_fallback_digits(mut self, digits: usize) -> Self {
        self.min_fallback_digits = digits.max(REFERENCE_SUFFIX_LEN);
        self
    }

    fn keyword_matches(&self, text: &str) -> impl Iterator<Item = ExtractionMatch<String>> {
        REFERENCE_KEYWORD.captures_iter(text).filter_map(|caps| {
            let digits = caps.get(1)?;
            let full = caps.get(0)?;
            if digits.as_str().len() < REFERENCE_SUFFIX_LEN {
                trace!("Skipping short reference {:?}", digits.as_str());
                return None;
            }
            Some(
                ExtractionMatch::new(last_four(digits.as_str()), 0.95, full.as_str())
                    .with_position(digits.start(), digits.end()),
            )
        })
    }

    fn fallback_matches(&self, text: &str) -> impl Iterator<Item = ExtractionMatch<String>> {
        let min = self.min_fallback_digits;
        DIGIT_RUN
            .find_iter(text)
            .filter(move |m| m.as_str().len() >= min)
            .map(|m| {
                ExtractionMatch::new(last_four(m.as_str()), 0.6, m.as_str())
                    .with_position(m.start(), m.end())
            })
    }
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ReferenceExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.keyword_matches(text)
            .next()
            .or_else(|| self.fallback_matches(text).next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for found in self.keyword_matches(text).chain(self.fallback_matches(text)) {
            // Skip if already found
            if results.iter().any(|r| r.position == found.position) {
                continue;
            }
            results.push(found);
        }

        results
    }
}

/// Run is ASCII digits, so byte slicing is safe.
fn last_four(digits: &str) -> String {
    digits[digits.len().saturating_sub(REFERENCE_SUFFIX_LEN)..].to_string()
}

/// Extract the last four digits of the transaction reference.
///
/// The text is normalized first. Leading zeros are kept.
pub fn extract_reference(text: &str) -> Option<String> {
    ReferenceExtractor::new()
        .extract(&normalize(text))
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_reference() {
        assert_eq!(extract_reference("Ref: 00098765"), Some("8765".to_string()));
        assert_eq!(extract_reference("Trx#4455"), Some("4455".to_string()));
        assert_eq!(
            extract_reference("Reference No. 123456789012"),
            Some("9012".to_string())
        );
    }

    #[test]
    fn test_leading_zeros_kept() {
        assert_eq!(extract_reference("Ref: 12340012"), Some("0012".to_string()));
        assert_eq!(extract_reference("Ref: 0007"), Some("0007".to_string()));
    }

    #[test]
    fn test_arabic_keyword_and_digits() {
        assert_eq!(
            extract_reference("رقم العملية: ٩٩٨٨٧٧٦٦"),
            Some("7766".to_string())
        );
    }

    #[test]
    fn test_short_keyword_run_skipped() {
        // "No 12" is too short; the later labeled run wins
        let text = "Branch No 12\nRef: 55554444";
        assert_eq!(extract_reference(text), Some("4444".to_string()));
    }

    #[test]
    fn test_fallback_long_run() {
        let found = ReferenceExtractor::new()
            .extract("Transfer 500 EGP\n202403141305")
            .unwrap();
        assert_eq!(found.value, "1305");
        assert_eq!(found.confidence, 0.6);
    }

    #[test]
    fn test_no_reference() {
        assert_eq!(extract_reference(""), None);
        assert_eq!(extract_reference("Total 1234567 EGP"), None);
        assert_eq!(extract_reference("Ref: 12"), None);
    }

    #[test]
    fn test_min_fallback_digits() {
        let extractor = ReferenceExtractor::new().with_min_fallback_digits(6);
        assert_eq!(
            extractor.extract("Total 1234567 EGP").map(|m| m.value),
            Some("4567".to_string())
        );

        // Never below four digits
        let extractor = ReferenceExtractor::new().with_min_fallback_digits(1);
        assert_eq!(extractor.extract("paid 123").map(|m| m.value), None);
    }

    #[test]
    fn test_extract_all() {
        let text = "Ref: 11112222\nAuth 333344445555";
        let values: Vec<String> = ReferenceExtractor::new()
            .extract_all(text)
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(values, vec!["2222".to_string(), "5555".to_string()]);
    }
}
