//! Amount extraction for bank receipts.

use std::str::FromStr;

use regex::Captures;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::normalize::normalize;
use super::patterns::{
    AMOUNT_DECIMAL, AMOUNT_KEYWORD, BARE_DIGITS, NUMERIC_DATE_ONLY, SHORT_YEAR_DATE, TIME_BARE,
};
use super::{ExtractionMatch, FieldExtractor};

/// A substring believed to represent a number, with its decimal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericToken {
    /// Token as it appeared in the text.
    pub raw: String,
    /// Normalized value.
    pub value: Decimal,
}

impl NumericToken {
    /// Normalize and parse a raw numeric token.
    ///
    /// Thousands and decimal separators are told apart as follows:
    /// - comma only: the last comma is decimal when exactly two digits follow
    ///   it at the end of the token, otherwise every comma is a thousands
    ///   separator;
    /// - period only: a single period is decimal; with several, the same
    ///   two-trailing-digits rule as for commas applies;
    /// - both: the rightmost separator is decimal, every earlier one is a
    ///   thousands separator.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty()
            || !cleaned
                .chars()
                .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        {
            return None;
        }

        let normalized = match (cleaned.contains(','), cleaned.contains('.')) {
            (true, false) => resolve_single_separator(&cleaned, ','),
            (false, true) if cleaned.matches('.').count() == 1 => cleaned.clone(),
            (false, true) => resolve_single_separator(&cleaned, '.'),
            (true, true) => {
                let pos = cleaned.rfind([',', '.'])?;
                join_parts(&cleaned[..pos], &cleaned[pos + 1..])
            }
            (false, false) => cleaned.clone(),
        };

        let value = Decimal::from_str(&normalized).ok()?;
        Some(Self {
            raw: raw.to_string(),
            value,
        })
    }
}

fn resolve_single_separator(token: &str, separator: char) -> String {
    if let Some(pos) = token.rfind(separator) {
        let tail = &token[pos + 1..];
        if tail.len() == 2 && tail.chars().all(|c| c.is_ascii_digit()) {
            return join_parts(&token[..pos], tail);
        }
    }
    digits_only(token)
}

fn join_parts(integer: &str, fraction: &str) -> String {
    let integer = digits_only(integer);
    let integer = if integer.is_empty() { "0".to_string() } else { integer };
    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Parse a receipt amount such as "1,234.56", "1.234,56" or "12 000".
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    NumericToken::parse(raw).map(|t| t.value)
}

/// A raw numeric token located by one of the search strategies.
struct Candidate<'t> {
    raw: &'t str,
    start: usize,
    end: usize,
    confidence: f32,
    source: &'t str,
}

impl Candidate<'_> {
    fn into_match(self) -> Option<ExtractionMatch<Decimal>> {
        let token = NumericToken::parse(self.raw)?;
        Some(
            ExtractionMatch::new(token.value, self.confidence, self.source)
                .with_position(self.start, self.end),
        )
    }
}

fn keyword_candidates(text: &str) -> impl Iterator<Item = Candidate<'_>> {
    AMOUNT_KEYWORD.captures_iter(text).filter_map(|caps| {
        let number = caps.get(1)?;
        let full = caps.get(0)?;
        Some(Candidate {
            raw: number.as_str(),
            start: number.start(),
            end: number.end(),
            confidence: 0.95,
            source: full.as_str(),
        })
    })
}

fn decimal_candidates(text: &str) -> Vec<Candidate<'_>> {
    // Digits that belong to dates and times must not read as amounts.
    let masked = mask_dates_and_times(text);

    AMOUNT_DECIMAL
        .captures_iter(&masked)
        .filter_map(|caps| {
            let number = caps.get(1)?;
            let raw = &text[number.start()..number.end()];
            Some(Candidate {
                raw,
                start: number.start(),
                end: number.end(),
                confidence: 0.7,
                source: raw,
            })
        })
        .collect()
}

fn bare_candidates(text: &str) -> impl Iterator<Item = Candidate<'_>> {
    BARE_DIGITS.find_iter(text).map(|m| Candidate {
        raw: m.as_str(),
        start: m.start(),
        end: m.end(),
        confidence: 0.3,
        source: m.as_str(),
    })
}

/// Amount field extractor.
///
/// Strategies, strongest first: keyword-anchored number, decimal-shaped
/// number anywhere, first run of two or more digits.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let candidate = keyword_candidates(text)
            .next()
            .or_else(|| decimal_candidates(text).into_iter().next())
            .or_else(|| bare_candidates(text).next())?;

        trace!("Amount candidate {:?} (confidence {:.2})", candidate.raw, candidate.confidence);

        let raw = candidate.raw;
        let result = candidate.into_match();
        if result.is_none() {
            debug!("Amount token {:?} could not be parsed", raw);
        }
        result
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        let candidates = keyword_candidates(text)
            .chain(decimal_candidates(text))
            .chain(bare_candidates(text));

        for candidate in candidates {
            let Some(found) = candidate.into_match() else {
                continue;
            };
            // Skip tokens already covered by a stronger strategy
            if results.iter().any(|r| overlaps(r.position, found.position)) {
                continue;
            }
            results.push(found);
        }

        results
    }
}

fn overlaps(a: Option<(usize, usize)>, b: Option<(usize, usize)>) -> bool {
    match (a, b) {
        (Some((a_start, a_end)), Some((b_start, b_end))) => a_start < b_end && b_start < a_end,
        _ => false,
    }
}

fn mask_dates_and_times(text: &str) -> String {
    let masked = NUMERIC_DATE_ONLY.replace_all(text, blank);
    let masked = SHORT_YEAR_DATE.replace_all(&masked, blank);
    TIME_BARE.replace_all(&masked, blank).into_owned()
}

/// Same-length run of spaces, so byte offsets into the masked text stay valid.
fn blank(caps: &Captures) -> String {
    " ".repeat(caps[0].len())
}

/// Extract the receipt amount from OCR text.
///
/// The text is normalized first; `None` means no amount could be located
/// or the located token was not a number.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    AmountExtractor::new()
        .extract(&normalize(text))
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_separators() {
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1 234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12 345 678,90"), Some(dec("12345678.90")));
    }

    #[test]
    fn test_parse_amount_thousands_only() {
        assert_eq!(parse_amount("12,000"), Some(dec("12000")));
        assert_eq!(parse_amount("1,234,567"), Some(dec("1234567")));
        assert_eq!(parse_amount("1.234.567"), Some(dec("1234567")));
        assert_eq!(parse_amount("1.234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234,56"), Some(dec("1234.56")));
    }

    #[test]
    fn test_parse_amount_failures() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("  "), None);
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount("-5"), None);
        // Exceeds Decimal precision: absent, not zero
        assert_eq!(parse_amount("123456789012345678901234567890123"), None);
    }

    #[test]
    fn test_zero_is_not_absent() {
        assert_eq!(parse_amount("0.00"), Some(Decimal::ZERO));
        assert_eq!(extract_amount("Total: 0.00"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_keyword_anchored() {
        assert_eq!(extract_amount("Total: 1,234.56"), Some(dec("1234.56")));
        assert_eq!(extract_amount("المبلغ 1.234,56"), Some(dec("1234.56")));
        assert_eq!(extract_amount("Total 12,000"), Some(dec("12000")));
        assert_eq!(extract_amount("Balance: EGP 50"), Some(dec("50")));
        assert_eq!(extract_amount("الإجمالي: ٢٥٠٫٧٥ ج.م"), Some(dec("250.75")));
    }

    #[test]
    fn test_keyword_beats_fallbacks() {
        let text = "Fee 3.50\nRef 12345678\nAmount: 200";
        assert_eq!(extract_amount(text), Some(dec("200")));
    }

    #[test]
    fn test_decimal_fallback_skips_dates() {
        let text = "14.03.2024 13:05\nPaid 1,500.00 EGP";
        let found = AmountExtractor::new().extract(text).unwrap();
        assert_eq!(found.value, dec("1500.00"));
        assert_eq!(found.confidence, 0.7);
        assert_eq!(found.source, "1,500.00");
    }

    #[test]
    fn test_decimal_fallback_skips_two_digit_year_dates() {
        let found = AmountExtractor::new().extract("Paid on 14.03.24").unwrap();
        assert_eq!(found.confidence, 0.3);
        assert_ne!(found.value, dec("14.03"));

        let found = AmountExtractor::new()
            .extract("14.03.24 13:05\nPaid 99.50")
            .unwrap();
        assert_eq!(found.value, dec("99.50"));
        assert_eq!(found.confidence, 0.7);
    }

    #[test]
    fn test_bare_digits_fallback() {
        let found = AmountExtractor::new().extract("paid 500 EGP").unwrap();
        assert_eq!(found.value, dec("500"));
        assert_eq!(found.confidence, 0.3);
        assert_eq!(found.position, Some((5, 8)));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_amount(""), None);
        assert_eq!(extract_amount("no digits here"), None);
        assert_eq!(extract_amount("x 7 y"), None);
    }

    #[test]
    fn test_extract_all_orders_by_strategy() {
        let extractor = AmountExtractor::new();
        let results = extractor.extract_all("Fee 3.50 Total: 120");

        let values: Vec<Decimal> = results.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![dec("120"), dec("3.50")]);
        assert_eq!(results[0].confidence, 0.95);
    }
}
