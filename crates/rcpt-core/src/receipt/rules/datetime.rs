//! Date/time extraction for bank receipts.

use std::fmt::Write;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Captures;
use tracing::{debug, trace};

use super::normalize::normalize;
use super::patterns::{
    AM_PM_MARKER, ARABIC_MONTHS, ARABIC_YEAR_SUFFIX, ASCII_MONTH_NAME, DATE_LABEL,
    MONTH_NAME_DATE, MONTH_NAME_DATE_TIME, NUMERIC_DATE_ONLY, NUMERIC_DATE_TIME,
    SEPT_ABBREVIATION, TIME_BARE, TIME_LABEL, WEEKDAY,
};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::config::CANONICAL_DATETIME_FORMAT;

/// Date layouts, in the order they are tried.
const DATE_FORMATS: [&str; 11] = [
    // Day, month name, year
    "%d %b %Y",
    "%b %d %Y",
    // Numeric, day first
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    // ISO-like
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    // Numeric, two-digit year
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Years outside this range are treated as misreads.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

enum InputFormat {
    DateTime(String),
    Date(&'static str),
}

lazy_static! {
    /// Every date layout with each time layout, then the date alone.
    static ref INPUT_FORMATS: Vec<InputFormat> = DATE_FORMATS
        .iter()
        .flat_map(|date| {
            TIME_FORMATS
                .iter()
                .map(move |time| InputFormat::DateTime(format!("{} {}", date, time)))
                .chain(std::iter::once(InputFormat::Date(*date)))
        })
        .collect();
}

/// A located date/time, parsed when a known format applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedDateTime {
    /// Parsed timestamp. A missing time of day reads as midnight and missing
    /// seconds as `:00`.
    Parsed(NaiveDateTime),
    /// Captured text that no known format could parse, kept for review.
    Verbatim(String),
}

impl ExtractedDateTime {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Render with a chrono format; verbatim text is returned unchanged.
    ///
    /// An unusable format falls back to the canonical `HH:MM:SS DD-MM-YYYY`.
    pub fn render(&self, format: &str) -> String {
        match self {
            Self::Parsed(dt) => {
                let mut out = String::new();
                if write!(out, "{}", dt.format(format)).is_err() {
                    out.clear();
                    let _ = write!(out, "{}", dt.format(CANONICAL_DATETIME_FORMAT));
                }
                out
            }
            Self::Verbatim(raw) => raw.clone(),
        }
    }
}

/// Parse a captured date/time string against the ordered input formats.
pub fn parse_datetime(candidate: &str) -> Option<NaiveDateTime> {
    let tidy = tidy_candidate(candidate);
    if tidy.is_empty() {
        return None;
    }

    for format in INPUT_FORMATS.iter() {
        let parsed = match format {
            InputFormat::DateTime(f) => NaiveDateTime::parse_from_str(&tidy, f).ok(),
            InputFormat::Date(f) => NaiveDate::parse_from_str(&tidy, f)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        };

        if let Some(dt) = parsed.filter(|dt| PLAUSIBLE_YEARS.contains(&dt.year())) {
            return Some(dt);
        }
    }

    None
}

/// Bring a candidate into a shape the input formats can match.
fn tidy_candidate(candidate: &str) -> String {
    let mut text = candidate.to_string();
    for (arabic, english) in ARABIC_MONTHS {
        if text.contains(arabic) {
            text = text.replace(arabic, english);
        }
    }

    let text = AM_PM_MARKER.replace_all(&text, |caps: &Captures| {
        let marker = if caps.get(2).is_some() || caps.get(4).is_some() {
            "AM"
        } else {
            "PM"
        };
        format!("{} {}", &caps[1], marker)
    });
    let text = ARABIC_YEAR_SUFFIX.replace_all(&text, "$1");
    let text = WEEKDAY.replace_all(&text, " ");
    // chrono's %b knows "Sep" and "September" only
    let text = SEPT_ABBREVIATION.replace_all(&text, "Sep");

    // Month-name dates come with any separator; the formats expect spaces.
    let text = if ASCII_MONTH_NAME.is_match(&text) {
        text.replace(['-', '/', '.', ','], " ")
    } else {
        text.replace(',', " ")
    };

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A captured date/time string located by one of the search strategies.
struct Candidate {
    text: String,
    confidence: f32,
    position: Option<(usize, usize)>,
    source: String,
}

impl Candidate {
    fn from_captures(caps: &Captures, text: String, confidence: f32) -> Self {
        let full = caps.get(0);
        Self {
            text,
            confidence,
            position: full.map(|m| (m.start(), m.end())),
            source: full.map(|m| m.as_str().to_string()).unwrap_or_default(),
        }
    }
}

/// Date/time field extractor.
///
/// Strategies, strongest first:
/// 1. a month-name date immediately followed by a time;
/// 2. a `Date`-labeled fragment joined with a `Time`-labeled or bare time;
/// 3. an unlabeled numeric date immediately followed by a time;
/// 4. a date alone (numeric, then month-name).
pub struct DateTimeExtractor {
    label_max_chars: usize,
    output_format: String,
}

impl DateTimeExtractor {
    /// Create a new date/time extractor.
    pub fn new() -> Self {
        Self {
            label_max_chars: 20,
            output_format: CANONICAL_DATETIME_FORMAT.to_string(),
        }
    }

    /// Labeled date fragments longer than this are discarded as noise.
    pub fn with_label_max_chars(mut self, max: usize) -> Self {
        self.label_max_chars = max;
        self
    }

    /// chrono format used by [`DateTimeExtractor::render`].
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    /// Render an extracted value with this extractor's output format.
    pub fn render(&self, value: &ExtractedDateTime) -> String {
        value.render(&self.output_format)
    }

    fn month_name_with_time(text: &str) -> impl Iterator<Item = Candidate> + '_ {
        MONTH_NAME_DATE_TIME.captures_iter(text).map(|caps| {
            let joined = format!("{} {} {} {}", &caps[1], &caps[2], &caps[3], &caps[4]);
            Candidate::from_captures(&caps, joined, 0.95)
        })
    }

    fn numeric_with_time(text: &str) -> impl Iterator<Item = Candidate> + '_ {
        NUMERIC_DATE_TIME.captures_iter(text).map(|caps| {
            let joined = format!("{} {}", &caps[1], &caps[2]);
            Candidate::from_captures(&caps, joined, 0.95)
        })
    }

    fn keyword_split(&self, text: &str) -> Option<Candidate> {
        let caps = DATE_LABEL
            .captures_iter(text)
            .find(|caps| caps[1].chars().any(|c| c.is_ascii_digit()))?;

        let fragment = caps[1].trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '-' | '/')
        });

        if fragment.chars().count() > self.label_max_chars {
            debug!(
                "Discarding labeled date fragment of {} chars",
                fragment.chars().count()
            );
            return None;
        }

        let full = caps.get(0);
        let position = full.map(|m| (m.start(), m.end()));
        let source = full.map(|m| m.as_str().trim().to_string()).unwrap_or_default();

        if TIME_BARE.is_match(fragment) {
            return Some(Candidate {
                text: fragment.to_string(),
                confidence: 0.9,
                position,
                source,
            });
        }

        let time = TIME_LABEL
            .captures(text)
            .or_else(|| TIME_BARE.captures(text))
            .map(|c| c[1].to_string());

        let text = match time {
            Some(time) => format!("{} {}", fragment, time),
            None => fragment.to_string(),
        };

        Some(Candidate {
            text,
            confidence: 0.9,
            position,
            source,
        })
    }

    fn numeric_date_only(text: &str) -> impl Iterator<Item = Candidate> + '_ {
        NUMERIC_DATE_ONLY.captures_iter(text).map(|caps| {
            let date = caps[1].to_string();
            Candidate::from_captures(&caps, date, 0.6)
        })
    }

    fn month_name_date_only(text: &str) -> impl Iterator<Item = Candidate> + '_ {
        MONTH_NAME_DATE.captures_iter(text).map(|caps| {
            let joined = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
            Candidate::from_captures(&caps, joined, 0.6)
        })
    }

    fn resolve(candidate: Candidate) -> ExtractionMatch<ExtractedDateTime> {
        let (value, confidence) = match parse_datetime(&candidate.text) {
            Some(dt) => (ExtractedDateTime::Parsed(dt), candidate.confidence),
            None => {
                debug!("No known format for date/time {:?}", candidate.text);
                (ExtractedDateTime::Verbatim(candidate.text), 0.2)
            }
        };

        let found = ExtractionMatch::new(value, confidence, candidate.source);
        match candidate.position {
            Some((start, end)) => found.with_position(start, end),
            None => found,
        }
    }
}

impl Default for DateTimeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateTimeExtractor {
    type Output = ExtractionMatch<ExtractedDateTime>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let candidate = Self::month_name_with_time(text)
            .next()
            .or_else(|| self.keyword_split(text))
            .or_else(|| Self::numeric_with_time(text).next())
            .or_else(|| Self::numeric_date_only(text).next())
            .or_else(|| Self::month_name_date_only(text).next())?;

        trace!(
            "Date/time candidate {:?} (confidence {:.2})",
            candidate.text, candidate.confidence
        );

        Some(Self::resolve(candidate))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        let candidates = Self::month_name_with_time(text)
            .chain(self.keyword_split(text))
            .chain(Self::numeric_with_time(text))
            .chain(Self::numeric_date_only(text))
            .chain(Self::month_name_date_only(text));

        for candidate in candidates {
            let found = Self::resolve(candidate);
            // Skip if already found
            if results.iter().any(|r| r.value == found.value) {
                continue;
            }
            results.push(found);
        }

        results
    }
}

/// Extract the transaction date/time from OCR text.
///
/// The text is normalized first. Returns the canonical `HH:MM:SS DD-MM-YYYY`
/// rendering, the raw captured text when no known format applied, or `None`
/// when nothing date-like was found.
pub fn extract_datetime(text: &str) -> Option<String> {
    let extractor = DateTimeExtractor::new();
    extractor
        .extract(&normalize(text))
        .map(|m| extractor.render(&m.value))
}
