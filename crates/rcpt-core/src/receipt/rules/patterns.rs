//! Common regex patterns for bank receipt extraction.
//!
//! Patterns run on normalized text, so digits are ASCII and date separators
//! are `/`, `-` or `.`. Digit classes are spelled `[0-9]` because `\d` is
//! Unicode-aware in `regex`.

use lazy_static::lazy_static;
use regex::Regex;

/// English and Arabic month names (full and abbreviated).
const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?|يناير|فبراير|مارس|أبريل|إبريل|ابريل|مايو|يونيو|يوليو|أغسطس|اغسطس|سبتمبر|أكتوبر|اكتوبر|نوفمبر|ديسمبر)";

/// `HH:MM` or `HH:MM:SS` with an optional Latin or Arabic AM/PM marker.
const TIME: &str = r"[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?(?:[ \t]*(?:[ap]\.?m\b\.?|[صم]\b))?";

/// `DD/MM/YYYY` (any of `/ - .`) or `YYYY-MM-DD`.
const NUMERIC_DATE: &str =
    r"[0-9]{1,2}[/\-.][0-9]{1,2}[/\-.][0-9]{4}|[0-9]{4}[/\-.][0-9]{1,2}[/\-.][0-9]{1,2}";

lazy_static! {
    // Amounts
    pub static ref AMOUNT_KEYWORD: Regex = Regex::new(
        r"(?i)(?:\b(?:amount|total|balance)|المبلغ|مبلغ|الإجمالي|الاجمالي|إجمالي|اجمالي|المجموع|الرصيد|رصيد)[^0-9\n]{0,16}?([0-9]+(?:[.,][0-9]+|[ \u{00a0}][0-9]{3}\b)*)"
    ).unwrap();

    pub static ref AMOUNT_DECIMAL: Regex = Regex::new(
        r"((?:[0-9]{1,3}(?:[,.][0-9]{3})+|[0-9]+)[.,][0-9]{2})(?:[^0-9]|$)"
    ).unwrap();

    pub static ref BARE_DIGITS: Regex = Regex::new(r"[0-9]{2,}").unwrap();

    // Transaction reference
    pub static ref REFERENCE_KEYWORD: Regex = Regex::new(
        r"(?i)(?:\b(?:ref(?:erence)?|trx|txn|id|no|operation|sequence|seq|number)|رقم العملية|رقم المعاملة|رقم الحركة|الرقم المرجعي)[ \t]*[.:#\-]*[ \t]*([0-9]+)"
    ).unwrap();

    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    // Dates and times
    pub static ref MONTH_NAME_DATE: Regex = Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})[ \t\-/.]*({MONTH})[ \t\-/.,]*([0-9]{{4}})"
    )).unwrap();

    pub static ref MONTH_NAME_DATE_TIME: Regex = Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})[ \t\-/.]*({MONTH})[ \t\-/.,]*([0-9]{{4}})[ \t,\-]*({TIME})"
    )).unwrap();

    pub static ref SHORT_YEAR_DATE: Regex = Regex::new(
        r"\b[0-9]{1,2}[/\-.][0-9]{1,2}[/\-.][0-9]{2}\b"
    ).unwrap();

    pub static ref NUMERIC_DATE_ONLY: Regex = Regex::new(&format!(
        r"\b({NUMERIC_DATE})"
    )).unwrap();

    pub static ref NUMERIC_DATE_TIME: Regex = Regex::new(&format!(
        r"(?i)\b({NUMERIC_DATE})[ \t,]+({TIME})"
    )).unwrap();

    pub static ref TIME_BARE: Regex = Regex::new(&format!(
        r"(?i)\b({TIME})"
    )).unwrap();

    pub static ref DATE_LABEL: Regex = Regex::new(
        r"(?i)(?:\bdate\b|التاريخ|تاريخ)[ \t]*[:\-]?[ \t]*([^\n]+?)[ \t]*(?:\btime\b|الوقت|وقت|الساعة|\n|$)"
    ).unwrap();

    pub static ref TIME_LABEL: Regex = Regex::new(&format!(
        r"(?i)(?:\btime\b|الوقت|وقت|الساعة)[ \t]*[:\-]?[ \t]*({TIME})"
    )).unwrap();

    // Candidate tidying before format parsing
    pub static ref AM_PM_MARKER: Regex = Regex::new(
        r"(?i)(:[0-9]{2})[ \t]*(?:(a)\.?m\b\.?|(p)\.?m\b\.?|(ص)\b|(م)\b)"
    ).unwrap();

    pub static ref ARABIC_YEAR_SUFFIX: Regex = Regex::new(
        r"([0-9]{4})[ \t]*(?:م|هـ)"
    ).unwrap();

    pub static ref SEPT_ABBREVIATION: Regex = Regex::new(r"(?i)\bsept\b").unwrap();

    pub static ref WEEKDAY: Regex = Regex::new(
        r"(?i)\b(?:mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)\b\.?,?|(?:يوم[ \t]+)?(?:الأحد|الاحد|الإثنين|الاثنين|الثلاثاء|الأربعاء|الاربعاء|الخميس|الجمعة|السبت)[،,]?"
    ).unwrap();

    pub static ref ASCII_MONTH_NAME: Regex = Regex::new(r"(?i)[a-z]{3}").unwrap();
}

/// Arabic month names and the English abbreviation chrono understands.
pub const ARABIC_MONTHS: [(&str, &str); 16] = [
    ("يناير", "Jan"),
    ("فبراير", "Feb"),
    ("مارس", "Mar"),
    ("أبريل", "Apr"),
    ("إبريل", "Apr"),
    ("ابريل", "Apr"),
    ("مايو", "May"),
    ("يونيو", "Jun"),
    ("يوليو", "Jul"),
    ("أغسطس", "Aug"),
    ("اغسطس", "Aug"),
    ("سبتمبر", "Sep"),
    ("أكتوبر", "Oct"),
    ("اكتوبر", "Oct"),
    ("نوفمبر", "Nov"),
    ("ديسمبر", "Dec"),
];
