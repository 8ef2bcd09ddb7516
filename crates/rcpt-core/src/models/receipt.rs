//! Receipt extraction record.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Fields extracted from a single receipt.
///
/// Every field is optional: `None` means the field could not be located or
/// parsed, which is distinct from a located zero amount. The record is
/// advisory; a human reviewer may override any field before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Monetary amount, currency symbol discarded. Never negative.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,

    /// Last four digits of the transaction reference.
    #[serde(default)]
    pub trx_ref_last4: Option<String>,

    /// Transaction date/time in the canonical output format, or the raw
    /// captured text when no known format applied.
    #[serde(default)]
    pub date_time: Option<String>,
}

impl ExtractionResult {
    /// True when no field could be extracted.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.trx_ref_last4.is_none() && self.date_time.is_none()
    }

    /// Fields that are absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<ReceiptField> {
        let mut missing = Vec::new();
        if self.amount.is_none() {
            missing.push(ReceiptField::Amount);
        }
        if self.trx_ref_last4.is_none() {
            missing.push(ReceiptField::TrxRefLast4);
        }
        if self.date_time.is_none() {
            missing.push(ReceiptField::DateTime);
        }
        missing
    }

    /// Amount as a floating-point value.
    pub fn amount_f64(&self) -> Option<f64> {
        self.amount.and_then(|a| a.to_f64())
    }
}

/// Names of the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptField {
    Amount,
    TrxRefLast4,
    DateTime,
}

impl ReceiptField {
    pub const ALL: [ReceiptField; 3] = [Self::Amount, Self::TrxRefLast4, Self::DateTime];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::TrxRefLast4 => "trx_ref_last4",
            Self::DateTime => "date_time",
        }
    }
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Overall extraction confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Issues a reviewer should look at.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Fields that could not be extracted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<ReceiptField>,

    /// Field-level confidence scores, keyed by field name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_confidence: HashMap<String, f32>,
}
