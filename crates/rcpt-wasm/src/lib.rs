//! WASM bindings for bank receipt OCR text.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Absent fields come back as `null`.

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use rcpt_core::ReceiptExtractor as _;
use rcpt_core::ReceiptParser;
use rcpt_core::models::receipt::ExtractionResult;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract amount, reference suffix and date/time from OCR text.
///
/// Returns `{ amount, trx_ref_last4, date_time }`.
#[wasm_bindgen]
pub fn extract_fields(text: &str) -> Result<JsValue, JsValue> {
    to_js(&rcpt_core::extract_fields(text))
}

/// Normalize OCR text (Arabic-Indic digits, separator look-alikes).
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    rcpt_core::normalize(text)
}

/// Parse a receipt amount (e.g., "1,234.56" or "1.234,56").
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    rcpt_core::parse_amount(&rcpt_core::normalize(amount))
        .and_then(|d| d.to_string().parse().ok())
}

/// Receipt extractor class for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    parser: ReceiptParser,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create a new receipt extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: ReceiptParser::new(),
        }
    }

    /// Create an extractor from a JSON extraction configuration.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config_json: &str) -> Result<ReceiptExtractor, JsValue> {
        let config: rcpt_core::ExtractionConfig =
            serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            parser: ReceiptParser::from_config(&config),
        })
    }

    /// Extract the receipt fields.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.extract(text))
    }

    /// Get extraction result with metadata.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let parsed = self.parser.parse(text);

        #[derive(Serialize)]
        struct ExtractResult {
            fields: ExtractionResult,
            normalized_text: String,
            confidence: f32,
            warnings: Vec<String>,
        }

        let output = ExtractResult {
            fields: parsed.fields,
            normalized_text: parsed.normalized_text,
            confidence: parsed.metadata.confidence,
            warnings: parsed.metadata.warnings,
        };

        to_js(&output)
    }

    /// Every candidate per field, strongest first.
    #[wasm_bindgen]
    pub fn candidates(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.candidates(text))
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}
