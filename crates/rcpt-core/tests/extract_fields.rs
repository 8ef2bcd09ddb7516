use std::str::FromStr;

use pretty_assertions::assert_eq;
use rcpt_core::receipt::rules::normalize_char;
use rcpt_core::{
    ExtractionConfig, ExtractionResult, ReceiptExtractor, ReceiptParser, extract_fields,
    normalize,
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next_byte(&mut self) -> u8 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u8
    }

    fn bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_byte()).collect()
    }
}

#[test]
fn empty_input_yields_empty_record() {
    assert_eq!(extract_fields(""), ExtractionResult::default());
    assert_eq!(extract_fields("   \n\t  "), ExtractionResult::default());
}

#[test]
fn full_english_receipt() {
    let text = "NATIONAL BANK\n\
                Transfer successful\n\
                Amount: 1,234.56 EGP\n\
                Reference: 00098765\n\
                Date: 14/03/2024 Time: 13:05";

    assert_eq!(
        extract_fields(text),
        ExtractionResult {
            amount: Some(dec("1234.56")),
            trx_ref_last4: Some("8765".to_string()),
            date_time: Some("13:05:00 14-03-2024".to_string()),
        }
    );
}

#[test]
fn full_arabic_receipt() {
    let text = "تم التحويل بنجاح\n\
                المبلغ ١٬٢٣٤٫٥٦ ج.م\n\
                رقم العملية: ٠٠٠٩٨٧٦٥\n\
                التاريخ: ١٤/٠٣/٢٠٢٤\n\
                الوقت: ١٣:٠٥:٣٠";

    assert_eq!(
        extract_fields(text),
        ExtractionResult {
            amount: Some(dec("1234.56")),
            trx_ref_last4: Some("8765".to_string()),
            date_time: Some("13:05:30 14-03-2024".to_string()),
        }
    );
}

#[test]
fn amount_separator_styles() {
    assert_eq!(extract_fields("Total: 1,234.56").amount, Some(dec("1234.56")));
    assert_eq!(extract_fields("المبلغ 1.234,56").amount, Some(dec("1234.56")));
    assert_eq!(extract_fields("Total 12,000").amount, Some(dec("12000")));
}

#[test]
fn reference_suffix() {
    assert_eq!(
        extract_fields("Ref: 00098765").trx_ref_last4,
        Some("8765".to_string())
    );
    assert_eq!(extract_fields("Paid 250 EGP, thank you").trx_ref_last4, None);
}

#[test]
fn date_time_seconds_convention() {
    // Missing seconds default to :00, explicit seconds are kept
    assert_eq!(
        extract_fields("Date: 14/03/2024 Time: 13:05").date_time,
        Some("13:05:00 14-03-2024".to_string())
    );
    assert_eq!(
        extract_fields("Date: 14/03/2024 Time: 13:05:47").date_time,
        Some("13:05:47 14-03-2024".to_string())
    );
    assert_eq!(
        extract_fields("Date: 14/03/2024").date_time,
        Some("00:00:00 14-03-2024".to_string())
    );
}

#[test]
fn arabic_digits_normalized_before_extraction() {
    assert_eq!(normalize("١٢٣٤"), "1234");

    let parsed = ReceiptParser::new().parse("Total: ١٢٣٤");
    assert_eq!(parsed.normalized_text, "Total: 1234");
    assert_eq!(parsed.fields.amount, Some(dec("1234")));
}

#[test]
fn extraction_is_stable_under_normalization() {
    let samples = [
        "Amount: ١٬٢٥٠٫٠٠ | Ref: ٠٠٠١٢٣٤٥٦٧٨٩",
        "التاريخ: ١٤\u{2014}٠٣\u{2014}٢٠٢٤",
        "Total 12,000\nDate: 2024-03-14 09:15",
        "",
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once);
        assert_eq!(extract_fields(&once), extract_fields(sample));
    }
}

#[test]
fn parser_honours_configuration() {
    let config = ExtractionConfig {
        reference_fallback_min_digits: 6,
        date_label_max_chars: 20,
        datetime_format: "%d/%m/%Y %H:%M".to_string(),
    };
    let result = ReceiptParser::from_config(&config).extract("Auth 654321\n14-03-2024 08:30");

    assert_eq!(result.trx_ref_last4, Some("4321".to_string()));
    assert_eq!(result.date_time, Some("14/03/2024 08:30".to_string()));
}

#[test]
fn serializes_absent_fields_as_null() {
    let json = serde_json::to_string(&extract_fields("Total: 50")).unwrap();
    assert_eq!(
        json,
        r#"{"amount":50.0,"trx_ref_last4":null,"date_time":null}"#
    );
}

#[test]
fn adversarial_digit_free_input_yields_nothing() {
    let mut rng = Lcg(0x5eed);
    for len in [1, 7, 64, 512, 4096] {
        let bytes = rng.bytes(len);
        let text: String = String::from_utf8_lossy(&bytes)
            .chars()
            .filter(|c| !normalize_char(*c).is_ascii_digit())
            .collect();

        assert_eq!(extract_fields(&text), ExtractionResult::default());
    }
}

#[test]
fn arbitrary_input_never_panics() {
    let mut rng = Lcg(42);
    for len in [0, 3, 100, 1000, 10_000] {
        let bytes = rng.bytes(len);
        let text = String::from_utf8_lossy(&bytes);
        let _ = extract_fields(&text);
        let _ = ReceiptParser::new().candidates(&text);
    }

    let noisy = "Date: ::::////----\nTime: 99:99\nTotal: ,,,..\nRef: #\n١٤/٠٣/ ١٩٩٩٩٩٩٩٩٩";
    let _ = extract_fields(noisy);
}
