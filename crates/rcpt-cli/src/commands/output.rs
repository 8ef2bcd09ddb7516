//! Rendering extraction records for the terminal and output files.

use rcpt_core::{ExtractionResult, OutputFormat};

/// Output format argument.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

pub fn format_record(
    record: &ExtractionResult,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let amount = record.amount.map(|a| a.to_string()).unwrap_or_default();

    wtr.write_record(["amount", "trx_ref_last4", "date_time"])?;
    wtr.write_record([
        amount.as_str(),
        record.trx_ref_last4.as_deref().unwrap_or(""),
        record.date_time.as_deref().unwrap_or(""),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Amount:      {}\n",
        record.amount.map(|a| a.to_string()).as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Reference:   {}\n",
        record
            .trx_ref_last4
            .as_deref()
            .map(|r| format!("****{}", r))
            .as_deref()
            .unwrap_or("-")
    ));
    output.push_str(&format!(
        "Date/time:   {}\n",
        record.date_time.as_deref().unwrap_or("-")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcpt_core::extract_fields;

    #[test]
    fn test_csv_leaves_absent_fields_empty() {
        let record = extract_fields("Total: 50");
        let csv = format_record(&record, OutputFormat::Csv, false).unwrap();
        assert_eq!(csv, "amount,trx_ref_last4,date_time\n50,,\n");
    }

    #[test]
    fn test_text_summary() {
        let record = extract_fields("Total: 50\nRef: 00098765");
        let text = format_record(&record, OutputFormat::Text, false).unwrap();
        assert!(text.contains("Amount:      50\n"));
        assert!(text.contains("Reference:   ****8765\n"));
        assert!(text.contains("Date/time:   -\n"));
    }
}
