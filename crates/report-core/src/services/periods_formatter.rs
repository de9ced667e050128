//! Markdown listing of cached report periods

use crate::error::{ReportError, Result};
use chrono::NaiveDateTime;
use report_types::{display_or_na, PeriodsMarkdown, ReportPeriod};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse the `periods_list` payload: `{ "data": [ {ticker, year, quarter}, ... ] }`
pub fn parse_periods_list(periods_list: &Value) -> Result<Vec<ReportPeriod>> {
    let data = periods_list
        .get("data")
        .ok_or_else(|| ReportError::Validation("Invalid periods_list: missing 'data' field".to_string()))?;

    let entries = data
        .as_array()
        .ok_or_else(|| ReportError::Validation("Invalid periods_list: 'data' should be a list".to_string()))?;

    Ok(entries.iter().filter_map(parse_period).collect())
}

// Fields are read leniently: numeric strings count as numbers, anything
// else unusable becomes absent. Non-object entries are skipped.
fn parse_period(entry: &Value) -> Option<ReportPeriod> {
    if !entry.is_object() {
        log::warn!("Skipping period entry that is not an object: {}", entry);
        return None;
    }

    let ticker = entry
        .get("ticker")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("Unknown");

    Some(ReportPeriod {
        ticker: ticker.to_string(),
        year: int_field(entry, "year"),
        quarter: int_field(entry, "quarter"),
    })
}

fn int_field(entry: &Value, name: &str) -> Option<i64> {
    match entry.get(name)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render periods grouped by ticker as Markdown tables.
///
/// Tickers are listed in lexicographic order and each ticker's periods are
/// sorted by (year, quarter), with missing values sorting first.
pub fn format_periods(periods: &[ReportPeriod], generated_at: Option<NaiveDateTime>) -> PeriodsMarkdown {
    let mut lines: Vec<String> = vec!["# Cached Report Periods".to_string(), String::new()];

    if let Some(timestamp) = generated_at {
        lines.push(format!("*Generated on: {}*", timestamp.format("%Y-%m-%d %H:%M:%S")));
        lines.push(String::new());
    }

    lines.push(format!("**Total Periods Available: {}**", periods.len()));
    lines.push(String::new());

    if periods.is_empty() {
        lines.push("No cached periods available.".to_string());
        return PeriodsMarkdown {
            markdown: lines.join("\n"),
            periods_count: 0,
        };
    }

    let mut by_ticker: BTreeMap<&str, Vec<&ReportPeriod>> = BTreeMap::new();
    for period in periods {
        by_ticker.entry(period.ticker.as_str()).or_default().push(period);
    }

    lines.push("## Available Periods by Ticker".to_string());
    lines.push(String::new());

    for (ticker, mut ticker_periods) in by_ticker {
        lines.push(format!("### {}", ticker));
        lines.push(String::new());

        ticker_periods.sort_by_key(|p| (p.year.unwrap_or(0), p.quarter.unwrap_or(0)));

        lines.push("| Year | Quarter | Period |".to_string());
        lines.push("|------|---------|--------|".to_string());

        for period in ticker_periods {
            lines.push(format!(
                "| {} | {} | {} |",
                display_or_na(period.year),
                display_or_na(period.quarter),
                period.label()
            ));
        }

        lines.push(String::new());
    }

    PeriodsMarkdown {
        markdown: lines.join("\n"),
        periods_count: periods.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_single_ticker_sorted_quarters() {
        let periods = vec![ReportPeriod::new("X", 2023, 2), ReportPeriod::new("X", 2023, 1)];
        let result = format_periods(&periods, None);

        assert_eq!(result.periods_count, 2);
        assert_eq!(result.markdown.matches("### X").count(), 1);

        let q1 = result.markdown.find("| 2023 | 1 | Q1 2023 |").unwrap();
        let q2 = result.markdown.find("| 2023 | 2 | Q2 2023 |").unwrap();
        assert!(q1 < q2);
    }

    #[test]
    fn test_tickers_sorted_and_grouped() {
        let periods = vec![
            ReportPeriod::new("MSFT", 2024, 1),
            ReportPeriod::new("AAPL", 2024, 2),
            ReportPeriod::new("AAPL", 2023, 4),
        ];
        let result = format_periods(&periods, None);

        let aapl = result.markdown.find("### AAPL").unwrap();
        let msft = result.markdown.find("### MSFT").unwrap();
        assert!(aapl < msft);

        let older = result.markdown.find("Q4 2023").unwrap();
        let newer = result.markdown.find("Q2 2024").unwrap();
        assert!(older < newer);
        assert!(result.markdown.contains("**Total Periods Available: 3**"));
    }

    #[test]
    fn test_empty_periods() {
        let result = format_periods(&[], None);
        assert_eq!(result.periods_count, 0);
        assert!(result.markdown.ends_with("No cached periods available."));
        assert!(!result.markdown.contains('|'));
    }

    #[test]
    fn test_missing_components_use_fallback_label() {
        let periods = vec![ReportPeriod {
            ticker: "Y".to_string(),
            year: Some(2022),
            quarter: None,
        }];
        let result = format_periods(&periods, None);
        assert!(result.markdown.contains("| 2022 | N/A | 2022-N/A |"));
    }

    #[test]
    fn test_generated_at_line() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        let result = format_periods(&[], Some(timestamp));
        assert!(result.markdown.contains("*Generated on: 2024-05-06 07:08:09*"));
    }

    #[test]
    fn test_parse_periods_list() {
        let payload = json!({
            "data": [
                {"ticker": "X", "year": 2023, "quarter": 1},
                {"year": 2024}
            ]
        });
        let periods = parse_periods_list(&payload).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].ticker, "Unknown");
        assert_eq!(periods[1].quarter, None);
    }

    #[test]
    fn test_parse_periods_list_reads_entries_leniently() {
        let payload = json!({
            "data": [
                {"ticker": null, "year": "2024", "quarter": 2},
                {"ticker": "X", "year": 2023, "quarter": "Q?"},
                "not a period"
            ]
        });
        let periods = parse_periods_list(&payload).unwrap();

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0], ReportPeriod::new("Unknown", 2024, 2));
        assert_eq!(periods[1].year, Some(2023));
        assert_eq!(periods[1].quarter, None);

        let result = format_periods(&periods, None);
        assert!(result.markdown.contains("| 2024 | 2 | Q2 2024 |"));
        assert!(result.markdown.contains("| 2023 | N/A | 2023-N/A |"));
    }

    #[test]
    fn test_parse_periods_list_rejects_bad_shape() {
        let err = parse_periods_list(&json!({})).unwrap_err();
        assert!(err.to_string().contains("missing 'data'"));

        let err = parse_periods_list(&json!({"data": {"ticker": "X"}})).unwrap_err();
        assert!(err.to_string().contains("should be a list"));
    }
}
