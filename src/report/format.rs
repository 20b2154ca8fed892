//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the forecasting core stays free of presentation concerns
//! - output changes are localized (the tables are covered by snapshot tests)
//!
//! Date helpers are best-effort: input that does not parse as a date is
//! returned unchanged instead of raising an error.

use chrono::NaiveDate;

use crate::domain::{AlgorithmMetadata, ForecastResult, Series};
use crate::io::ingest::parse_date;

/// Free-form user text → `DD/MM/YY` when it parses as a date.
///
/// Unparseable (or still incomplete) input is returned as-is.
pub fn format_dd_mm_yy(raw: &str) -> String {
    match parse_date(raw) {
        Ok(d) => d.format("%d/%m/%y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// `DD/MM/YY` for an already-parsed date.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// `MM/YY` for an already-parsed date, used for chart axes.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%m/%y").to_string()
}

/// Table of recorded observations with 1-based row numbers.
pub fn format_series_table(series: &Series) -> String {
    if series.is_empty() {
        return "No data yet\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("{:>4} {:<10} {:>14}\n", "#", "date", "value"));
    out.push_str(&format!("{:->4} {:-<10} {:->14}\n", "", "", ""));
    for (idx, obs) in series.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} {:<10} {:>14}\n",
            idx + 1,
            day_label(obs.date),
            fmt_value(obs.value),
        ));
    }
    out
}

/// Summary header: data range, horizon and per-algorithm fit details.
pub fn format_forecast_summary(series: &Series, result: &ForecastResult) -> String {
    let mut out = String::new();

    out.push_str("=== forecasty ===\n");
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        out.push_str(&format!(
            "Data: n={} | {} → {}\n",
            series.len(),
            first.date,
            last.date
        ));
    }
    out.push_str(&format!("Horizon: {} month(s)\n", result.horizon));

    if result.per_algorithm.is_empty() {
        out.push_str("\nNo algorithm selected: showing actuals only.\n");
    } else {
        out.push_str("\nAlgorithms:\n");
        for (id, output) in &result.per_algorithm {
            out.push_str(&format!("- {:<9} {}\n", id.display_name(), describe_metadata(&output.metadata)));
        }
    }

    for skipped in &result.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", skipped.id.display_name(), skipped.reason));
    }

    out
}

/// One row per future label, one column per included algorithm.
pub fn format_forecast_table(result: &ForecastResult) -> String {
    let mut out = String::new();

    let mut header = format!("{:<8}", "month");
    let mut rule = format!("{:-<8}", "");
    for id in result.per_algorithm.keys() {
        header.push_str(&format!(" {:>14}", id.display_name()));
        rule.push_str(&format!(" {:-<14}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for (step, label) in result.labels.iter().enumerate() {
        let mut row = format!("{:<8}", month_label(*label));
        for output in result.per_algorithm.values() {
            row.push_str(&format!(" {:>14}", fmt_value(output.predictions[step])));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

fn describe_metadata(meta: &AlgorithmMetadata) -> String {
    match meta {
        AlgorithmMetadata::Linear { slope, intercept } => {
            format!("slope={slope:.4}/month intercept={intercept:.4}")
        }
        AlgorithmMetadata::MovingAverageTrend {
            window,
            slope,
            intercept,
        } => format!("window={window} slope={slope:.4}/step intercept={intercept:.4}"),
        AlgorithmMetadata::Naive { last_value } => format!("last={}", fmt_value(*last_value)),
    }
}

fn fmt_value(v: f64) -> String {
    format!("{v:.4}")
}
