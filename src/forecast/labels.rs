//! Calendar-month label generation and the month time axis.
//!
//! All strategies share one label sequence: step `m` is `last_date + m`
//! calendar months. chrono's `checked_add_months` already clamps the day to
//! the end of shorter months (Jan 31 + 1 month = Feb 28/29), and we always
//! offset from `last_date` so clamping never accumulates across steps.

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::Horizon;
use crate::error::ForecastError;

/// Future dates, one per horizon step.
pub fn future_dates(last_date: NaiveDate, horizon: Horizon) -> Result<Vec<NaiveDate>, ForecastError> {
    (1..=horizon.get())
        .map(|step| {
            let months = u32::try_from(step).map_err(|_| ForecastError::InvalidParameter {
                name: "horizon".to_string(),
                reason: format!("{step} months does not fit a calendar offset"),
            })?;
            last_date
                .checked_add_months(Months::new(months))
                .ok_or(ForecastError::DateOutOfRange {
                    date: last_date,
                    months,
                })
        })
        .collect()
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(a), Some(b)) => (b - a).num_days() as u32,
        // Only reachable at the edges of chrono's range.
        _ => 31,
    }
}

/// Position of `date` on a continuous month axis.
///
/// Whole months are counted from January 1970; the day within the month adds
/// a fraction, so the 1st of every month lands on an integer. Month-start
/// series are therefore evenly spaced at exactly 1.0, and mid-month or
/// irregular observations keep their true relative position.
///
/// A day is worth `1 / days_in_month` of x, so equal day gaps span slightly
/// different distances depending on the month (1/31 in January, 1/28 in a
/// non-leap February).
pub fn month_coordinate(date: NaiveDate) -> f64 {
    let whole = (date.year() as f64 - 1970.0) * 12.0 + date.month0() as f64;
    let dim = days_in_month(date.year(), date.month()) as f64;
    whole + date.day0() as f64 / dim
}
