//! Sample and synthetic series for demos and manual testing.

use chrono::{Datelike, Days, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Observation, Series};
use crate::error::AppError;

/// Upper bound (exclusive) of randomly generated entry values.
const RANDOM_VALUE_MAX: f64 = 5000.0;

/// Random entries fall within this many days before "today".
const RANDOM_DAYS_BACK: u64 = 365;

/// Longest synthetic series accepted (a century of months).
pub const MAX_SYNTHETIC_MONTHS: usize = 1200;

/// Built-in 12-month series trending from 0 to 5000 (starting 2024-09-01).
pub fn builtin_sample() -> Series {
    const VALUES: [f64; 12] = [
        0.0, 50.0, 150.0, 350.0, 700.0, 1200.0, 1800.0, 2600.0, 3400.0, 4100.0, 4700.0, 5000.0,
    ];
    let start = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default();
    Series::from_observations(VALUES.iter().enumerate().filter_map(|(i, &value)| {
        start
            .checked_add_months(Months::new(i as u32))
            .map(|date| Observation::new(date, value))
    }))
}

/// A random entry: value in `[0, 5000)` with two decimals, dated within the
/// past year relative to `today`.
pub fn random_entry<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Observation {
    let value = (rng.gen_range(0.0..RANDOM_VALUE_MAX) * 100.0).round() / 100.0;
    let days_back = rng.gen_range(0..RANDOM_DAYS_BACK);
    let date = today.checked_sub_days(Days::new(days_back)).unwrap_or(today);
    Observation::new(date, value)
}

/// Parameters for a synthetic monthly series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSpec {
    pub start: NaiveDate,
    pub months: usize,
    pub base: f64,
    /// Trend per month.
    pub slope: f64,
    /// Standard deviation of the Gaussian noise added to each month.
    pub noise_sd: f64,
    pub seed: u64,
}

impl SyntheticSpec {
    /// Twelve months from the first of `today`'s month, mild upward trend.
    pub fn default_from(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            months: 12,
            base: 1000.0,
            slope: 50.0,
            noise_sd: 40.0,
            seed: 42,
        }
    }
}

/// Linear trend plus Gaussian noise, one observation per calendar month.
///
/// Deterministic for a given `seed`.
pub fn synthetic_series(spec: &SyntheticSpec) -> Result<Series, AppError> {
    if spec.months == 0 || spec.months > MAX_SYNTHETIC_MONTHS {
        return Err(AppError::new(
            2,
            format!("Synthetic month count must be between 1 and {MAX_SYNTHETIC_MONTHS}."),
        ));
    }
    if !(spec.base.is_finite() && spec.slope.is_finite() && spec.noise_sd.is_finite()) {
        return Err(AppError::new(2, "Synthetic base, slope and noise must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| AppError::new(2, format!("Invalid noise setting: {e}")))?;

    let mut observations = Vec::with_capacity(spec.months);
    for i in 0..spec.months {
        let date = spec
            .start
            .checked_add_months(Months::new(i as u32))
            .ok_or_else(|| AppError::new(2, "Synthetic series runs past the supported date range."))?;
        let trend = spec.base + spec.slope * i as f64;
        let value = ((trend + noise.sample(&mut rng)) * 100.0).round() / 100.0;
        if !value.is_finite() {
            return Err(AppError::new(
                2,
                format!("Synthetic value for {date} is out of range; use a smaller base or slope."),
            ));
        }
        observations.push(Observation::new(date, value));
    }

    Ok(Series::from_observations(observations))
}
