//! Forecast orchestration: labels, strategy fan-out and output validation.
//!
//! Rules:
//! 1. A forecast needs at least `MIN_FORECAST_POINTS` observations; otherwise
//!    the whole request fails with `InsufficientData`.
//! 2. Labels are generated once and shared by every strategy.
//! 3. A strategy that errors, returns the wrong number of predictions or
//!    produces non-finite values is dropped and recorded in `skipped`; the
//!    remaining strategies are unaffected.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{AlgorithmId, AlgorithmOutput, ForecastResult, Horizon, Series, SkippedAlgorithm};
use crate::error::ForecastError;
use crate::forecast::labels::future_dates;
use crate::forecast::strategy::{ForecastContext, Registry};

/// Minimum number of observations required to run a forecast.
pub const MIN_FORECAST_POINTS: usize = 2;

/// Run every enabled strategy against one series snapshot.
pub fn run_forecast(
    registry: &Registry,
    series: &Series,
    horizon: Horizon,
    enabled: &BTreeSet<AlgorithmId>,
) -> Result<ForecastResult, ForecastError> {
    let last = match series.last() {
        Some(last) if series.len() >= MIN_FORECAST_POINTS => last,
        _ => {
            return Err(ForecastError::InsufficientData {
                required: MIN_FORECAST_POINTS,
                actual: series.len(),
            });
        }
    };

    let labels = future_dates(last.date, horizon)?;
    let ctx = ForecastContext { labels: &labels };

    let mut per_algorithm = BTreeMap::new();
    let mut skipped = Vec::new();

    for &id in enabled {
        let Some(strategy) = registry.get(id) else {
            tracing::warn!(algorithm = id.key(), "algorithm enabled but not registered");
            skipped.push(SkippedAlgorithm {
                id,
                reason: "not registered".to_string(),
            });
            continue;
        };

        let output = match strategy.compute(series, horizon, &ctx) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(algorithm = id.key(), error = %err, "algorithm failed");
                skipped.push(SkippedAlgorithm {
                    id,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if let Err(reason) = validate_output(&output, horizon) {
            tracing::warn!(algorithm = id.key(), %reason, "discarding algorithm output");
            skipped.push(SkippedAlgorithm { id, reason });
            continue;
        }

        tracing::debug!(algorithm = id.key(), steps = horizon.get(), "algorithm output accepted");
        per_algorithm.insert(id, output);
    }

    Ok(ForecastResult {
        horizon,
        labels,
        per_algorithm,
        skipped,
    })
}

fn validate_output(output: &AlgorithmOutput, horizon: Horizon) -> Result<(), String> {
    let got = output.predictions.len();
    if got != horizon.get() {
        return Err(format!(
            "Output mismatch: expected {} prediction(s), got {got}",
            horizon.get()
        ));
    }
    if let Some(idx) = output.predictions.iter().position(|v| !v.is_finite()) {
        return Err(format!("Non-finite prediction at step {}", idx + 1));
    }
    Ok(())
}
