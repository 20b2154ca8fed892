//! Shared "forecast pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! store snapshot -> registry for the current window -> orchestrator
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{ForecastResult, ForecastSettings, Series};
use crate::error::AppError;
use crate::forecast::{Registry, run_forecast};
use crate::store::SeriesStore;

/// All computed outputs of a single forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    /// The snapshot the forecast was computed from.
    pub series: Series,
    pub result: ForecastResult,
}

/// Load a fresh snapshot from `store` and forecast it.
pub fn run_forecast_from_store<S: SeriesStore + ?Sized>(
    store: &S,
    settings: &ForecastSettings,
) -> Result<RunOutput, AppError> {
    let series = store.load_series()?;
    forecast_snapshot(series, settings)
}

/// Forecast an already-loaded snapshot.
pub fn forecast_snapshot(series: Series, settings: &ForecastSettings) -> Result<RunOutput, AppError> {
    let registry = Registry::standard(settings.ma_window);
    let result = run_forecast(&registry, &series, settings.horizon, &settings.enabled)?;

    tracing::info!(
        n = series.len(),
        horizon = settings.horizon.get(),
        included = result.per_algorithm.len(),
        skipped = result.skipped.len(),
        "forecast computed"
    );

    Ok(RunOutput { series, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{AlgorithmId, Horizon, Observation};
    use crate::store::JsonFileStore;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, 1).unwrap()
    }

    #[test]
    fn every_run_sees_the_latest_store_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store
            .merge(&[Observation::new(d(1), 100.0), Observation::new(d(2), 120.0)])
            .unwrap();

        let settings = ForecastSettings {
            horizon: Horizon::new(2).unwrap(),
            ..ForecastSettings::default()
        };
        let first = run_forecast_from_store(&store, &settings).unwrap();
        assert_eq!(first.result.per_algorithm[&AlgorithmId::Naive].predictions, vec![120.0, 120.0]);

        store.insert(Observation::new(d(3), 200.0)).unwrap();
        let second = run_forecast_from_store(&store, &settings).unwrap();
        assert_eq!(second.series.len(), 3);
        assert_eq!(second.result.per_algorithm[&AlgorithmId::Naive].predictions, vec![200.0, 200.0]);
        assert_eq!(second.result.labels, vec![d(4), d(5)]);
    }

    #[test]
    fn too_little_data_maps_to_exit_code_3() {
        let series = Series::from_observations([Observation::new(d(1), 1.0)]);
        let err = forecast_snapshot(series, &ForecastSettings::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn window_setting_reaches_the_strategy() {
        let series = Series::from_observations((1..=6).map(|m| Observation::new(d(m), (m * m) as f64)));
        let settings = ForecastSettings {
            horizon: Horizon::new(1).unwrap(),
            ma_window: 2,
            enabled: [AlgorithmId::MovingAverageTrend].into_iter().collect(),
        };
        let run = forecast_snapshot(series, &settings).unwrap();
        // Last two points 25, 36 -> slope 11 -> next 47.
        assert_eq!(run.result.per_algorithm[&AlgorithmId::MovingAverageTrend].predictions, vec![47.0]);
    }
}
