//! Local persistence for the recorded series.
//!
//! The forecasting core never touches storage: the host loads a fresh
//! snapshot through `SeriesStore::load_series` before every request.
//!
//! - `SeriesStore`: the narrow interface the rest of the app depends on
//! - `JsonFileStore`: a single JSON document keyed like a browser local store

use crate::domain::{Observation, Series};
use crate::error::AppError;

pub mod json_file;

pub use json_file::*;

/// Fixed key under which the series is stored.
pub const STORAGE_KEY: &str = "forecasty-data";

/// Owner of the persisted series.
///
/// Mutators return the updated series so callers can re-render without an
/// extra load.
pub trait SeriesStore {
    /// Read-only snapshot of the current series (empty if nothing stored yet).
    fn load_series(&self) -> Result<Series, AppError>;

    /// Overwrite the stored series.
    fn save_series(&self, series: &Series) -> Result<(), AppError>;

    /// Add one observation; an existing entry with the same date is replaced.
    fn insert(&self, obs: Observation) -> Result<Series, AppError> {
        let mut series = self.load_series()?;
        series.insert(obs);
        self.save_series(&series)?;
        Ok(series)
    }

    /// Merge a batch of observations, last write wins.
    fn merge(&self, observations: &[Observation]) -> Result<Series, AppError> {
        let mut series = self.load_series()?;
        series.merge(observations.iter().copied());
        self.save_series(&series)?;
        Ok(series)
    }

    /// Replace the whole series (sample loading, `import --replace`).
    fn replace(&self, series: Series) -> Result<Series, AppError> {
        self.save_series(&series)?;
        Ok(series)
    }

    /// Remove the observation at chronological position `index`.
    fn remove(&self, index: usize) -> Result<(Observation, Series), AppError> {
        let mut series = self.load_series()?;
        let len = series.len();
        let removed = series.remove(index).ok_or_else(|| {
            AppError::new(2, format!("No entry #{} to remove (series length: {len}).", index + 1))
        })?;
        self.save_series(&series)?;
        Ok((removed, series))
    }

    /// Delete every stored observation.
    fn clear(&self) -> Result<(), AppError> {
        self.save_series(&Series::new())
    }
}
