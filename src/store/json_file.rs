//! JSON-file implementation of `SeriesStore`.
//!
//! File layout (other top-level keys are preserved on write):
//!
//! ```json
//! { "forecasty-data": [ { "date": "2025-01-01", "value": 100.0 } ] }
//! ```

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::domain::Series;
use crate::error::AppError;
use crate::store::{STORAGE_KEY, SeriesStore};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, AppError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let file = File::open(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to open store '{}': {e}", self.path.display()))
        })?;
        let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            AppError::new(2, format!("Invalid store JSON '{}': {e}", self.path.display()))
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::new(
                2,
                format!("Store '{}' must contain a JSON object.", self.path.display()),
            )),
        }
    }
}

impl SeriesStore for JsonFileStore {
    fn load_series(&self) -> Result<Series, AppError> {
        let mut doc = self.read_document()?;
        let Some(raw) = doc.remove(STORAGE_KEY) else {
            return Ok(Series::new());
        };
        let series: Series = serde_json::from_value(raw).map_err(|e| {
            AppError::new(
                2,
                format!("Invalid `{STORAGE_KEY}` records in '{}': {e}", self.path.display()),
            )
        })?;
        tracing::debug!(path = %self.path.display(), n = series.len(), "loaded series");
        Ok(series)
    }

    fn save_series(&self, series: &Series) -> Result<(), AppError> {
        // serde_json writes NaN/inf as `null`, which would make the store unreadable.
        if let Some(bad) = series.iter().find(|o| !o.value.is_finite()) {
            return Err(AppError::new(
                2,
                format!("Refusing to store non-finite value {} for {}.", bad.value, bad.date),
            ));
        }

        let mut doc = self.read_document()?;
        let records = serde_json::to_value(series)
            .map_err(|e| AppError::new(4, format!("Failed to encode series: {e}")))?;
        doc.insert(STORAGE_KEY.to_string(), records);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new(2, format!("Failed to create store directory '{}': {e}", parent.display()))
            })?;
        }
        let file = File::create(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to create store '{}': {e}", self.path.display()))
        })?;
        serde_json::to_writer_pretty(file, &Value::Object(doc))
            .map_err(|e| AppError::new(2, format!("Failed to write store: {e}")))?;

        tracing::debug!(path = %self.path.display(), n = series.len(), "saved series");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::Observation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn missing_file_is_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(store.load_series().unwrap().is_empty());
    }

    #[test]
    fn insert_remove_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("store.json"));

        store.insert(Observation::new(d(2025, 2, 1), 20.0)).unwrap();
        store.insert(Observation::new(d(2025, 1, 1), 10.0)).unwrap();
        let series = store.insert(Observation::new(d(2025, 2, 1), 25.0)).unwrap();
        assert_eq!(series.values(), vec![10.0, 25.0]);
        assert_eq!(store.load_series().unwrap(), series);

        let (removed, series) = store.remove(0).unwrap();
        assert_eq!(removed.value, 10.0);
        assert_eq!(series.len(), 1);
        assert_eq!(store.remove(3).unwrap_err().exit_code(), 2);

        store.clear().unwrap();
        assert!(store.load_series().unwrap().is_empty());
    }

    #[test]
    fn replace_overwrites_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store.insert(Observation::new(d(2024, 1, 1), 1.0)).unwrap();

        let fresh = Series::from_observations([Observation::new(d(2025, 5, 1), 9.0)]);
        store.replace(fresh.clone()).unwrap();
        assert_eq!(store.load_series().unwrap(), fresh);
    }

    #[test]
    fn non_finite_values_never_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::new(&path);
        store.insert(Observation::new(d(2025, 1, 1), 10.0)).unwrap();

        let poisoned = Series::from_observations([
            Observation::new(d(2025, 1, 1), f64::INFINITY),
            Observation::new(d(2025, 2, 1), f64::NAN),
        ]);
        assert_eq!(store.replace(poisoned).unwrap_err().exit_code(), 2);
        assert!(store.insert(Observation::new(d(2025, 3, 1), f64::NEG_INFINITY)).is_err());

        // The previous contents are untouched and still readable.
        assert!(!fs::read_to_string(&path).unwrap().contains("null"));
        assert_eq!(store.load_series().unwrap().values(), vec![10.0]);
        store.clear().unwrap();
        assert!(store.load_series().unwrap().is_empty());
    }

    #[test]
    fn other_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"theme":"dark","forecasty-data":[]}"#).unwrap();

        let store = JsonFileStore::new(&path);
        store
            .merge(&[Observation::new(d(2025, 3, 1), 1.5)])
            .unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc[STORAGE_KEY][0]["date"], "2025-03-01");
        assert_eq!(doc[STORAGE_KEY][0]["value"], 1.5);
    }

    #[test]
    fn unsorted_file_loads_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(
            &path,
            r#"{"forecasty-data":[{"date":"2025-03-01","value":3},{"date":"2025-01-01","value":1}]}"#,
        )
        .unwrap();
        let series = JsonFileStore::new(&path).load_series().unwrap();
        assert_eq!(series.values(), vec![1.0, 3.0]);
    }

    #[test]
    fn malformed_store_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = JsonFileStore::new(&path).load_series().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("JSON object"));
    }
}
