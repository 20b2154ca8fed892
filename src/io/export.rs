//! Export a forecast to CSV or JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets: one row per date,
//! the actual value for recorded dates and one column per included algorithm
//! for projected dates. The JSON keeps the full result including metadata.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ForecastResult, Series};
use crate::error::AppError;

/// Portable JSON representation of a forecast run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub actual: Series,
    pub forecast: ForecastResult,
}

/// Write actuals plus projections to a CSV file.
pub fn write_forecast_csv(path: &Path, series: &Series, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_forecast_csv_to(file, series, result)
}

fn write_forecast_csv_to<W: std::io::Write>(out: W, series: &Series, result: &ForecastResult) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let map_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV: {e}"));

    let mut header = vec!["date".to_string(), "actual".to_string()];
    header.extend(result.per_algorithm.keys().map(|id| id.key().to_string()));
    writer.write_record(&header).map_err(map_err)?;

    let n_algos = result.per_algorithm.len();
    for obs in series {
        let mut row = vec![obs.date.to_string(), format!("{:.4}", obs.value)];
        row.extend(std::iter::repeat_n(String::new(), n_algos));
        writer.write_record(&row).map_err(map_err)?;
    }

    for (step, label) in result.labels.iter().enumerate() {
        let mut row = vec![label.to_string(), String::new()];
        row.extend(
            result
                .per_algorithm
                .values()
                .map(|out| format!("{:.4}", out.predictions[step])),
        );
        writer.write_record(&row).map_err(map_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the full forecast (actuals, labels, predictions, metadata) as JSON.
pub fn write_forecast_json(path: &Path, series: &Series, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    let doc = ForecastFile {
        tool: "forecasty".to_string(),
        actual: series.clone(),
        forecast: result.clone(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}

/// Read a forecast JSON file written by `write_forecast_json`.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))
}
