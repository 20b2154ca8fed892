//! Error types.
//!
//! Two layers:
//! - `ForecastError`: failures inside the pure forecasting core
//! - `AppError`: host-level failures carrying a process exit code
//!
//! Exit codes: 2 = bad input/config/file, 3 = not enough data, 4 = internal.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the forecasting core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Not enough observations for the requested computation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A parameter outside its valid domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Month arithmetic left chrono's representable date range.
    #[error("Date out of range: {date} + {months} month(s)")]
    DateOutOfRange { date: NaiveDate, months: u32 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let code = match err {
            ForecastError::InsufficientData { .. } => 3,
            ForecastError::InvalidParameter { .. } => 2,
            ForecastError::DateOutOfRange { .. } => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = ForecastError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Insufficient data: need at least 2 points, got 1");
    }

    #[test]
    fn forecast_errors_map_to_exit_codes() {
        let insufficient: AppError = ForecastError::InsufficientData {
            required: 2,
            actual: 0,
        }
        .into();
        assert_eq!(insufficient.exit_code(), 3);

        let invalid: AppError = ForecastError::InvalidParameter {
            name: "window".to_string(),
            reason: "must be positive".to_string(),
        }
        .into();
        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(invalid.message(), "Invalid parameter 'window': must be positive");
    }
}
