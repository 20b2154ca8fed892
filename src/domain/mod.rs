//! Domain types used throughout the application.
//!
//! This module defines:
//!
//! - the recorded data (`Observation`, `Series`)
//! - forecasting inputs (`AlgorithmId`, `Horizon`, `ForecastSettings`)
//! - forecasting outputs (`FittedLine`, `ForecastResult`, etc.)

pub mod types;

pub use types::*;
