//! `forecasty` library crate.
//!
//! The binary (`forecasty`) is a thin wrapper around this library so that:
//!
//! - the forecasting core is testable without spawning processes
//! - the core (`domain`, `math`, `forecast`) stays free of storage and UI code
//! - front-ends (CLI, TUI) share one pipeline

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod store;
pub mod tui;
