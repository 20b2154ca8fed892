//! Forecasting core.
//!
//! Responsibilities:
//!
//! - generate the shared calendar-month labels (`labels`)
//! - implement the interchangeable strategies and their registry (`strategy`)
//! - fan out, validate and merge strategy outputs (`orchestrator`)
//!
//! Everything here is a pure function of its arguments: no I/O, no globals.

pub mod labels;
pub mod orchestrator;
pub mod strategy;

pub use labels::*;
pub use orchestrator::*;
pub use strategy::*;
