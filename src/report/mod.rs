//! Reporting utilities: tables and summaries for terminal output.

pub mod format;

pub use format::*;
