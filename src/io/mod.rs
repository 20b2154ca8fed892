//! Input/output helpers.
//!
//! - pasted text / CSV import + validation (`ingest`)
//! - forecast exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
