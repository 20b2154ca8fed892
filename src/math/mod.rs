//! Mathematical utilities: least-squares line fitting and rounding.

pub mod ols;

pub use ols::*;
