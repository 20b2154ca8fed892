//! Demo data: the built-in sample, random entries and synthetic series.

pub mod sample;

pub use sample::*;
