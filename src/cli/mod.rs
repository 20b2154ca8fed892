//! Command-line parsing for the forecasty series tracker.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::AlgorithmId;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "forecasty", version, about = "Record a monthly series and project it forward")]
pub struct Cli {
    /// JSON store file (overrides FORECASTY_STORE).
    #[arg(long, global = true, value_name = "JSON")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record one observation (replaces an existing entry with the same date).
    Add(AddArgs),
    /// Remove the n-th entry as shown by `list` (1-based).
    Remove(RemoveArgs),
    /// Print the recorded series.
    List,
    /// Bulk-import rows from a file, or from stdin when no file is given.
    Import(ImportArgs),
    /// Delete every recorded observation.
    Clear(ClearArgs),
    /// Replace the series with the built-in sample or a synthetic one.
    Sample(SampleArgs),
    /// Project the series forward and print tables/plot, optionally export.
    Forecast(ForecastArgs),
    /// Re-render a forecast saved with `forecast --export-json`, without touching the store.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying forecast pipeline as `forecasty forecast`,
    /// but renders results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AddArgs {
    /// Observation date (YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY or YYYY/MM/DD).
    #[arg(long, required_unless_present = "random")]
    pub date: Option<String>,

    /// Observation value.
    #[arg(long, allow_hyphen_values = true, required_unless_present = "random")]
    pub value: Option<String>,

    /// Add a random entry instead (value in [0, 5000), date within the past year).
    #[arg(long, conflicts_with_all = ["date", "value"])]
    pub random: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RemoveArgs {
    /// Entry number as printed by `list`.
    pub index: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// CSV / TSV / whitespace-separated file; stdin when omitted.
    pub file: Option<PathBuf>,

    /// Replace the stored series instead of merging into it.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Generate a seeded synthetic series (trend + Gaussian noise).
    #[arg(long)]
    pub synthetic: bool,

    /// Number of monthly points for the synthetic series.
    #[arg(long, default_value_t = 12)]
    pub months: usize,

    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Starting level of the synthetic series.
    #[arg(long, default_value_t = 1000.0, allow_hyphen_values = true)]
    pub base: f64,

    /// Trend per month of the synthetic series.
    #[arg(long, default_value_t = 50.0, allow_hyphen_values = true)]
    pub slope: f64,

    /// Noise standard deviation of the synthetic series.
    #[arg(long, default_value_t = 40.0)]
    pub noise: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Months to project. Non-numeric, zero or negative falls back to the default.
    #[arg(long, allow_hyphen_values = true)]
    pub horizon: Option<String>,

    /// Algorithms to include (repeatable). Defaults to all.
    #[arg(long = "algo", value_enum)]
    pub algos: Vec<AlgorithmId>,

    /// Moving-average-trend window. Non-numeric, zero or negative falls back to the default.
    #[arg(long, allow_hyphen_values = true)]
    pub window: Option<String>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export actuals + projections to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full forecast result (with metadata) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Forecast JSON written by `forecast --export-json`.
    pub input: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Initial horizon.
    #[arg(long, allow_hyphen_values = true)]
    pub horizon: Option<String>,

    /// Initial moving-average-trend window.
    #[arg(long, allow_hyphen_values = true)]
    pub window: Option<String>,
}
