//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves configuration
//! - installs logging
//! - edits the stored series (add/remove/import/clear/sample)
//! - runs forecasts and prints reports/plots
//! - writes optional exports and re-renders saved ones

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::{BufRead, Read, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{AddArgs, ClearArgs, Command, ForecastArgs, ImportArgs, PlotArgs, RemoveArgs, SampleArgs, TuiArgs};
use crate::config::{AppConfig, coerce_window};
use crate::data::{SyntheticSpec, builtin_sample, random_entry, synthetic_series};
use crate::domain::{AlgorithmId, ForecastSettings, Observation, Series};
use crate::error::AppError;
use crate::io::ingest::{ImportedRows, parse_date, parse_value};
use crate::store::SeriesStore;

pub mod context;
pub mod pipeline;

pub use context::AppContext;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "forecasty=warn";

/// Entry point for the `forecasty` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `forecasty` and `forecasty --horizon 12` to behave like
    // `forecasty tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let ctx = AppContext::new(AppConfig::from_env(), cli.store);

    match &cli.command {
        Command::Tui(_) => init_tui_logging(ctx.config.log_file.as_deref())?,
        _ => init_cli_logging(),
    }
    tracing::debug!(store = %ctx.store.path().display(), "resolved configuration");

    match cli.command {
        Command::Add(args) => handle_add(&ctx, args),
        Command::Remove(args) => handle_remove(&ctx, args),
        Command::List => handle_list(&ctx),
        Command::Import(args) => handle_import(&ctx, args),
        Command::Clear(args) => handle_clear(&ctx, args),
        Command::Sample(args) => handle_sample(&ctx, args),
        Command::Forecast(args) => handle_forecast(&ctx, args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(&ctx, args),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_cli_logging() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter())
        .try_init();
}

/// The TUI owns the terminal: log to a file when one is configured, otherwise
/// install nothing so events are dropped.
fn init_tui_logging(log_file: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .try_init();
    Ok(())
}

fn handle_add(ctx: &AppContext, args: AddArgs) -> Result<(), AppError> {
    let obs = if args.random {
        random_entry(Local::now().date_naive(), &mut rand::thread_rng())
    } else {
        observation_from_text(args.date.as_deref().unwrap_or(""), args.value.as_deref().unwrap_or(""))?
    };

    let series = ctx.store.insert(obs)?;
    println!("Added {} = {:.4} ({} entries)", obs.date, obs.value, series.len());
    Ok(())
}

/// Validate a typed date/value pair.
pub fn observation_from_text(date: &str, value: &str) -> Result<Observation, AppError> {
    let date = parse_date(date).map_err(|e| AppError::new(2, e))?;
    let value = parse_value(value).map_err(|e| AppError::new(2, e))?;
    Ok(Observation::new(date, value))
}

fn handle_remove(ctx: &AppContext, args: RemoveArgs) -> Result<(), AppError> {
    let Some(index) = args.index.checked_sub(1) else {
        return Err(AppError::new(2, "Entry numbers start at 1 (see `forecasty list`)."));
    };
    let (removed, series) = ctx.store.remove(index)?;
    println!("Removed {} = {:.4} ({} entries left)", removed.date, removed.value, series.len());
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<(), AppError> {
    let series = ctx.store.load_series()?;
    print!("{}", crate::report::format_series_table(&series));
    Ok(())
}

fn handle_import(ctx: &AppContext, args: ImportArgs) -> Result<(), AppError> {
    let imported = match &args.file {
        Some(path) => crate::io::ingest::load_import_file(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| AppError::new(2, format!("Failed to read stdin: {e}")))?;
            crate::io::ingest::parse_pasted_text(&text)?
        }
    };

    report_row_errors(&imported);

    let series = if args.replace {
        ctx.store.replace(Series::from_observations(imported.observations.iter().copied()))?
    } else {
        ctx.store.merge(&imported.observations)?
    };

    println!(
        "Imported {} row(s), {} rejected; series now has {} entries.",
        imported.observations.len(),
        imported.row_errors.len(),
        series.len()
    );
    Ok(())
}

fn report_row_errors(imported: &ImportedRows) {
    for err in &imported.row_errors {
        eprintln!("line {}: {}", err.line, err.message);
    }
}

fn handle_clear(ctx: &AppContext, args: ClearArgs) -> Result<(), AppError> {
    let n = ctx.store.load_series()?.len();
    if n == 0 {
        println!("Nothing to clear.");
        return Ok(());
    }

    if !args.yes {
        print!("Delete all {n} entries? [y/N] ");
        std::io::stdout()
            .flush()
            .map_err(|e| AppError::new(4, format!("Failed to flush stdout: {e}")))?;
        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| AppError::new(2, format!("Failed to read confirmation: {e}")))?;
        if !is_yes(&answer) {
            println!("Aborted.");
            return Ok(());
        }
    }

    ctx.store.clear()?;
    println!("Cleared {n} entries.");
    Ok(())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn handle_sample(ctx: &AppContext, args: SampleArgs) -> Result<(), AppError> {
    let series = if args.synthetic {
        let spec = SyntheticSpec {
            months: args.months,
            base: args.base,
            slope: args.slope,
            noise_sd: args.noise,
            seed: args.seed,
            ..SyntheticSpec::default_from(Local::now().date_naive())
        };
        synthetic_series(&spec)?
    } else {
        builtin_sample()
    };

    let series = ctx.store.replace(series)?;
    print!("{}", crate::report::format_series_table(&series));
    Ok(())
}

/// Resolve forecast settings from raw CLI input and configuration.
pub fn settings_from_args(ctx: &AppContext, args: &ForecastArgs) -> ForecastSettings {
    let enabled: BTreeSet<AlgorithmId> = if args.algos.is_empty() {
        AlgorithmId::ALL.into_iter().collect()
    } else {
        args.algos.iter().copied().collect()
    };
    ForecastSettings {
        horizon: ctx.horizon_or_default(args.horizon.as_deref()),
        ma_window: args
            .window
            .as_deref()
            .map(|raw| coerce_window(raw, ctx.config.ma_window))
            .unwrap_or(ctx.config.ma_window),
        enabled,
    }
}

fn handle_forecast(ctx: &AppContext, args: ForecastArgs) -> Result<(), AppError> {
    let settings = settings_from_args(ctx, &args);
    let run = pipeline::run_forecast_from_store(&ctx.store, &settings)?;

    println!("{}", crate::report::format_forecast_summary(&run.series, &run.result));
    if !run.result.per_algorithm.is_empty() {
        println!("{}", crate::report::format_forecast_table(&run.result));
    }

    if args.plot && !args.no_plot {
        let plot = crate::plot::render_forecast_plot(&run.series, Some(&run.result), args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_forecast_csv(path, &run.series, &run.result)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_forecast_json(path, &run.series, &run.result)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    print!("{}", render_saved_forecast(&args.input, args.width, args.height)?);
    Ok(())
}

/// Summary, table and plot for a forecast JSON file, same layout as `forecast`.
pub fn render_saved_forecast(path: &Path, width: usize, height: usize) -> Result<String, AppError> {
    let file = crate::io::export::read_forecast_json(path)?;
    tracing::info!(path = %path.display(), n = file.actual.len(), "loaded saved forecast");

    let mut out = crate::report::format_forecast_summary(&file.actual, &file.forecast);
    out.push('\n');
    if !file.forecast.per_algorithm.is_empty() {
        out.push_str(&crate::report::format_forecast_table(&file.forecast));
        out.push('\n');
    }
    out.push_str(&crate::plot::render_forecast_plot(&file.actual, Some(&file.forecast), width, height));
    out.push('\n');
    Ok(out)
}

fn handle_tui(ctx: &AppContext, args: TuiArgs) -> Result<(), AppError> {
    let mut settings = ctx.default_settings();
    settings.horizon = ctx.horizon_or_default(args.horizon.as_deref());
    if let Some(raw) = args.window.as_deref() {
        settings.ma_window = coerce_window(raw, ctx.config.ma_window);
    }
    crate::tui::run(ctx, settings)
}

/// Rewrite argv so `forecasty` defaults to `forecasty tui`.
///
/// Rules:
/// - `forecasty`                      -> `forecasty tui`
/// - `forecasty --horizon 12 ...`     -> `forecasty tui --horizon 12 ...`
/// - `forecasty --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `forecasty --store s.json`       -> `forecasty --store s.json tui`
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if is_subcommand(&arg1) {
        return argv;
    }

    // `--store` is global and may precede the subcommand.
    if arg1 == "--store" {
        match argv.get(3) {
            Some(next) if is_subcommand(next) => return argv,
            _ => {
                let at = 3.min(argv.len());
                argv.insert(at, "tui".to_string());
                return argv;
            }
        }
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

fn is_subcommand(token: &str) -> bool {
    matches!(
        token,
        "add" | "remove" | "list" | "import" | "clear" | "sample" | "forecast" | "plot" | "tui"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["forecasty"])), argv(&["forecasty", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["forecasty", "--horizon", "12"])),
            argv(&["forecasty", "tui", "--horizon", "12"])
        );
        assert_eq!(
            rewrite_args(argv(&["forecasty", "--store", "s.json"])),
            argv(&["forecasty", "--store", "s.json", "tui"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_untouched() {
        for args in [
            argv(&["forecasty", "list"]),
            argv(&["forecasty", "--help"]),
            argv(&["forecasty", "--store", "s.json", "forecast"]),
            argv(&["forecasty", "plot", "out.json"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn forecast_settings_coerce_raw_input() {
        let ctx = AppContext::new(AppConfig::default(), None);
        let args = match crate::cli::Cli::parse_from(argv(&[
            "forecasty", "forecast", "--horizon", "zero", "--window", "-4", "--algo", "ma",
        ]))
        .command
        {
            Command::Forecast(args) => args,
            other => panic!("unexpected command {other:?}"),
        };
        let settings = settings_from_args(&ctx, &args);
        assert_eq!(settings.horizon.get(), 6);
        assert_eq!(settings.ma_window, 3);
        assert_eq!(settings.enabled, [AlgorithmId::MovingAverageTrend].into_iter().collect());
    }

    #[test]
    fn typed_observation_validation() {
        let obs = observation_from_text("15/03/2025", "12.5").unwrap();
        assert_eq!(obs.date.to_string(), "2025-03-15");
        assert_eq!(obs.value, 12.5);

        assert_eq!(observation_from_text("not a date", "1").unwrap_err().exit_code(), 2);
        assert_eq!(observation_from_text("2025-03-15", "NaN").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn saved_forecast_renders_without_a_store() {
        use crate::domain::Horizon;
        use crate::forecast::{Registry, run_forecast};

        let d = |m| chrono::NaiveDate::from_ymd_opt(2025, m, 1).unwrap();
        let series = Series::from_observations([
            Observation::new(d(1), 100.0),
            Observation::new(d(2), 120.0),
            Observation::new(d(3), 140.0),
        ]);
        let enabled: BTreeSet<AlgorithmId> = [AlgorithmId::Linear].into_iter().collect();
        let result = run_forecast(&Registry::standard(3), &series, Horizon::new(2).unwrap(), &enabled).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        crate::io::export::write_forecast_json(&path, &series, &result).unwrap();

        let text = render_saved_forecast(&path, 40, 10).unwrap();
        assert!(text.contains("Horizon: 2 month(s)"));
        assert!(text.contains("Plot: 01/25"));
        assert!(text.contains("05/25"));

        std::fs::write(&path, "{\"tool\":\"forecasty\"}").unwrap();
        assert_eq!(render_saved_forecast(&path, 40, 10).unwrap_err().exit_code(), 2);
        let missing = dir.path().join("missing.json");
        assert_eq!(render_saved_forecast(&missing, 40, 10).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn confirmation_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }
}
