//! Runtime configuration from the environment (and an optional `.env`).
//!
//! Recognized variables:
//! - `FORECASTY_STORE`: path of the JSON store (default `forecasty.json`)
//! - `FORECASTY_HORIZON`: default horizon in months (default 6)
//! - `FORECASTY_MA_WINDOW`: moving-average-trend window (default 3)
//! - `FORECASTY_LOG`: log file used in TUI mode (logs are discarded otherwise)
//!
//! Unusable numeric values fall back to their defaults rather than failing,
//! matching how the same inputs are treated when typed in the UI.

use std::path::PathBuf;

use crate::domain::{DEFAULT_MA_WINDOW, Horizon};

pub const ENV_STORE: &str = "FORECASTY_STORE";
pub const ENV_HORIZON: &str = "FORECASTY_HORIZON";
pub const ENV_MA_WINDOW: &str = "FORECASTY_MA_WINDOW";
pub const ENV_LOG: &str = "FORECASTY_LOG";

pub const DEFAULT_STORE_PATH: &str = "forecasty.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub default_horizon: Horizon,
    pub ma_window: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            default_horizon: Horizon::default(),
            ma_window: DEFAULT_MA_WINDOW,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            store_path: non_empty(ENV_STORE).map(PathBuf::from).unwrap_or(defaults.store_path),
            default_horizon: non_empty(ENV_HORIZON)
                .map(|raw| Horizon::parse_or_default(&raw, defaults.default_horizon))
                .unwrap_or(defaults.default_horizon),
            ma_window: non_empty(ENV_MA_WINDOW)
                .map(|raw| coerce_window(&raw, defaults.ma_window))
                .unwrap_or(defaults.ma_window),
            log_file: non_empty(ENV_LOG).map(PathBuf::from),
        }
    }
}

/// Coerce raw window text: non-numeric, zero or negative yields `default`.
pub fn coerce_window(raw: &str, default: usize) -> usize {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n).unwrap_or(default),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_STORE, "/tmp/series.json"),
            (ENV_HORIZON, "12"),
            (ENV_MA_WINDOW, "5"),
            (ENV_LOG, "tui.log"),
        ]));
        assert_eq!(config.store_path, PathBuf::from("/tmp/series.json"));
        assert_eq!(config.default_horizon.get(), 12);
        assert_eq!(config.ma_window, 5);
        assert_eq!(config.log_file, Some(PathBuf::from("tui.log")));
    }

    #[test]
    fn unusable_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_STORE, "  "),
            (ENV_HORIZON, "-2"),
            (ENV_MA_WINDOW, "wide"),
        ]));
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.default_horizon, Horizon::default());
        assert_eq!(config.ma_window, DEFAULT_MA_WINDOW);
    }

    #[test]
    fn window_coercion() {
        assert_eq!(coerce_window("4", 3), 4);
        assert_eq!(coerce_window("0", 3), 3);
        assert_eq!(coerce_window("-1", 3), 3);
        assert_eq!(coerce_window("x", 3), 3);
    }
}
