//! Resolved runtime context shared by the command handlers and the TUI.

use std::path::PathBuf;

use crate::config::AppConfig;
use crate::domain::{ForecastSettings, Horizon};
use crate::store::JsonFileStore;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: JsonFileStore,
}

impl AppContext {
    /// Build from configuration, letting an explicit `--store` path win.
    pub fn new(mut config: AppConfig, store_override: Option<PathBuf>) -> Self {
        if let Some(path) = store_override {
            config.store_path = path;
        }
        let store = JsonFileStore::new(config.store_path.clone());
        Self { config, store }
    }

    /// Initial forecast settings: configured horizon and window, every algorithm on.
    pub fn default_settings(&self) -> ForecastSettings {
        ForecastSettings {
            horizon: self.config.default_horizon,
            ma_window: self.config.ma_window,
            ..ForecastSettings::default()
        }
    }

    /// Coerce a raw horizon string against the configured default.
    pub fn horizon_or_default(&self, raw: Option<&str>) -> Horizon {
        raw.map(|r| Horizon::parse_or_default(r, self.config.default_horizon))
            .unwrap_or(self.config.default_horizon)
    }
}
