//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - persisted by the series store (`Observation`, `Series`)
//! - passed through the forecasting core as read-only snapshots
//! - exported to JSON/CSV (`ForecastResult`)

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Horizon used when the user supplies nothing usable.
pub const DEFAULT_HORIZON: usize = 6;

/// Moving-average-trend window used when the user supplies nothing usable.
pub const DEFAULT_MA_WINDOW: usize = 3;

/// A single recorded `(date, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Observations sorted ascending by date, at most one per date.
///
/// Every constructor and mutator keeps both invariants: duplicates resolve
/// last-write-wins and the order is always chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from observations in any order.
    ///
    /// Later entries win over earlier ones with the same date.
    pub fn from_observations(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut series = Self::new();
        for obs in observations {
            series.insert(obs);
        }
        series
    }

    /// Insert an observation, replacing any existing one with the same date.
    pub fn insert(&mut self, obs: Observation) {
        match self.observations.binary_search_by(|o| o.date.cmp(&obs.date)) {
            Ok(idx) => self.observations[idx] = obs,
            Err(idx) => self.observations.insert(idx, obs),
        }
    }

    /// Merge another batch in, last write wins.
    pub fn merge(&mut self, other: impl IntoIterator<Item = Observation>) {
        for obs in other {
            self.insert(obs);
        }
    }

    /// Remove the observation at `index` (chronological position).
    pub fn remove(&mut self, index: usize) -> Option<Observation> {
        if index < self.observations.len() {
            Some(self.observations.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// The trailing `n` observations (all of them if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }
}

impl From<Vec<Observation>> for Series {
    fn from(value: Vec<Observation>) -> Self {
        Series::from_observations(value)
    }
}

impl From<Series> for Vec<Observation> {
    fn from(value: Series) -> Self {
        value.observations
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// A fitted straight line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedLine {
    pub slope: f64,
    pub intercept: f64,
}

impl FittedLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Identifier of a forecasting strategy.
///
/// Declaration order is the order the orchestrator runs them in and the order
/// they appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
pub enum AlgorithmId {
    #[serde(rename = "linear")]
    #[value(name = "linear")]
    Linear,
    #[serde(rename = "ma")]
    #[value(name = "ma")]
    MovingAverageTrend,
    #[serde(rename = "naive")]
    #[value(name = "naive")]
    Naive,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 3] = [
        AlgorithmId::Linear,
        AlgorithmId::MovingAverageTrend,
        AlgorithmId::Naive,
    ];

    /// Stable machine identifier (matches the serde/clap name).
    pub fn key(self) -> &'static str {
        match self {
            AlgorithmId::Linear => "linear",
            AlgorithmId::MovingAverageTrend => "ma",
            AlgorithmId::Naive => "naive",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            AlgorithmId::Linear => "Linear",
            AlgorithmId::MovingAverageTrend => "MA trend",
            AlgorithmId::Naive => "Naive",
        }
    }

    /// Single-character marker used by the ASCII chart.
    pub fn marker(self) -> char {
        match self {
            AlgorithmId::Linear => 'L',
            AlgorithmId::MovingAverageTrend => 'M',
            AlgorithmId::Naive => 'N',
        }
    }
}

/// Number of future monthly steps to project. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Horizon(usize);

impl Horizon {
    pub fn new(steps: usize) -> Option<Self> {
        (steps >= 1).then_some(Self(steps))
    }

    /// Coerce raw user text into a horizon.
    ///
    /// Non-numeric, zero or negative input yields `default` instead of an error.
    pub fn parse_or_default(raw: &str, default: Horizon) -> Horizon {
        match raw.trim().parse::<i64>() {
            Ok(n) => Self::from_i64_or_default(n, default),
            Err(_) => default,
        }
    }

    pub fn from_i64_or_default(n: i64, default: Horizon) -> Horizon {
        usize::try_from(n).ok().and_then(Horizon::new).unwrap_or(default)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(DEFAULT_HORIZON)
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strategy-specific details attached to a set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlgorithmMetadata {
    /// Fit over elapsed calendar months; slope is per month.
    Linear { slope: f64, intercept: f64 },
    /// Local fit over the re-indexed trailing window; slope is per step.
    MovingAverageTrend {
        window: usize,
        slope: f64,
        intercept: f64,
    },
    Naive { last_value: f64 },
}

/// What a strategy returns for one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmOutput {
    pub predictions: Vec<f64>,
    pub metadata: AlgorithmMetadata,
}

/// An algorithm the orchestrator excluded from the result, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedAlgorithm {
    pub id: AlgorithmId,
    pub reason: String,
}

/// Unified output of one forecast request.
///
/// For every entry of `per_algorithm`, `predictions.len() == labels.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub horizon: Horizon,
    pub labels: Vec<NaiveDate>,
    pub per_algorithm: BTreeMap<AlgorithmId, AlgorithmOutput>,
    pub skipped: Vec<SkippedAlgorithm>,
}

/// Plain inputs supplied by the UI controls for a forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub horizon: Horizon,
    pub ma_window: usize,
    pub enabled: BTreeSet<AlgorithmId>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: Horizon::default(),
            ma_window: DEFAULT_MA_WINDOW,
            enabled: AlgorithmId::ALL.into_iter().collect(),
        }
    }
}

impl ForecastSettings {
    /// Flip one algorithm on or off. Returns whether it is now enabled.
    pub fn toggle(&mut self, id: AlgorithmId) -> bool {
        if self.enabled.remove(&id) {
            false
        } else {
            self.enabled.insert(id);
            true
        }
    }
}
