//! Forecasting strategies and their registry.
//!
//! Each strategy is a small, pure object behind the `ForecastStrategy` trait so
//! the orchestrator can iterate them generically. All of them publish
//! predictions rounded via `round_prediction`.

use chrono::NaiveDate;

use crate::domain::{AlgorithmId, AlgorithmMetadata, AlgorithmOutput, Horizon, Series, DEFAULT_MA_WINDOW};
use crate::error::ForecastError;
use crate::forecast::labels::month_coordinate;
use crate::math::{fit_indexed, fit_line, round_prediction};

/// Shared inputs every strategy sees for one request.
#[derive(Debug, Clone, Copy)]
pub struct ForecastContext<'a> {
    /// Future dates the predictions must align with, one per horizon step.
    pub labels: &'a [NaiveDate],
}

/// Common contract for all forecasting methods.
pub trait ForecastStrategy: Send + Sync {
    fn id(&self) -> AlgorithmId;

    /// Produce `horizon` predictions aligned with `ctx.labels`.
    ///
    /// A strategy may return fewer (e.g. an empty set when it cannot forecast);
    /// the orchestrator rejects any output whose length differs from `horizon`.
    fn compute(
        &self,
        series: &Series,
        horizon: Horizon,
        ctx: &ForecastContext<'_>,
    ) -> Result<AlgorithmOutput, ForecastError>;
}

/// OLS trend over real elapsed time.
///
/// x is the observation's position on the continuous month axis (see
/// `month_coordinate`), measured from the first observation. Predictions
/// evaluate the line at each label, so irregular spacing is respected and the
/// slope reads as "change per month".
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTrend;

impl ForecastStrategy for LinearTrend {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Linear
    }

    fn compute(
        &self,
        series: &Series,
        _horizon: Horizon,
        ctx: &ForecastContext<'_>,
    ) -> Result<AlgorithmOutput, ForecastError> {
        let Some(origin) = series.first().map(|o| month_coordinate(o.date)) else {
            return Ok(unavailable_linear());
        };
        if series.len() < 2 {
            return Ok(unavailable_linear());
        }

        let points: Vec<(f64, f64)> = series
            .iter()
            .map(|o| (month_coordinate(o.date) - origin, o.value))
            .collect();
        let line = fit_line(&points);

        let predictions = ctx
            .labels
            .iter()
            .map(|&date| round_prediction(line.at(month_coordinate(date) - origin)))
            .collect();

        Ok(AlgorithmOutput {
            predictions,
            metadata: AlgorithmMetadata::Linear {
                slope: line.slope,
                intercept: line.intercept,
            },
        })
    }
}

fn unavailable_linear() -> AlgorithmOutput {
    AlgorithmOutput {
        predictions: Vec::new(),
        metadata: AlgorithmMetadata::Linear {
            slope: 0.0,
            intercept: 0.0,
        },
    }
}

/// Trend-aware moving average.
///
/// Takes the trailing `window` observations, re-indexes them `0..m-1`, fits a
/// local line and extrapolates `m-1+h` for each step `h`. Data outside the
/// window has no influence. A window of one degenerates to a flat projection.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverageTrend {
    pub window: usize,
}

impl Default for MovingAverageTrend {
    fn default() -> Self {
        Self {
            window: DEFAULT_MA_WINDOW,
        }
    }
}

impl ForecastStrategy for MovingAverageTrend {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::MovingAverageTrend
    }

    fn compute(
        &self,
        series: &Series,
        horizon: Horizon,
        _ctx: &ForecastContext<'_>,
    ) -> Result<AlgorithmOutput, ForecastError> {
        let steps = horizon.get();
        if self.window == 0 || series.is_empty() {
            return Ok(AlgorithmOutput {
                predictions: vec![0.0; steps],
                metadata: AlgorithmMetadata::MovingAverageTrend {
                    window: 0,
                    slope: 0.0,
                    intercept: 0.0,
                },
            });
        }

        let values: Vec<f64> = series.tail(self.window).iter().map(|o| o.value).collect();
        let line = fit_indexed(&values);
        let last_x = (values.len() - 1) as f64;

        let predictions = (1..=steps)
            .map(|h| round_prediction(line.at(last_x + h as f64)))
            .collect();

        Ok(AlgorithmOutput {
            predictions,
            metadata: AlgorithmMetadata::MovingAverageTrend {
                window: values.len(),
                slope: line.slope,
                intercept: line.intercept,
            },
        })
    }
}

/// Repeat the last observed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

impl ForecastStrategy for Naive {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Naive
    }

    fn compute(
        &self,
        series: &Series,
        horizon: Horizon,
        _ctx: &ForecastContext<'_>,
    ) -> Result<AlgorithmOutput, ForecastError> {
        let last = series.last().ok_or(ForecastError::InsufficientData {
            required: 1,
            actual: 0,
        })?;
        Ok(AlgorithmOutput {
            predictions: vec![round_prediction(last.value); horizon.get()],
            metadata: AlgorithmMetadata::Naive {
                last_value: last.value,
            },
        })
    }
}

/// The fixed set of strategies, in `AlgorithmId` order.
pub struct Registry {
    strategies: Vec<Box<dyn ForecastStrategy>>,
}

impl Registry {
    /// Linear, moving-average-trend (with `ma_window`) and naive.
    pub fn standard(ma_window: usize) -> Self {
        Self {
            strategies: vec![
                Box::new(LinearTrend),
                Box::new(MovingAverageTrend { window: ma_window }),
                Box::new(Naive),
            ],
        }
    }

    /// Build from arbitrary strategies; later entries replace earlier ones with the same id.
    pub fn from_strategies(strategies: Vec<Box<dyn ForecastStrategy>>) -> Self {
        let mut registry = Self { strategies: Vec::new() };
        for strategy in strategies {
            registry.register(strategy);
        }
        registry
    }

    pub fn register(&mut self, strategy: Box<dyn ForecastStrategy>) {
        let id = strategy.id();
        self.strategies.retain(|s| s.id() != id);
        let pos = self
            .strategies
            .iter()
            .position(|s| s.id() > id)
            .unwrap_or(self.strategies.len());
        self.strategies.insert(pos, strategy);
    }

    pub fn get(&self, id: AlgorithmId) -> Option<&dyn ForecastStrategy> {
        self.strategies.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    pub fn ids(&self) -> Vec<AlgorithmId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard(DEFAULT_MA_WINDOW)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("strategies", &self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::forecast::labels::future_dates;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn h(n: usize) -> Horizon {
        Horizon::new(n).unwrap()
    }

    fn monthly(values: &[f64]) -> Series {
        Series::from_observations(values.iter().enumerate().map(|(i, &v)| {
            let date = d(2025, 1, 1)
                .checked_add_months(chrono::Months::new(i as u32))
                .unwrap();
            Observation::new(date, v)
        }))
    }

    fn run(strategy: &dyn ForecastStrategy, series: &Series, horizon: usize) -> AlgorithmOutput {
        let labels = match series.last() {
            Some(last) => future_dates(last.date, h(horizon)).unwrap(),
            None => Vec::new(),
        };
        strategy
            .compute(series, h(horizon), &ForecastContext { labels: &labels })
            .unwrap()
    }

    #[test]
    fn linear_reference_scenario() {
        let series = monthly(&[100.0, 120.0, 140.0, 160.0]);
        let out = run(&LinearTrend, &series, 2);
        assert_eq!(out.predictions, vec![180.0, 200.0]);
        match out.metadata {
            AlgorithmMetadata::Linear { slope, intercept } => {
                assert!((slope - 20.0).abs() < 1e-9);
                assert!((intercept - 100.0).abs() < 1e-9);
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[test]
    fn linear_respects_irregular_spacing() {
        // Value grows 10/month; the gap between March and June must not be
        // treated as a single step.
        let series = Series::from_observations([
            Observation::new(d(2025, 1, 1), 0.0),
            Observation::new(d(2025, 2, 1), 10.0),
            Observation::new(d(2025, 3, 1), 20.0),
            Observation::new(d(2025, 6, 1), 50.0),
        ]);
        let out = run(&LinearTrend, &series, 2);
        assert_eq!(out.predictions, vec![60.0, 70.0]);
    }

    #[test]
    fn linear_needs_two_points() {
        let series = monthly(&[5.0]);
        let out = run(&LinearTrend, &series, 3);
        assert!(out.predictions.is_empty());

        let empty = run(&LinearTrend, &Series::new(), 3);
        assert!(empty.predictions.is_empty());
    }

    #[test]
    fn moving_average_trend_uses_window_only() {
        // Early values are wild; the last three rise by 2 each step.
        let series = monthly(&[1000.0, -500.0, 10.0, 12.0, 14.0]);
        let out = run(&MovingAverageTrend { window: 3 }, &series, 3);
        assert_eq!(out.predictions, vec![16.0, 18.0, 20.0]);
        assert_eq!(
            out.metadata,
            AlgorithmMetadata::MovingAverageTrend {
                window: 3,
                slope: 2.0,
                intercept: 10.0
            }
        );
    }

    #[test]
    fn moving_average_window_of_one_is_flat() {
        let series = monthly(&[3.0, 9.0, 7.5]);
        let out = run(&MovingAverageTrend { window: 1 }, &series, 4);
        assert_eq!(out.predictions, vec![7.5; 4]);
    }

    #[test]
    fn moving_average_window_clamps_to_series() {
        let series = monthly(&[2.0, 4.0]);
        let out = run(&MovingAverageTrend { window: 10 }, &series, 2);
        assert_eq!(out.predictions, vec![6.0, 8.0]);
        assert!(matches!(
            out.metadata,
            AlgorithmMetadata::MovingAverageTrend { window: 2, .. }
        ));
    }

    #[test]
    fn moving_average_zero_window_or_empty_is_zeros() {
        let series = monthly(&[2.0, 4.0]);
        let out = run(&MovingAverageTrend { window: 0 }, &series, 3);
        assert_eq!(out.predictions, vec![0.0; 3]);

        let labels = vec![d(2025, 1, 1); 2];
        let out = MovingAverageTrend { window: 3 }
            .compute(&Series::new(), h(2), &ForecastContext { labels: &labels })
            .unwrap();
        assert_eq!(out.predictions, vec![0.0; 2]);
    }

    #[test]
    fn naive_repeats_last_value() {
        let series = monthly(&[100.0, 120.0, 140.0, 160.0]);
        let out = run(&Naive, &series, 3);
        assert_eq!(out.predictions, vec![160.0, 160.0, 160.0]);

        let single = monthly(&[42.123_456]);
        assert_eq!(run(&Naive, &single, 2).predictions, vec![42.1235, 42.1235]);
    }

    #[test]
    fn naive_rejects_empty_series() {
        let err = Naive
            .compute(&Series::new(), h(1), &ForecastContext { labels: &[] })
            .unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { required: 1, actual: 0 });
    }

    #[test]
    fn registry_order_and_replacement() {
        let registry = Registry::standard(4);
        assert_eq!(registry.ids(), AlgorithmId::ALL.to_vec());
        assert!(registry.get(AlgorithmId::Naive).is_some());

        let registry = Registry::from_strategies(vec![
            Box::new(Naive),
            Box::new(MovingAverageTrend { window: 2 }),
            Box::new(MovingAverageTrend { window: 5 }),
        ]);
        assert_eq!(registry.ids(), vec![AlgorithmId::MovingAverageTrend, AlgorithmId::Naive]);
        assert!(registry.get(AlgorithmId::Linear).is_none());
    }
}
