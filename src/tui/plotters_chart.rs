//! Plotters-powered forecast overlay chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! All series and bounds are computed by `chart_data` outside the render call,
//! so the data prep is testable without a terminal.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{AlgorithmId, ForecastResult, Series};
use crate::report::month_label;

/// One projected line on the category axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub id: AlgorithmId,
    pub points: Vec<(f64, f64)>,
}

/// Everything the widget draws, in category-axis coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub actual: Vec<(f64, f64)>,
    pub projections: Vec<Projection>,
    /// One `MM/YY` label per category slot: actual dates, then forecast labels.
    pub x_labels: Vec<String>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    pub fn label_at(&self, x: f64) -> String {
        if x < -0.25 {
            return String::new();
        }
        self.x_labels.get(x.round() as usize).cloned().unwrap_or_default()
    }
}

/// Lay out actuals and projections on a shared category axis.
pub fn chart_data(series: &Series, result: Option<&ForecastResult>) -> ChartData {
    let n_actual = series.len();

    let actual: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, o)| (i as f64, o.value))
        .collect();

    let projections: Vec<Projection> = result
        .map(|r| {
            r.per_algorithm
                .iter()
                .map(|(&id, out)| Projection {
                    id,
                    points: out
                        .predictions
                        .iter()
                        .enumerate()
                        .map(|(step, &y)| ((n_actual + step) as f64, y))
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut x_labels: Vec<String> = series.iter().map(|o| month_label(o.date)).collect();
    if let Some(r) = result {
        x_labels.extend(r.labels.iter().map(|d| month_label(*d)));
    }

    let x_max = (x_labels.len().max(2) - 1) as f64;

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in actual.iter().chain(projections.iter().flat_map(|p| p.points.iter())) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartData {
        actual,
        projections,
        x_labels,
        x_bounds: [0.0, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    }
}

/// Terminal palette per algorithm.
pub fn algorithm_color(id: AlgorithmId) -> RGBColor {
    match id {
        AlgorithmId::Linear => RGBColor(0, 255, 255),
        AlgorithmId::MovingAverageTrend => RGBColor(255, 0, 255),
        AlgorithmId::Naive => RGBColor(255, 255, 0),
    }
}

/// Ratatui color matching `algorithm_color`, for legends drawn outside Plotters.
pub fn algorithm_tui_color(id: AlgorithmId) -> Color {
    let RGBColor(r, g, b) = algorithm_color(id);
    Color::Rgb(r, g, b)
}

pub struct ForecastChart<'a> {
    pub data: &'a ChartData,
    pub y_label: &'a str,
}

impl<'a> Widget for ForecastChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let data = self.data;
        let [x0, x1] = data.x_bounds;
        let [y0, y1] = data.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let y_label = self.y_label;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| data.label_at(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Actuals: line plus a pixel per observation.
            chart.draw_series(LineSeries::new(data.actual.iter().copied(), &WHITE))?;
            chart.draw_series(data.actual.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            // `Circle` markers render at the wrong scale through the ratatui
            // backend, so projections use line + pixel as well.
            for projection in &data.projections {
                let color = algorithm_color(projection.id);
                chart.draw_series(LineSeries::new(projection.points.iter().copied(), &color))?;
                chart.draw_series(projection.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
