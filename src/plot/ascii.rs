//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x-axis is categorical like the overlay chart in the TUI: recorded dates
//! first, then the forecast labels, one column slot each.
//!
//! Plot elements:
//! - actuals: `o` joined by `.`
//! - projections: the algorithm marker (`L`, `M`, `N`)

use crate::domain::{ForecastResult, Series};
use crate::report::month_label;

/// Render actuals plus (optionally) every included projection.
pub fn render_forecast_plot(
    series: &Series,
    result: Option<&ForecastResult>,
    width: usize,
    height: usize,
) -> String {
    if series.is_empty() {
        return "No data yet\n".to_string();
    }

    let width = width.max(10);
    let height = height.max(5);

    let n_actual = series.len();
    let n_future = result.map(|r| r.labels.len()).unwrap_or(0);
    let slots = n_actual + n_future;

    let actual: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, o)| (i as f64, o.value))
        .collect();

    let projections: Vec<(char, Vec<(f64, f64)>)> = result
        .map(|r| {
            r.per_algorithm
                .iter()
                .map(|(id, out)| {
                    let pts = out
                        .predictions
                        .iter()
                        .enumerate()
                        .map(|(step, &y)| ((n_actual + step) as f64, y))
                        .collect();
                    (id.marker(), pts)
                })
                .collect()
        })
        .unwrap_or_default();

    let all_y = actual
        .iter()
        .chain(projections.iter().flat_map(|(_, pts)| pts.iter()))
        .map(|&(_, y)| y);
    let (y_min, y_max) = y_range(all_y).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_max = (slots.max(2) - 1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so the point markers overlay them.
    draw_polyline(&mut grid, &actual, '.', x_max, y_min, y_max);
    for (marker, pts) in &projections {
        draw_polyline(&mut grid, pts, marker.to_ascii_lowercase(), x_max, y_min, y_max);
    }
    for &(x, y) in &actual {
        let (cx, cy) = cell(x, y, x_max, y_min, y_max, width, height);
        grid[cy][cx] = 'o';
    }
    for (marker, pts) in &projections {
        for &(x, y) in pts {
            let (cx, cy) = cell(x, y, x_max, y_min, y_max, width, height);
            grid[cy][cx] = *marker;
        }
    }

    let first = series.first().map(|o| month_label(o.date)).unwrap_or_default();
    let last = result
        .and_then(|r| r.labels.last().copied())
        .or_else(|| series.last().map(|o| o.date))
        .map(month_label)
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("Plot: {first} → {last} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let mut legend = String::from("o actual");
    if let Some(r) = result {
        for id in r.per_algorithm.keys() {
            legend.push_str(&format!("  {} {}", id.marker(), id.display_name()));
        }
    }
    out.push_str(&legend);
    out.push('\n');

    out
}

fn y_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for y in values.filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat data: open a unit band around the level.
        Some((min_y - 0.5, max_y + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn cell(x: f64, y: f64, x_max: f64, y_min: f64, y_max: f64, width: usize, height: usize) -> (usize, usize) {
    (map_x(x, x_max, width), map_y(y, y_min, y_max, height))
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], pts: &[(f64, f64)], ch: char, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in pts {
        let (cx, cy) = cell(x, y, x_max, y_min, y_max, width, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, cx, cy, ch);
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish). Never overwrites non-blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use crate::domain::{AlgorithmId, Horizon, Observation};
    use crate::forecast::{Registry, run_forecast};

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, 1).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = Series::from_observations([Observation::new(d(1), 0.0), Observation::new(d(2), 10.0)]);
        let enabled: BTreeSet<AlgorithmId> = [AlgorithmId::Naive].into_iter().collect();
        let result = run_forecast(&Registry::standard(3), &series, Horizon::new(1).unwrap(), &enabled).unwrap();

        let txt = render_forecast_plot(&series, Some(&result), 10, 5);
        let expected = concat!(
            "Plot: 01/25 → 03/25 | y=[-0.50, 10.50]\n",
            "     o   N\n",
            "    .     \n",
            "  ..      \n",
            " .        \n",
            "o         \n",
            "o actual  N Naive\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn actuals_only_and_empty() {
        let series = Series::from_observations([Observation::new(d(1), 5.0), Observation::new(d(2), 5.0)]);
        let txt = render_forecast_plot(&series, None, 20, 6);
        assert!(txt.starts_with("Plot: 01/25 → 02/25"));
        assert!(txt.ends_with("o actual\n"));
        assert_eq!(txt.lines().count(), 1 + 6 + 1);

        assert_eq!(render_forecast_plot(&Series::new(), None, 20, 6), "No data yet\n");
    }

    #[test]
    fn every_projection_is_drawn() {
        let series = Series::from_observations((1..=4).map(|m| Observation::new(d(m), m as f64 * 10.0)));
        let enabled: BTreeSet<AlgorithmId> = AlgorithmId::ALL.into_iter().collect();
        let result = run_forecast(&Registry::standard(2), &series, Horizon::new(3).unwrap(), &enabled).unwrap();
        let txt = render_forecast_plot(&series, Some(&result), 40, 12);
        for marker in ['o', 'L', 'M', 'N'] {
            assert!(txt.contains(marker), "missing marker {marker}");
        }
        assert!(txt.ends_with("o actual  L Linear  M MA trend  N Naive\n"));
    }
}
