//! Ratatui-based terminal UI.
//!
//! The TUI shows the recorded series, an overlay chart of actuals and
//! projections, and the forecast controls. Every edit goes through the store
//! and the forecast is recomputed from a freshly loaded snapshot.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::AppContext;
use crate::app::pipeline::{RunOutput, forecast_snapshot};
use crate::data::{builtin_sample, random_entry};
use crate::domain::{AlgorithmId, ForecastSettings, Horizon, Series};
use crate::error::AppError;
use crate::store::{JsonFileStore, SeriesStore};

mod plotters_chart;

use plotters_chart::{ForecastChart, algorithm_tui_color, chart_data};

/// Start the TUI.
pub fn run(ctx: &AppContext, settings: ForecastSettings) -> Result<(), AppError> {
    let mut app = App::new(ctx.clone(), settings);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    EnterDate,
    EnterValue,
    ConfirmClear,
}

struct App {
    ctx: AppContext,
    settings: ForecastSettings,
    series: Series,
    run: Option<RunOutput>,
    /// Why there is no forecast to show (too little data, store problem).
    notice: Option<String>,
    selected: usize,
    mode: Mode,
    date_input: String,
    value_input: String,
    status: String,
}

impl App {
    fn new(ctx: AppContext, settings: ForecastSettings) -> Self {
        let mut app = Self {
            ctx,
            settings,
            series: Series::new(),
            run: None,
            notice: None,
            selected: 0,
            mode: Mode::Normal,
            date_input: String::new(),
            value_input: String::new(),
            status: "Ready.".to_string(),
        };
        app.refresh();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.mode {
            Mode::EnterDate | Mode::EnterValue => {
                self.handle_entry_key(code);
                return false;
            }
            Mode::ConfirmClear => {
                self.handle_confirm_key(code);
                return false;
            }
            Mode::Normal => {}
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.series.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.settings.horizon = Horizon::new(self.settings.horizon.get() + 1).unwrap_or(self.settings.horizon);
                self.status = format!("horizon: {} month(s)", self.settings.horizon);
                self.refresh();
            }
            KeyCode::Char('-') => {
                self.settings.horizon = Horizon::new(self.settings.horizon.get() - 1).unwrap_or(self.settings.horizon);
                self.status = format!("horizon: {} month(s)", self.settings.horizon);
                self.refresh();
            }
            KeyCode::Char(']') => {
                self.settings.ma_window += 1;
                self.status = format!("window: {}", self.settings.ma_window);
                self.refresh();
            }
            KeyCode::Char('[') => {
                self.settings.ma_window = self.settings.ma_window.saturating_sub(1).max(1);
                self.status = format!("window: {}", self.settings.ma_window);
                self.refresh();
            }
            KeyCode::Char('l') => self.toggle(AlgorithmId::Linear),
            KeyCode::Char('m') => self.toggle(AlgorithmId::MovingAverageTrend),
            KeyCode::Char('n') => self.toggle(AlgorithmId::Naive),
            KeyCode::Char('a') => {
                self.mode = Mode::EnterDate;
                self.date_input.clear();
                self.value_input.clear();
                self.status = "New entry: type the date, Tab/Enter for value, Esc to cancel.".to_string();
            }
            KeyCode::Char('r') => {
                let obs = random_entry(Local::now().date_naive(), &mut rand::thread_rng());
                self.mutate(|store| {
                    store.insert(obs)?;
                    Ok(format!("Added random entry {} = {:.2}", obs.date, obs.value))
                });
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.series.is_empty() {
                    self.status = "Nothing to delete.".to_string();
                } else {
                    let index = self.selected;
                    self.mutate(|store| {
                        let (removed, _) = store.remove(index)?;
                        Ok(format!("Deleted {} = {:.4}", removed.date, removed.value))
                    });
                }
            }
            KeyCode::Char('s') => {
                self.mutate(|store| {
                    let series = store.replace(builtin_sample())?;
                    Ok(format!("Loaded sample data ({} entries).", series.len()))
                });
            }
            KeyCode::Char('c') => {
                if self.series.is_empty() {
                    self.status = "Nothing to clear.".to_string();
                } else {
                    self.mode = Mode::ConfirmClear;
                    self.status = format!("Delete all {} entries? y to confirm, any other key cancels.", self.series.len());
                }
            }
            KeyCode::Char('f') | KeyCode::Enter => {
                self.refresh();
                if self.run.is_some() {
                    self.status = "Forecast updated.".to_string();
                }
            }
            _ => {}
        }

        false
    }

    fn handle_entry_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Entry canceled.".to_string();
            }
            KeyCode::Tab | KeyCode::Enter if self.mode == Mode::EnterDate => {
                self.mode = Mode::EnterValue;
            }
            KeyCode::BackTab if self.mode == Mode::EnterValue => {
                self.mode = Mode::EnterDate;
            }
            KeyCode::Enter => self.submit_entry(),
            KeyCode::Backspace => {
                self.active_input().pop();
            }
            KeyCode::Char(c) if !c.is_control() => self.active_input().push(c),
            _ => {}
        }
    }

    fn active_input(&mut self) -> &mut String {
        if self.mode == Mode::EnterDate {
            &mut self.date_input
        } else {
            &mut self.value_input
        }
    }

    /// ` (DD/MM/YY)` once the typed date parses, empty while it is incomplete.
    fn date_preview(&self) -> String {
        let raw = self.date_input.trim();
        let shown = crate::report::format_dd_mm_yy(raw);
        if shown == raw { String::new() } else { format!(" ({shown})") }
    }

    fn submit_entry(&mut self) {
        match crate::app::observation_from_text(&self.date_input, &self.value_input) {
            Ok(obs) => {
                self.mode = Mode::Normal;
                self.mutate(|store| {
                    store.insert(obs)?;
                    Ok(format!("Added {} = {:.4}", obs.date, obs.value))
                });
            }
            Err(err) => {
                // Stay in entry mode so the input can be corrected.
                self.status = err.to_string();
            }
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        self.mode = Mode::Normal;
        if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            self.mutate(|store| {
                store.clear()?;
                Ok("Cleared all data.".to_string())
            });
        } else {
            self.status = "Clear canceled.".to_string();
        }
    }

    fn toggle(&mut self, id: AlgorithmId) {
        let on = self.settings.toggle(id);
        self.status = format!("{}: {}", id.display_name(), if on { "on" } else { "off" });
        self.refresh();
    }

    /// Apply a store edit, report the outcome, then re-forecast.
    fn mutate(&mut self, op: impl FnOnce(&JsonFileStore) -> Result<String, AppError>) {
        self.status = match op(&self.ctx.store) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(error = %err, "store update failed");
                err.to_string()
            }
        };
        self.refresh();
    }

    /// Reload the snapshot and recompute the forecast.
    fn refresh(&mut self) {
        match self.ctx.store.load_series() {
            Ok(series) => self.series = series,
            Err(err) => {
                tracing::warn!(error = %err, "store load failed");
                self.series = Series::new();
                self.run = None;
                self.notice = Some(err.to_string());
                return;
            }
        }
        self.selected = self.selected.min(self.series.len().saturating_sub(1));

        match forecast_snapshot(self.series.clone(), &self.settings) {
            Ok(run) => {
                self.run = Some(run);
                self.notice = None;
            }
            Err(err) => {
                self.run = None;
                self.notice = Some(err.to_string());
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("forecasty", Style::default().fg(Color::Cyan)),
            Span::raw(format!("  store: {}", self.ctx.store.path().display())),
        ]));

        let mut controls = vec![Span::styled(
            format!(
                "horizon: {} | window: {} | n={} | ",
                self.settings.horizon,
                self.settings.ma_window,
                self.series.len()
            ),
            Style::default().fg(Color::Gray),
        )];
        for id in AlgorithmId::ALL {
            let on = self.settings.enabled.contains(&id);
            let style = if on {
                Style::default().fg(algorithm_tui_color(id))
            } else {
                Style::default().fg(Color::DarkGray)
            };
            controls.push(Span::styled(
                format!("[{}] {}  ", if on { 'x' } else { ' ' }, id.display_name()),
                style,
            ));
        }
        lines.push(Line::from(controls));

        match (&self.run, &self.notice) {
            (Some(run), _) => {
                let skipped = run
                    .result
                    .skipped
                    .iter()
                    .map(|s| format!("{} skipped: {}", s.id.display_name(), s.reason))
                    .collect::<Vec<_>>()
                    .join(" | ");
                let text = if skipped.is_empty() {
                    format!("projecting {} month(s)", run.result.labels.len())
                } else {
                    skipped
                };
                lines.push(Line::from(Span::styled(text, Style::default().fg(Color::Gray))));
            }
            (None, Some(notice)) => {
                lines.push(Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow))));
            }
            (None, None) => {}
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        self.draw_table(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = if self.series.is_empty() {
            vec![ListItem::new("No data yet")]
        } else {
            self.series
                .iter()
                .enumerate()
                .map(|(idx, obs)| {
                    ListItem::new(format!(
                        "{:>3} {} {:>12.2}",
                        idx + 1,
                        crate::report::day_label(obs.date),
                        obs.value
                    ))
                })
                .collect()
        };

        let list = List::new(items)
            .block(Block::default().title("Data").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !self.series.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.chart_title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.series.is_empty() {
            let msg = Paragraph::new("No data yet: press a to add, s for sample data.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let data = chart_data(&self.series, self.run.as_ref().map(|r| &r.result));
        frame.render_widget(
            ForecastChart {
                data: &data,
                y_label: "value",
            },
            inner,
        );
    }

    fn chart_title(&self) -> Line<'static> {
        let mut spans = vec![Span::raw("Forecast  "), Span::styled("actual ", Style::default().fg(Color::White))];
        if let Some(run) = &self.run {
            for id in run.result.per_algorithm.keys() {
                spans.push(Span::styled(
                    format!("{} ", id.display_name()),
                    Style::default().fg(algorithm_tui_color(*id)),
                ));
            }
        }
        Line::from(spans)
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = match self.mode {
            Mode::EnterDate | Mode::EnterValue => {
                let (date_style, value_style) = if self.mode == Mode::EnterDate {
                    (Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED), Style::default())
                } else {
                    (Style::default(), Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
                };
                Line::from(vec![
                    Span::raw("date: "),
                    Span::styled(format!("{:<10}", self.date_input), date_style),
                    Span::styled(self.date_preview(), Style::default().fg(Color::Green)),
                    Span::raw("  value: "),
                    Span::styled(format!("{:<10}", self.value_input), value_style),
                    Span::raw(" | "),
                    Span::styled(&self.status, Style::default().fg(Color::Yellow)),
                ])
            }
            Mode::Normal | Mode::ConfirmClear => {
                let help = "+/- horizon  [/] window  l/m/n toggle  a add  r random  d delete  s sample  c clear  f forecast  q quit";
                Line::from(vec![
                    Span::styled(help, Style::default().fg(Color::Gray)),
                    Span::raw(" | "),
                    Span::styled(&self.status, Style::default().fg(Color::Yellow)),
                ])
            }
        };
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;

    fn app_in(dir: &tempfile::TempDir) -> App {
        let ctx = AppContext::new(AppConfig::default(), Some(dir.path().join("store.json")));
        let settings = ctx.default_settings();
        App::new(ctx, settings)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn empty_store_has_no_forecast() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);
        assert!(app.series.is_empty());
        assert!(app.run.is_none());
        assert!(app.notice.as_deref().unwrap_or("").contains("Insufficient data"));
    }

    #[test]
    fn sample_then_controls_reforecast() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.series.len(), 12);
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.result.labels.len(), 6);
        assert_eq!(run.result.per_algorithm.len(), 3);

        app.handle_key(KeyCode::Char('+'));
        assert_eq!(app.run.as_ref().unwrap().result.labels.len(), 7);
        for _ in 0..10 {
            app.handle_key(KeyCode::Char('-'));
        }
        assert_eq!(app.settings.horizon.get(), 1);

        app.handle_key(KeyCode::Char('l'));
        app.handle_key(KeyCode::Char('n'));
        let included: Vec<_> = app.run.as_ref().unwrap().result.per_algorithm.keys().copied().collect();
        assert_eq!(included, vec![AlgorithmId::MovingAverageTrend]);

        app.handle_key(KeyCode::Char('['));
        app.handle_key(KeyCode::Char('['));
        app.handle_key(KeyCode::Char('['));
        assert_eq!(app.settings.ma_window, 1);
    }

    #[test]
    fn add_entry_through_input_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.handle_key(KeyCode::Char('a'));
        type_text(&mut app, "2025-02");
        assert_eq!(app.date_preview(), "");
        type_text(&mut app, "-01");
        assert_eq!(app.date_preview(), " (01/02/25)");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "oops");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::EnterValue);
        assert!(app.series.is_empty());

        for _ in 0..4 {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "-12.5");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.series.values(), vec![-12.5]);

        // Keys typed while editing must not trigger commands.
        app.handle_key(KeyCode::Char('a'));
        type_text(&mut app, "qsc");
        app.handle_key(KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.series.len(), 1);
    }

    #[test]
    fn delete_and_confirmed_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.handle_key(KeyCode::Char('s'));

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.series.len(), 11);
        assert_eq!(app.series.values()[..2], [0.0, 150.0]);

        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.series.len(), 11);

        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Char('y'));
        assert!(app.series.is_empty());
        assert!(app.run.is_none());
        assert!(!app.handle_key(KeyCode::Char('d')));
    }

    #[test]
    fn random_fill_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.series.len(), 1);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
