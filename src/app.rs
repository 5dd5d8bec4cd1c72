use std::io;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::days::{group_by_day, DayBucket};
use crate::error::ForecastError;
use crate::forecast::{Forecast, ForecastPoint};
use crate::format::{self, MISSING};
use crate::meteo::ForecastSource;
use crate::window::Window;

const CELL_WIDTH: u16 = 16;
const DETAIL_HEIGHT: u16 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Updated,
    Failed(String),
}

impl Status {
    fn text(&self) -> &'static str {
        match self {
            Status::Loading => "Loading...",
            Status::Updated => "Data updated.",
            Status::Failed(_) => "Failed to load forecast.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Refresh,
    Quit,
}

/// Everything the dashboard shows. Replaced only through [`Dashboard::apply`].
#[derive(Debug)]
pub struct Dashboard {
    location: String,
    days_shown: usize,
    hours_per_day: usize,
    window: Window,
    forecast: Forecast,
    days: Vec<DayBucket>,
    next_hours: Vec<ForecastPoint>,
    status: Status,
    updated_at: Option<NaiveDateTime>,
    selected: (usize, usize),
    show_detail: bool,
}

impl Dashboard {
    pub fn new(config: &Config) -> Self {
        Self {
            location: format!(
                "{:.3}, {:.3} ({})",
                config.location.latitude, config.location.longitude, config.location.timezone
            ),
            days_shown: config.display.days,
            hours_per_day: config.display.hours_per_day,
            window: Window::FromNow(config.display.window_hours),
            forecast: Forecast::default(),
            days: Vec::new(),
            next_hours: Vec::new(),
            status: Status::Loading,
            updated_at: None,
            selected: (0, 0),
            show_detail: false,
        }
    }

    /// Takes the outcome of one fetch. A forecast replaces the whole dataset;
    /// a failure leaves the last good one on screen.
    pub fn apply(&mut self, result: Result<Forecast, ForecastError>) {
        let now = match &result {
            Ok(forecast) => forecast.now(),
            Err(_) => self.forecast.now(),
        };
        self.apply_at(result, now);
    }

    fn apply_at(&mut self, result: Result<Forecast, ForecastError>, now: NaiveDateTime) {
        match result {
            Ok(forecast) => {
                self.days = group_by_day(&forecast.points, self.days_shown, self.hours_per_day);
                self.next_hours = self.window.select(&forecast.points, now).to_vec();
                debug!(
                    days = self.days.len(),
                    window = self.next_hours.len(),
                    "Dataset replaced"
                );
                self.forecast = forecast;
                self.status = Status::Updated;
                self.updated_at = Some(now);
                self.clamp_selection();
            }
            Err(e) => {
                error!(error = %e, "Forecast update failed");
                self.status = Status::Failed(e.to_string());
            }
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn days(&self) -> &[DayBucket] {
        &self.days
    }

    pub fn next_hours(&self) -> &[ForecastPoint] {
        &self.next_hours
    }

    pub fn selected_point(&self) -> Option<&ForecastPoint> {
        let (day, hour) = self.selected;
        self.days.get(day)?.hours.get(hour)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('r') => return Action::Refresh,
            KeyCode::Left => self.selected.1 = self.selected.1.saturating_sub(1),
            KeyCode::Right => self.selected.1 += 1,
            KeyCode::Up => self.selected.0 = self.selected.0.saturating_sub(1),
            KeyCode::Down => self.selected.0 += 1,
            KeyCode::Enter => self.show_detail = !self.show_detail,
            KeyCode::Esc => self.show_detail = false,
            _ => {}
        }
        self.clamp_selection();
        Action::None
    }

    fn clamp_selection(&mut self) {
        let Some(last_day) = self.days.len().checked_sub(1) else {
            self.selected = (0, 0);
            return;
        };
        let day = self.selected.0.min(last_day);
        let last_hour = self.days[day].hours.len().saturating_sub(1);
        self.selected = (day, self.selected.1.min(last_hour));
    }
}

pub fn run_app<B: Backend, S: ForecastSource>(
    terminal: &mut Terminal<B>,
    source: &S,
    dashboard: &mut Dashboard,
    refresh_every: Option<Duration>,
) -> io::Result<()> {
    terminal.draw(|f| ui(f, dashboard))?;
    dashboard.apply(source.fetch());
    let mut last_fetch = Instant::now();

    loop {
        terminal.draw(|f| ui(f, dashboard))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match dashboard.handle_key(key.code) {
                        Action::Quit => return Ok(()),
                        Action::Refresh => {
                            info!("Manual refresh");
                            dashboard.apply(source.fetch());
                            last_fetch = Instant::now();
                        }
                        Action::None => {}
                    }
                }
            }
        }

        if let Some(every) = refresh_every {
            if last_fetch.elapsed() >= every {
                info!("Scheduled refresh");
                dashboard.apply(source.fetch());
                last_fetch = Instant::now();
            }
        }
    }
}

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_headline(dashboard: &Dashboard) -> Paragraph<'_> {
    let status_style = match dashboard.status {
        Status::Failed(_) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Green),
    };
    let updated = dashboard
        .updated_at
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| MISSING.to_string());

    Paragraph::new(vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled("Meteo", Style::default().fg(Color::Blue)),
            Span::raw(" : "),
            Span::styled(dashboard.location.clone(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(dashboard.status.text(), status_style),
            Span::styled(
                match &dashboard.status {
                    Status::Failed(reason) => format!(" {reason}"),
                    _ => String::new(),
                },
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(format!("  (updated {updated})  q quit · r refresh · arrows select · enter details")),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn hour_cell(point: &ForecastPoint, selected: bool) -> Span<'static> {
    let text = format!(
        "{} {} {:>5}°",
        point.hour_label(),
        point.condition().icon(),
        format::number(point.temperature, 1)
    );
    let style = if selected {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };
    Span::styled(format!("{text:<width$}", width = CELL_WIDTH as usize - 1), style)
}

/// Day cards laid out as a grid of hour cells. Returns the lines together with
/// the line index at which the selected day starts, for scrolling.
fn day_lines(dashboard: &Dashboard, width: u16) -> (Vec<Line<'static>>, usize) {
    let per_row = usize::from((width / CELL_WIDTH).max(1));
    let mut lines = Vec::new();
    let mut selected_start = 0;

    for (day_idx, day) in dashboard.days.iter().enumerate() {
        if day_idx == dashboard.selected.0 {
            selected_start = lines.len();
        }
        lines.push(Line::from(Span::styled(
            format!(" {}", format::day_label(day.date)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for (row_idx, row) in day.hours.chunks(per_row).enumerate() {
            let mut spans = vec![Span::raw(" ")];
            for (col, point) in row.iter().enumerate() {
                let hour_idx = row_idx * per_row + col;
                spans.push(hour_cell(point, dashboard.selected == (day_idx, hour_idx)));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(format!(" {MISSING}")));
    }
    (lines, selected_start)
}

fn display_days(dashboard: &Dashboard, area: Rect) -> Paragraph<'static> {
    let inner_width = area.width.saturating_sub(3);
    let (lines, selected_start) = day_lines(dashboard, inner_width);
    let visible = usize::from(area.height.saturating_sub(2));
    let max_scroll = lines.len().saturating_sub(visible);
    let scroll = u16::try_from(selected_start.min(max_scroll)).unwrap_or(u16::MAX);

    let title = format!("Today + {} days", dashboard.days_shown.saturating_sub(1));
    Paragraph::new(lines)
        .block(titled_block(&title))
        .scroll((scroll, 0))
}

fn display_detail(point: &ForecastPoint) -> Table<'static> {
    let title = format!("{} • {}", format::day_label(point.date()), point.hour_label());
    let condition = point.condition();

    let row = |name: &str, value: String| {
        Row::new(vec![
            Cell::from(format!(" {name}")),
            Cell::from(value).style(Style::default().fg(Color::Green)),
        ])
    };
    let rows = vec![
        Row::new(vec![Cell::from("")]),
        row("Weather", condition.to_string()),
        row("Temperature", format!("{} °C", format::number(point.temperature, 1))),
        row("Rain", format!("{} mm", format::number(point.rain, 2))),
        row("Wind", format!("{} km/h", format::number(point.wind_speed, 0))),
        row("Weather code", format::code(point.weather_code)),
    ];

    Table::new(rows, [Constraint::Length(14), Constraint::Min(10)])
        .block(titled_block(&title).title_bottom(" esc close "))
}

fn series(points: &[ForecastPoint], value: fn(&ForecastPoint) -> Option<f64>) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| value(p).map(|v| (i as f64, v)))
        .collect()
}

fn y_bounds(data: &[(f64, f64)], floor_at_zero: bool) -> [f64; 2] {
    let (mut lo, mut hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if floor_at_zero {
        lo = lo.min(0.0);
    }
    let pad = ((hi - lo) * 0.1).max(0.5);
    if !floor_at_zero || lo < 0.0 {
        lo -= pad;
    }
    hi += pad;
    [lo, hi]
}

fn display_chart<'a>(
    title: &'a str,
    color: Color,
    points: &[ForecastPoint],
    data: &'a [(f64, f64)],
    floor_at_zero: bool,
) -> Chart<'a> {
    let x_max = points.len().saturating_sub(1).max(1) as f64;
    let x_labels: Vec<Span> = match points {
        [] => vec![Span::raw(MISSING), Span::raw(MISSING)],
        [only] => vec![Span::raw(only.hour_label()), Span::raw(only.hour_label())],
        _ => {
            let mid = points.len() / 2;
            [0, mid, points.len() - 1]
                .iter()
                .map(|&i| Span::raw(points[i].hour_label()))
                .collect()
        }
    };
    let [y_lo, y_hi] = y_bounds(data, floor_at_zero);
    let y_labels = vec![
        Span::raw(format!("{y_lo:.1}")),
        Span::raw(format!("{:.1}", (y_lo + y_hi) / 2.0)),
        Span::raw(format!("{y_hi:.1}")),
    ];

    let dataset = Dataset::default()
        .name(title)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data);

    Chart::new(vec![dataset])
        .block(titled_block(title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_lo, y_hi])
                .labels(y_labels),
        )
}

pub fn ui(f: &mut Frame, dashboard: &Dashboard) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(f.area());

    f.render_widget(display_headline(dashboard), vert_layout[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(vert_layout[1]);

    let detail = if dashboard.show_detail {
        dashboard.selected_point()
    } else {
        None
    };
    let lchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if detail.is_some() { DETAIL_HEIGHT } else { 0 }),
        ])
        .split(chunks[0]);

    f.render_widget(display_days(dashboard, lchunks[0]), lchunks[0]);
    if let Some(point) = detail {
        f.render_widget(display_detail(point), lchunks[1]);
    }

    let rchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);

    let hours = dashboard.next_hours();
    let temp = series(hours, |p| p.temperature);
    let rain = series(hours, |p| p.rain);
    let wind = series(hours, |p| p.wind_speed);

    f.render_widget(
        display_chart("Temperature (°C)", Color::LightRed, hours, &temp, false),
        rchunks[0],
    );
    f.render_widget(
        display_chart("Rain (mm)", Color::LightBlue, hours, &rain, true),
        rchunks[1],
    );
    f.render_widget(
        display_chart("Wind (km/h)", Color::LightGreen, hours, &wind, true),
        rchunks[2],
    );
}
