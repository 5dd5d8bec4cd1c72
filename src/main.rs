#![allow(dead_code)]

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::Duration;
use std::{error::Error, io};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod days;
mod error;
mod forecast;
mod format;
mod meteo;
mod weather;
mod window;

use crate::app::{run_app, Dashboard};
use crate::cli::{Args, Snapshot};
use crate::config::{load_config, Config};
use crate::error::ConfigError;
use crate::forecast::Forecast;
use crate::meteo::{ForecastSource, OpenMeteo};
use crate::window::Window;

fn apply_args(config: &mut Config, args: &Args) -> Result<(), ConfigError> {
    if let Some(lat) = args.latitude {
        config.location.latitude = lat;
    }
    if let Some(lon) = args.longitude {
        config.location.longitude = lon;
    }
    if let Some(ref tz) = args.timezone {
        config.location.timezone = tz.clone();
    }
    if let Some(hours) = args.hours {
        config.display.window_hours = hours;
    }
    if let Some(days) = args.days {
        config.display.days = days;
    }
    config.validate()
}

/// The TUI owns the terminal, so it logs to a file; print mode logs to stderr.
fn init_logging(config: &Config, to_file: bool) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.general.log_path)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
    Ok(())
}

fn snapshot_json(
    forecast: &Forecast,
    config: &Config,
    kind: Snapshot,
    now: chrono::NaiveDateTime,
) -> serde_json::Result<String> {
    match kind {
        Snapshot::Days => serde_json::to_string_pretty(&days::group_by_day(
            &forecast.points,
            config.display.days,
            config.display.hours_per_day,
        )),
        Snapshot::Window => serde_json::to_string_pretty(
            Window::FromNow(config.display.window_hours).select(&forecast.points, now),
        ),
        Snapshot::Head => serde_json::to_string_pretty(
            Window::Prefix(config.display.window_hours).select(&forecast.points, now),
        ),
        Snapshot::Points => serde_json::to_string_pretty(&forecast.points),
    }
}

fn print_snapshot(config: &Config, kind: Snapshot) -> Result<(), Box<dyn Error>> {
    let forecast = OpenMeteo::new(config)?.fetch()?;
    println!("{}", snapshot_json(&forecast, config, kind, forecast.now())?);
    Ok(())
}

fn run_tui(config: &Config) -> Result<(), Box<dyn Error>> {
    let source = OpenMeteo::new(config)?;
    let mut dashboard = Dashboard::new(config);
    let refresh_every = match config.display.refresh_minutes {
        0 => None,
        m => Some(Duration::from_secs(m * 60)),
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &source, &mut dashboard, refresh_every);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args)?;

    init_logging(&config, args.print.is_none())?;
    info!(
        lat = config.location.latitude,
        lon = config.location.longitude,
        timezone = %config.location.timezone,
        "Configuration loaded"
    );

    match args.print {
        Some(kind) => print_snapshot(&config, kind),
        None => run_tui(&config),
    }
}
