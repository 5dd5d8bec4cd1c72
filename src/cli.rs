use clap::builder::{styling::AnsiColor, Styles};
use clap::{Parser, ValueEnum};

const ABOUT: &str = "Open-Meteo hourly forecast TUI";

const LONG_ABOUT: &str = "
TUI for viewing the hourly forecast of one location, sourced from Open-Meteo.

Shows today plus the next six days hour by hour, and charts temperature, rain and wind for the
next 24 hours. Location, timezone and display settings are read from `meteo.toml` in the current
directory (or the file given with --config); the flags below override it.

With --print the forecast is fetched once and written to stdout as JSON instead.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

/// What `--print` writes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Snapshot {
    /// Hours grouped by day
    Days,
    /// The next hours starting now
    Window,
    /// The first hours of the forecast, whatever the time
    Head,
    /// Every hourly record
    Points,
}

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(short, long, help = "Path to the TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, allow_negative_numbers = true, help = "Latitude of the location")]
    pub latitude: Option<f64>,

    #[arg(long, allow_negative_numbers = true, help = "Longitude of the location")]
    pub longitude: Option<f64>,

    #[arg(long, help = "Timezone of the returned times (e.g. Europe/Rome, auto)")]
    pub timezone: Option<String>,

    #[arg(long, help = "Number of hours charted from now")]
    pub hours: Option<usize>,

    #[arg(long, help = "Number of days shown")]
    pub days: Option<usize>,

    #[arg(
        long,
        value_enum,
        num_args = 0..=1,
        default_missing_value = "days",
        help = "Fetch once and print JSON instead of starting the TUI"
    )]
    pub print: Option<Snapshot>,
}
