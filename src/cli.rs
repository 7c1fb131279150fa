use crate::config::{CliOverrides, Settings};
use crate::error::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "extractgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a SQL extract into a dated CSV file and email it")]
#[command(
    long_about = "ExtractGen reads an extract configuration from the config directory, runs \
                  its SQL file against the local SQLite database, writes the result to \
                  data/<name>_<YYYYMMDD>.csv and emails the file as an attachment."
)]
#[command(after_help = "EXAMPLES:\n  \
    extractgen customer_extract.cfg\n  \
    extractgen orders.cfg --skip-email --date 2024-01-01\n  \
    extractgen orders.toml --settings /etc/extractgen.toml --output-format json\n  \
    extractgen --generate-settings")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Configuration file name, e.g. customer_extract.cfg
    #[arg(required_unless_present = "generate_settings")]
    pub config_name: Option<String>,

    /// Settings file path
    #[arg(short, long, help = "Path to TOML settings file")]
    pub settings: Option<PathBuf>,

    /// Run date stamped into the file name and subject (default: today)
    #[arg(long, value_parser = parse_run_date)]
    pub date: Option<NaiveDate>,

    /// Database file to query instead of the configured one
    #[arg(long, env = "EXTRACTGEN_DATABASE")]
    pub database: Option<PathBuf>,

    /// Mail relay host to use instead of the configured one
    #[arg(long, env = "EXTRACTGEN_RELAY")]
    pub relay: Option<String>,

    /// Generate the extract but do not send it
    #[arg(long)]
    pub skip_email: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write a sample settings file and exit
    #[arg(long)]
    pub generate_settings: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = Settings::load_with_defaults(self.settings.as_ref())?;

        settings.merge_with_cli_args(&self.create_cli_overrides());
        settings.validate()?;

        Ok(settings)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_database(self.database.clone())
            .with_relay(self.relay.clone())
    }
}

#[derive(Parser, Debug)]
#[command(name = "clicker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Play the cookie clicker experiment through WebDriver")]
#[command(after_help = "EXAMPLES:\n  \
    clicker\n  \
    clicker --webdriver http://localhost:4444 --duration 300")]
pub struct ClickerCli {
    /// Settings file path
    #[arg(short, long, help = "Path to TOML settings file")]
    pub settings: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Game page URL
    #[arg(long)]
    pub game_url: Option<String>,

    /// Seconds between purchase checks
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many seconds (default: until Ctrl+C)
    #[arg(long)]
    pub duration: Option<u64>,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl ClickerCli {
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = Settings::load_with_defaults(self.settings.as_ref())?;

        let overrides = CliOverrides::new()
            .with_webdriver_url(self.webdriver.clone())
            .with_game_url(self.game_url.clone())
            .with_purchase_interval(self.interval)
            .with_run_for(self.duration);
        settings.merge_with_cli_args(&overrides);
        settings.validate()?;

        Ok(settings)
    }
}

/// Accepts `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_run_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("Invalid date '{}'. Use YYYYMMDD or YYYY-MM-DD.", s))
}
