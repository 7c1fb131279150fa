pub mod cli;
pub mod clicker;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod notify;
pub mod ui;

// Public API re-exports
pub use cli::{ClickerCli, Cli, OutputFormat};
pub use config::{CliOverrides, ClickerConfig, LoggingConfig, MailConfig, PathsConfig, Settings};
pub use error::{ExtractGenError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extract::{CellValue, ConfigParameters, DataFetcher, ExtractJob, ExtractResult, ExtractWriter, GeneratedFile};
pub use notify::{DeliveryReceipt, MailRelay, Notifier, OutgoingEmail, SmtpRelay};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Inputs of a single extract run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub config_name: String,
    pub run_date: NaiveDate,
    pub send_email: bool,
}

impl RunRequest {
    pub fn new<S: Into<String>>(config_name: S) -> Self {
        Self {
            config_name: config_name.into(),
            run_date: Local::now().date_naive(),
            send_email: true,
        }
    }

    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = date;
        self
    }

    pub fn with_send_email(mut self, send: bool) -> Self {
        self.send_email = send;
        self
    }

    pub fn date_stamp(&self) -> String {
        self.run_date.format("%Y%m%d").to_string()
    }
}

/// What one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub config_name: String,
    pub run_date: String,
    pub columns: usize,
    pub extract: GeneratedFile,
    pub delivery: Option<DeliveryReceipt>,
    pub elapsed: Duration,
}

/// Main library interface: config → query → CSV → email.
pub struct ExtractGenerator {
    settings: Settings,
    notifier: Notifier,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl ExtractGenerator {
    /// Create a generator that submits mail to the configured SMTP relay.
    pub fn new(settings: Settings, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let relay = SmtpRelay::new(&settings.mail.relay, settings.mail.port);
        Self::with_relay(settings, Box::new(relay), output_mode, verbose, quiet)
    }

    pub fn with_relay(
        settings: Settings,
        relay: Box<dyn MailRelay>,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Self {
        let notifier = Notifier::new(relay, settings.paths.data_dir.clone());
        // Spinners would interleave with machine-readable output
        let show_progress = !quiet && output_mode == OutputMode::Human;

        Self {
            settings,
            notifier,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(show_progress),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let settings = cli_args.load_settings()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(settings, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// Execute one extract run. Steps run strictly in order and the first
    /// failure ends the run.
    pub fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let start_time = Instant::now();
        let date_stamp = request.date_stamp();

        // Step 1: Read configuration
        tracing::info!("Reading configuration file {}", request.config_name);
        self.output_formatter
            .start_operation(&format!("Reading configuration file {}", request.config_name));
        let params = ConfigParameters::load(&self.settings.paths.config_dir, &request.config_name)?;
        let job = ExtractJob::from_parameters(&params)?;
        self.output_formatter
            .debug(&format!("Loaded {} parameters", params.len()));

        // Step 2: Fetch data
        tracing::info!("Fetching data from database.");
        let fetcher = DataFetcher::new(&self.settings.paths.database, &self.settings.paths.sql_dir);
        let extract = self
            .progress_manager
            .with_spinner("Fetching data from database", || fetcher.fetch(&job.sql_file))?;
        self.output_formatter.info(&format!(
            "Fetched {} rows with {} columns",
            extract.row_count(),
            extract.column_count()
        ));

        // Step 3: Write extract
        let extract_name = job.dated_file_name(&date_stamp);
        let writer = ExtractWriter::new(&self.settings.paths.data_dir);
        let generated = writer.write(&extract, &extract_name)?;
        tracing::info!("Generated {}", extract_name);
        self.output_formatter
            .success(&format!("Generated {}", generated.path.display()));

        // Step 4: Send email
        let delivery = if request.send_email {
            let email = OutgoingEmail {
                from: self.settings.mail.sender.clone(),
                to: job.email_to.clone(),
                cc: job.email_cc.clone(),
                subject: job.dated_subject(&date_stamp),
                html_body: job.email_body.clone(),
                attachment: generated.file_name.clone(),
            };
            let receipt = self
                .progress_manager
                .with_spinner("Sending email", || self.notifier.send(&email))?;
            self.output_formatter
                .success(&format!("Emailed {} to {}", extract_name, receipt.to.join(", ")));
            Some(receipt)
        } else {
            tracing::info!("Email skipped for {}", extract_name);
            self.output_formatter.warning("Email skipped");
            None
        };

        Ok(RunReport {
            config_name: request.config_name.clone(),
            run_date: date_stamp,
            columns: extract.column_count(),
            extract: generated,
            delivery,
            elapsed: start_time.elapsed(),
        })
    }

    /// Generate sample settings file
    pub fn generate_sample_settings<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Settings::default().save_to_file(output_path)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Log the error and print it with a suggestion.
    pub fn handle_error(&self, error: &ExtractGenError) {
        tracing::error!("{}", error);
        self.output_formatter.print_user_friendly_error(error);
    }
}
