// Append-only run log powered by tracing-subscriber.
//
// Every line carries a local timestamp, the severity and the message.
// `RUST_LOG` takes precedence over the configured level.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    // Keep the log file about this tool, not about the SMTP or WebDriver internals
    let directives = format!("{},lettre=warn,thirtyfour=warn,hyper=warn,reqwest=warn", level);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", directives, e))
}

/// Install the global subscriber writing to the configured log file.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("Failed to open log file {}", config.file.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_env_filter(build_env_filter(&config.level)?)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_configured_level() {
        std::env::remove_var("RUST_LOG");
        assert!(build_env_filter("info").is_ok());
        assert!(build_env_filter("debug").is_ok());
    }

    #[test]
    fn test_filter_rejects_garbage() {
        std::env::remove_var("RUST_LOG");
        assert!(build_env_filter("extractgen=loud").is_err());
    }
}
