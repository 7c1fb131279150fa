use crate::error::{ExtractGenError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings. Distinct from the per-extract `key: value`
/// parameters read by [`crate::extract::ConfigParameters`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub mail: MailConfig,
    pub logging: LoggingConfig,
    pub clicker: ClickerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub config_dir: PathBuf,
    pub sql_dir: PathBuf,
    pub data_dir: PathBuf,
    pub database: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    pub relay: String,
    pub port: u16,
    pub sender: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClickerConfig {
    pub webdriver_url: String,
    pub game_url: String,
    pub purchase_interval_secs: u64,
    pub run_for_secs: Option<u64>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
            sql_dir: PathBuf::from("sql"),
            data_dir: PathBuf::from("data"),
            database: PathBuf::from("chinook.db"),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay: "mailhost".to_string(),
            port: 25,
            sender: "tech@abc.com".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("extractgen.log"),
            level: "info".to_string(),
        }
    }
}

impl Default for ClickerConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            game_url: "http://orteil.dashnet.org/experiments/cookie/".to_string(),
            purchase_interval_secs: 5,
            run_for_secs: None, // Play until interrupted
        }
    }
}

impl Settings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractGenError::Settings {
                message: format!("Settings file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExtractGenError::Settings {
            message: format!("Failed to read settings file {}: {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ExtractGenError::Settings {
            message: format!("Failed to parse settings file {}: {}", path.display(), e),
        })?;

        Ok(settings)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(settings_path: Option<P>) -> Result<Self> {
        match settings_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["extractgen.toml", ".extractgen.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref database) = cli_args.database {
            self.paths.database = database.clone();
        }

        if let Some(ref relay) = cli_args.relay {
            self.mail.relay = relay.clone();
        }

        if let Some(ref url) = cli_args.webdriver_url {
            self.clicker.webdriver_url = url.clone();
        }

        if let Some(ref url) = cli_args.game_url {
            self.clicker.game_url = url.clone();
        }

        if let Some(interval) = cli_args.purchase_interval_secs {
            self.clicker.purchase_interval_secs = interval;
        }

        if let Some(duration) = cli_args.run_for_secs {
            self.clicker.run_for_secs = Some(duration);
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ExtractGenError::Settings {
            message: format!("Failed to serialize settings: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ExtractGenError::Settings {
            message: format!("Failed to write settings file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("config_dir", &self.paths.config_dir),
            ("sql_dir", &self.paths.sql_dir),
            ("data_dir", &self.paths.data_dir),
            ("database", &self.paths.database),
            ("logging.file", &self.logging.file),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ExtractGenError::Settings {
                    message: format!("{} must not be empty", name),
                });
            }
        }

        if self.mail.relay.trim().is_empty() {
            return Err(ExtractGenError::Settings {
                message: "Mail relay host must not be empty".to_string(),
            });
        }

        if self.mail.port == 0 {
            return Err(ExtractGenError::Settings {
                message: "Mail relay port must be greater than 0".to_string(),
            });
        }

        if self.mail.sender.parse::<lettre::message::Mailbox>().is_err() {
            return Err(ExtractGenError::Settings {
                message: format!("Sender is not a valid email address: {}", self.mail.sender),
            });
        }

        if self.logging.level.trim().is_empty() {
            return Err(ExtractGenError::Settings {
                message: "Log level must not be empty".to_string(),
            });
        }

        if self.clicker.purchase_interval_secs == 0 {
            return Err(ExtractGenError::Settings {
                message: "Purchase interval must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn purchase_interval(&self) -> Duration {
        Duration::from_secs(self.clicker.purchase_interval_secs)
    }

    pub fn run_for(&self) -> Option<Duration> {
        self.clicker.run_for_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub database: Option<PathBuf>,
    pub relay: Option<String>,
    pub webdriver_url: Option<String>,
    pub game_url: Option<String>,
    pub purchase_interval_secs: Option<u64>,
    pub run_for_secs: Option<u64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, database: Option<PathBuf>) -> Self {
        self.database = database;
        self
    }

    pub fn with_relay(mut self, relay: Option<String>) -> Self {
        self.relay = relay;
        self
    }

    pub fn with_webdriver_url(mut self, url: Option<String>) -> Self {
        self.webdriver_url = url;
        self
    }

    pub fn with_game_url(mut self, url: Option<String>) -> Self {
        self.game_url = url;
        self
    }

    pub fn with_purchase_interval(mut self, secs: Option<u64>) -> Self {
        self.purchase_interval_secs = secs;
        self
    }

    pub fn with_run_for(mut self, secs: Option<u64>) -> Self {
        self.run_for_secs = secs;
        self
    }
}
