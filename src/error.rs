use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractGenError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Malformed configuration at line {line_number}: {line}")]
    MalformedConfig { line_number: usize, line: String },

    #[error("Missing configuration parameter: {key}")]
    MissingParameter { key: String },

    #[error("Settings error: {message}")]
    Settings { message: String },

    #[error("SQL file not found: {path}")]
    SqlFileNotFound { path: String },

    #[error("SQL file is empty: {path}")]
    EmptyQuery { path: String },

    #[error("Could not establish connection to database {path}")]
    DatabaseConnection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Row {row} has {found} values, expected {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path} could not be generated")]
    ExtractWrite {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path} does not exist")]
    AttachmentNotFound { path: String },

    #[error("Invalid email address: {address}")]
    InvalidAddress { address: String },

    #[error("Failed to build email: {message}")]
    MessageBuild { message: String },

    #[error("Mail relay rejected the message: {message}")]
    Relay { message: String },

    #[error("Browser automation failed: {message}")]
    Browser { message: String },

    #[error("Failed to install Ctrl+C handler: {message}")]
    SignalHandler { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ExtractGenError {
    fn user_message(&self) -> String {
        match self {
            ExtractGenError::ConfigNotFound { path } => {
                format!("Configuration file not found: {}", path)
            }
            ExtractGenError::MalformedConfig { line_number, line } => {
                format!(
                    "Line {} of the configuration file is not a 'key: value' pair: {}",
                    line_number, line
                )
            }
            ExtractGenError::MissingParameter { key } => {
                format!("Configuration is missing the '{}' parameter", key)
            }
            ExtractGenError::DatabaseConnection { path, source } => {
                format!("Could not open database {}: {}", path, source)
            }
            ExtractGenError::ExtractWrite { path, source } => {
                format!("{} could not be generated: {}", path, source)
            }
            ExtractGenError::AttachmentNotFound { path } => {
                format!("Attachment {} does not exist", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExtractGenError::ConfigNotFound { .. } => Some(
                "Configuration files are looked up in the configured config directory (default: config/).".to_string()
            ),
            ExtractGenError::MalformedConfig { .. } => Some(
                "Each line must look like 'key: value'. Start a line with '#' to comment it out.".to_string()
            ),
            ExtractGenError::MissingParameter { .. } => Some(
                "Required parameters are sqlfile, extractname, email_to, email_cc, subject and email_body.".to_string()
            ),
            ExtractGenError::Settings { .. } => Some(
                "Check your settings file syntax, or regenerate one with --generate-settings.".to_string()
            ),
            ExtractGenError::SqlFileNotFound { .. } => Some(
                "SQL files are looked up in the configured sql directory (default: sql/).".to_string()
            ),
            ExtractGenError::DatabaseConnection { .. } => Some(
                "Check the database path in your settings or pass --database.".to_string()
            ),
            ExtractGenError::Relay { .. } => Some(
                "Check that the mail relay is reachable, or pass --skip-email to only generate the extract.".to_string()
            ),
            ExtractGenError::Browser { .. } => Some(
                "Make sure a WebDriver server (e.g. chromedriver) is running at the configured URL.".to_string()
            ),
            _ => None,
        }
    }
}

impl ExtractGenError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExtractGenError::ConfigNotFound { .. }
            | ExtractGenError::MalformedConfig { .. }
            | ExtractGenError::MissingParameter { .. }
            | ExtractGenError::Settings { .. } => 2,
            ExtractGenError::SqlFileNotFound { .. } | ExtractGenError::EmptyQuery { .. } => 3,
            ExtractGenError::DatabaseConnection { .. }
            | ExtractGenError::Query(_)
            | ExtractGenError::RowArity { .. } => 4,
            ExtractGenError::ExtractWrite { .. } => 5,
            ExtractGenError::AttachmentNotFound { .. }
            | ExtractGenError::InvalidAddress { .. }
            | ExtractGenError::MessageBuild { .. }
            | ExtractGenError::Relay { .. } => 6,
            _ => 1,
        }
    }
}

impl From<toml::de::Error> for ExtractGenError {
    fn from(error: toml::de::Error) -> Self {
        ExtractGenError::Settings {
            message: error.to_string(),
        }
    }
}

impl From<lettre::transport::smtp::Error> for ExtractGenError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        ExtractGenError::Relay {
            message: error.to_string(),
        }
    }
}

impl From<lettre::error::Error> for ExtractGenError {
    fn from(error: lettre::error::Error) -> Self {
        ExtractGenError::MessageBuild {
            message: error.to_string(),
        }
    }
}

impl From<thirtyfour::error::WebDriverError> for ExtractGenError {
    fn from(error: thirtyfour::error::WebDriverError) -> Self {
        ExtractGenError::Browser {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractGenError>;
