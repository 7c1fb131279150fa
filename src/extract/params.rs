use crate::error::{ExtractGenError, Result};
use std::collections::BTreeMap;
use std::path::Path;

pub const SQL_FILE: &str = "sqlfile";
pub const EXTRACT_NAME: &str = "extractname";
pub const EMAIL_TO: &str = "email_to";
pub const EMAIL_CC: &str = "email_cc";
pub const SUBJECT: &str = "subject";
pub const EMAIL_BODY: &str = "email_body";

pub const REQUIRED_KEYS: &[&str] = &[SQL_FILE, EXTRACT_NAME, EMAIL_TO, EMAIL_CC, SUBJECT, EMAIL_BODY];

/// Named string parameters for one extract run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigParameters {
    entries: BTreeMap<String, String>,
}

impl ConfigParameters {
    /// Read `name` from `config_dir`. Names ending in `.toml` are parsed as a
    /// flat TOML table, everything else as `key: value` lines.
    pub fn load<P: AsRef<Path>>(config_dir: P, name: &str) -> Result<Self> {
        let path = config_dir.as_ref().join(name);

        if !path.is_file() {
            return Err(ExtractGenError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)?;

        if name.ends_with(".toml") {
            Self::parse_toml(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// Parse `key: value` lines. The split happens on the first colon only,
    /// so values may contain colons of their own.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || ExtractGenError::MalformedConfig {
                line_number: index + 1,
                line: line.to_string(),
            };

            let (key, value) = line.split_once(':').ok_or_else(malformed)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed());
            }

            entries.insert(key.to_string(), value.trim().to_string());
        }

        Ok(Self { entries })
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let mut entries = BTreeMap::new();

        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s.trim().to_string(),
                toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                    value.to_string()
                }
                other => {
                    return Err(ExtractGenError::Settings {
                        message: format!("Parameter '{}' must be a scalar, found {}", key, other.type_str()),
                    })
                }
            };
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| ExtractGenError::MissingParameter {
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed view of the parameters an extract run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractJob {
    pub sql_file: String,
    pub extract_name: String,
    pub email_to: Vec<String>,
    pub email_cc: Vec<String>,
    pub subject: String,
    pub email_body: String,
}

impl ExtractJob {
    pub fn from_parameters(params: &ConfigParameters) -> Result<Self> {
        for key in REQUIRED_KEYS {
            params.require(key)?;
        }

        let email_to = split_addresses(params.require(EMAIL_TO)?);
        if email_to.is_empty() {
            return Err(ExtractGenError::MissingParameter {
                key: EMAIL_TO.to_string(),
            });
        }

        Ok(Self {
            sql_file: params.require(SQL_FILE)?.to_string(),
            extract_name: params.require(EXTRACT_NAME)?.to_string(),
            email_to,
            email_cc: split_addresses(params.require(EMAIL_CC)?),
            subject: params.require(SUBJECT)?.to_string(),
            email_body: params.require(EMAIL_BODY)?.to_string(),
        })
    }

    /// `<base>_<YYYYMMDD>.csv`, where `<base>` is the configured extract name
    /// without its `.csv` suffix.
    pub fn dated_file_name(&self, date_stamp: &str) -> String {
        let base = self
            .extract_name
            .strip_suffix(".csv")
            .unwrap_or(&self.extract_name);
        format!("{}_{}.csv", base, date_stamp)
    }

    pub fn dated_subject(&self, date_stamp: &str) -> String {
        format!("{} - {}", self.subject, date_stamp)
    }
}

fn split_addresses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ORDERS_CONFIG: &str = "sqlfile: orders.sql\n\
                                 extractname: orders.csv\n\
                                 email_to: a@x.com\n\
                                 email_cc: b@x.com\n\
                                 subject: Orders\n\
                                 email_body: See attached\n";

    #[test]
    fn test_parse_trims_keys_and_values() {
        let params = ConfigParameters::parse("  sqlfile  :   orders.sql   \n\nsubject:Orders").unwrap();
        assert_eq!(params.get("sqlfile"), Some("orders.sql"));
        assert_eq!(params.get("subject"), Some("Orders"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let params = ConfigParameters::parse("email_body: Run at 10:30: see attached").unwrap();
        assert_eq!(params.get("email_body"), Some("Run at 10:30: see attached"));
    }

    #[test]
    fn test_parse_rejects_line_without_colon() {
        let err = ConfigParameters::parse("sqlfile: a.sql\nthis line is wrong\n").unwrap_err();
        match err {
            ExtractGenError::MalformedConfig { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "this line is wrong");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        assert!(ConfigParameters::parse(": value").is_err());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let params = ConfigParameters::parse("# nightly extract\n\n   \nsqlfile: a.sql\n").unwrap();
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_parse_allows_empty_value() {
        let params = ConfigParameters::parse("email_cc:").unwrap();
        assert_eq!(params.get("email_cc"), Some(""));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigParameters::load(temp_dir.path(), "absent.cfg").unwrap_err();
        assert!(matches!(err, ExtractGenError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_key_value_and_toml_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("orders.cfg"), ORDERS_CONFIG).unwrap();
        fs::write(
            temp_dir.path().join("orders.toml"),
            "sqlfile = \"orders.sql\"\nextractname = \"orders.csv\"\nemail_to = \"a@x.com\"\n\
             email_cc = \"b@x.com\"\nsubject = \"Orders\"\nemail_body = \"See attached\"\n",
        )
        .unwrap();

        let from_text = ConfigParameters::load(temp_dir.path(), "orders.cfg").unwrap();
        let from_toml = ConfigParameters::load(temp_dir.path(), "orders.toml").unwrap();
        assert_eq!(from_text, from_toml);
    }

    #[test]
    fn test_toml_rejects_nested_values() {
        assert!(ConfigParameters::parse_toml("[section]\nkey = \"v\"").is_err());
    }

    #[test]
    fn test_job_from_parameters() {
        let params = ConfigParameters::parse(ORDERS_CONFIG).unwrap();
        let job = ExtractJob::from_parameters(&params).unwrap();

        assert_eq!(job.sql_file, "orders.sql");
        assert_eq!(job.email_to, vec!["a@x.com"]);
        assert_eq!(job.email_cc, vec!["b@x.com"]);
        assert_eq!(job.dated_file_name("20240101"), "orders_20240101.csv");
        assert_eq!(job.dated_subject("20240101"), "Orders - 20240101");
    }

    #[test]
    fn test_job_requires_every_key() {
        for missing in REQUIRED_KEYS {
            let content: String = ORDERS_CONFIG
                .lines()
                .filter(|line| !line.starts_with(&format!("{}:", missing)))
                .map(|line| format!("{}\n", line))
                .collect();
            let params = ConfigParameters::parse(&content).unwrap();

            match ExtractJob::from_parameters(&params) {
                Err(ExtractGenError::MissingParameter { key }) => assert_eq!(key, *missing),
                other => panic!("expected missing {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_job_recipient_lists() {
        let content = ORDERS_CONFIG
            .replace("email_to: a@x.com", "email_to: a@x.com, c@x.com")
            .replace("email_cc: b@x.com", "email_cc:");
        let params = ConfigParameters::parse(&content).unwrap();
        let job = ExtractJob::from_parameters(&params).unwrap();

        assert_eq!(job.email_to, vec!["a@x.com", "c@x.com"]);
        assert!(job.email_cc.is_empty());
    }

    #[test]
    fn test_dated_file_name_without_csv_suffix() {
        let params = ConfigParameters::parse(&ORDERS_CONFIG.replace("orders.csv", "orders")).unwrap();
        let job = ExtractJob::from_parameters(&params).unwrap();
        assert_eq!(job.dated_file_name("20240101"), "orders_20240101.csv");
    }
}
