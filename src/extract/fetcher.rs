use crate::error::{ExtractGenError, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single scalar from a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Real(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the trailing `.0` on integral reals
            CellValue::Real(r) => write!(f, "{:?}", r),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Blob(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

/// Column headers plus fully materialized rows of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractResult {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl ExtractResult {
    /// Every row must have as many values as there are headers.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(ExtractGenError::RowArity {
                row: index + 1,
                expected: headers.len(),
                found: row.len(),
            });
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub struct DataFetcher {
    database: PathBuf,
    sql_dir: PathBuf,
}

impl DataFetcher {
    pub fn new<D: Into<PathBuf>, S: Into<PathBuf>>(database: D, sql_dir: S) -> Self {
        Self {
            database: database.into(),
            sql_dir: sql_dir.into(),
        }
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Load the query text of `sql_file` from the query directory.
    pub fn load_query(&self, sql_file: &str) -> Result<String> {
        let path = self.sql_dir.join(sql_file);

        if !path.is_file() {
            return Err(ExtractGenError::SqlFileNotFound {
                path: path.display().to_string(),
            });
        }

        let query = std::fs::read_to_string(&path)?;
        if query.trim().is_empty() {
            return Err(ExtractGenError::EmptyQuery {
                path: path.display().to_string(),
            });
        }

        Ok(query)
    }

    /// Run the query stored in `sql_file` and collect every row.
    ///
    /// The query file is read before the database is touched, so a missing
    /// file never opens a connection. The connection lives only for this
    /// call and is closed whether or not the query succeeds.
    pub fn fetch(&self, sql_file: &str) -> Result<ExtractResult> {
        let query = self.load_query(sql_file)?;
        let connection = self.connect()?;

        let result = run_query(&connection, &query);

        if let Err((_, e)) = connection.close() {
            tracing::warn!("Failed to close database connection cleanly: {}", e);
        }

        result
    }

    fn connect(&self) -> Result<Connection> {
        // Read-only: a missing database must not be created as an empty file
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        Connection::open_with_flags(&self.database, flags).map_err(|source| {
            tracing::debug!("Opening {} failed: {}", self.database.display(), source);
            ExtractGenError::DatabaseConnection {
                path: self.database.display().to_string(),
                source,
            }
        })
    }
}

fn run_query(connection: &Connection, query: &str) -> Result<ExtractResult> {
    let mut statement = connection.prepare(query)?;
    let headers: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let column_count = headers.len();

    let mut records = Vec::new();
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(column_count);
        for index in 0..column_count {
            record.push(CellValue::from(row.get_ref(index)?));
        }
        records.push(record);
    }

    ExtractResult::new(headers, records)
}
