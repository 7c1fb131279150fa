use crate::error::{ExtractGenError, Result};
use crate::extract::fetcher::ExtractResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// A written extract on disk.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub rows_written: usize,
    pub bytes: u64,
}

pub struct ExtractWriter {
    data_dir: PathBuf,
    delimiter: u8,
}

impl ExtractWriter {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write headers then rows to `file_name` under the data directory,
    /// replacing any previous file. The file is flushed and closed on return.
    pub fn write(&self, extract: &ExtractResult, file_name: &str) -> Result<GeneratedFile> {
        let path = self.data_dir.join(file_name);
        let wrap = |source: csv::Error| ExtractGenError::ExtractWrite {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.data_dir).map_err(|e| wrap(e.into()))?;

        tracing::info!("Saving data in {}", file_name);

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .from_path(&path)
            .map_err(wrap)?;

        writer.write_record(extract.headers()).map_err(wrap)?;
        for row in extract.rows() {
            writer
                .write_record(row.iter().map(|value| value.to_string()))
                .map_err(wrap)?;
        }
        writer.flush().map_err(|e| wrap(e.into()))?;
        drop(writer);

        let bytes = fs::metadata(&path).map_err(|e| wrap(e.into()))?.len();

        Ok(GeneratedFile {
            path,
            file_name: file_name.to_string(),
            rows_written: extract.row_count(),
            bytes,
        })
    }
}
