use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info};
use shared::Metadata;
use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Result, ZenithError};

/// Separator used by every file format of the crate unless configured otherwise
pub const DEFAULT_SEPARATOR: u8 = b';';

/// Raw contents of a delimited file: a header row and text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Cell of `row` under `column`, `None` if the column does not exist
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|i| row.get(i))
            .map(String::as_str)
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads and writes delimited files with a fixed separator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvStorage {
    separator: u8,
}

impl Default for CsvStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl CsvStorage {
    pub fn new(separator: u8) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    /// Read a whole delimited file. The first row is the header.
    pub fn read_table(&self, path: &Path) -> Result<DelimitedTable> {
        if !path.is_file() {
            return Err(ZenithError::missing_file(path));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.separator)
            .has_headers(true)
            .from_path(path)
            .map_err(|e| Self::read_error(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| Self::read_error(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut table = DelimitedTable {
            headers,
            rows: Vec::new(),
        };

        for result in reader.records() {
            let record = result.map_err(|e| Self::read_error(path, e))?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read {} rows from {}", table.rows.len(), path.display());
        Ok(table)
    }

    /// Write a delimited file, replacing any previous contents atomically
    pub fn write_table(&self, path: &Path, table: &DelimitedTable) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Create a temporary file for atomic write
        let temp_path = path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            let writer = BufWriter::new(file);
            let mut csv_writer = WriterBuilder::new()
                .delimiter(self.separator)
                .from_writer(writer);

            csv_writer.write_record(&table.headers)?;
            for row in &table.rows {
                csv_writer.write_record(row)?;
            }

            csv_writer.flush()?;
        }

        // Atomic move from temp to final file
        fs::rename(&temp_path, path)?;

        info!("💾 Wrote {} rows to {}", table.rows.len(), path.display());
        Ok(())
    }

    /// Read a two-column key/value file (`Attribute;Value`, `Field;Value`)
    pub fn read_pairs(&self, path: &Path, key_column: &str, value_column: &str) -> Result<Metadata> {
        let table = self.read_table(path)?;

        let key_index = table.column_index(key_column).ok_or_else(|| {
            ZenithError::Parse(format!("{}: missing column {}", path.display(), key_column))
        })?;
        let value_index = table.column_index(value_column).ok_or_else(|| {
            ZenithError::Parse(format!("{}: missing column {}", path.display(), value_column))
        })?;

        Ok(table
            .rows
            .iter()
            .map(|row| {
                (
                    row.get(key_index).cloned().unwrap_or_default(),
                    row.get(value_index).cloned().unwrap_or_default(),
                )
            })
            .collect())
    }

    /// Write a two-column key/value file
    pub fn write_pairs(
        &self,
        path: &Path,
        key_column: &str,
        value_column: &str,
        pairs: &Metadata,
    ) -> Result<()> {
        let mut table = DelimitedTable::new([key_column, value_column]);
        for (key, value) in pairs.iter() {
            table.push_row([key, value]);
        }
        self.write_table(path, &table)
    }

    fn read_error(path: &Path, error: csv::Error) -> ZenithError {
        if error.is_io_error() {
            ZenithError::Csv(error)
        } else {
            ZenithError::Parse(format!("{}: {}", path.display(), error))
        }
    }
}
