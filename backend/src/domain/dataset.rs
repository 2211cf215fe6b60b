//! A dataset sourced from one delimited file.
//!
//! [`DataSource`] holds the descriptive attributes shared by every
//! file-backed object (tables and ledgers); [`Table`] adds a typed column
//! schema and the loaded rows.

use log::{info, warn};
use shared::{Metadata, Value};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::entity::Entity;
use crate::error::{Result, ZenithError};
use crate::storage::CsvStorage;

pub const SIZE_FIELD: &str = "Size";
pub const COLOR_FIELD: &str = "Color";
pub const SOURCE_FIELD: &str = "Source";
pub const DESCRIPTION_FIELD: &str = "Description";
pub const FILE_DATA_FIELD: &str = "File_Data";

/// Cell texts that count as a missing value
pub const MISSING_MARKERS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Where a dataset comes from and how it is described
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    /// Absolute path of the data file, once one is set
    pub file_path: Option<PathBuf>,
    /// Folder of `file_path`, recomputed by [`DataSource::update_folder`]
    pub folder: Option<PathBuf>,
    pub source: String,
    pub description: String,
    pub color: String,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            file_path: None,
            folder: None,
            source: String::new(),
            description: String::new(),
            color: "blue".to_string(),
        }
    }
}

impl DataSource {
    /// Append `Size`, `Color`, `Source`, `Description` and `File_Data` to a parent's metadata
    pub fn extend_metadata(&self, mut metadata: Metadata, size: Option<usize>) -> Metadata {
        metadata.insert(SIZE_FIELD, size.map(|s| s.to_string()).unwrap_or_default());
        metadata.insert(COLOR_FIELD, self.color.as_str());
        metadata.insert(SOURCE_FIELD, self.source.as_str());
        metadata.insert(DESCRIPTION_FIELD, self.description.as_str());
        metadata.insert(
            FILE_DATA_FIELD,
            self.file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        );
        metadata
    }

    /// Apply the descriptive attributes present in `values`.
    ///
    /// `File_Data` is resolved against the entity's bootstrap folder.
    pub fn set(&mut self, entity: &Entity, values: &Metadata) {
        if let Some(color) = values.get(COLOR_FIELD) {
            self.color = color.to_string();
        }
        if let Some(source) = values.get(SOURCE_FIELD) {
            self.source = source.to_string();
        }
        if let Some(description) = values.get(DESCRIPTION_FIELD) {
            self.description = description.to_string();
        }
        if let Some(file) = values.get(FILE_DATA_FIELD).filter(|f| !f.trim().is_empty()) {
            self.set_file(&entity.resolve_path(file.trim()));
        }
    }

    pub fn set_file(&mut self, path: &Path) {
        self.file_path = Some(absolutize(path));
        self.update_folder();
    }

    pub fn update_folder(&mut self) {
        self.folder = self
            .file_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf);
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Type a table column is parsed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn number(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Number,
        }
    }

    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Text,
        }
    }
}

/// One parsed row, keyed by column name
pub type Row = BTreeMap<String, Value>;

/// A dataset with a fixed set of required, typed columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub entity: Entity,
    pub source: DataSource,
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    loaded: bool,
    storage: CsvStorage,
}

impl Table {
    /// Table with the demo schema: numeric `P`, `RM` and `TempDB`
    pub fn new(name: &str, alias: Option<&str>) -> Self {
        Self::with_columns(
            name,
            alias,
            vec![
                ColumnSpec::number("P"),
                ColumnSpec::number("RM"),
                ColumnSpec::number("TempDB"),
            ],
        )
    }

    pub fn with_columns(name: &str, alias: Option<&str>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            entity: Entity::new(name, alias),
            source: DataSource::default(),
            columns,
            rows: Vec::new(),
            loaded: false,
            storage: CsvStorage::default(),
        }
    }

    pub fn with_storage(mut self, storage: CsvStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row count, `None` before any data was loaded
    pub fn size(&self) -> Option<usize> {
        self.loaded.then_some(self.rows.len())
    }

    /// Numeric values of a column, in row order
    pub fn numbers(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(Value::as_number))
            .collect()
    }

    /// Load the required columns of a delimited file.
    ///
    /// Rows with a missing value in any required column are dropped; a
    /// malformed number anywhere fails the whole load.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let table = self.storage.read_table(path)?;

        let mut indexes = Vec::with_capacity(self.columns.len());
        for spec in &self.columns {
            let index = table.column_index(&spec.name).ok_or_else(|| {
                ZenithError::Parse(format!("{}: missing column {}", path.display(), spec.name))
            })?;
            indexes.push((index, spec));
        }

        let mut rows = Vec::with_capacity(table.len());
        let mut dropped = 0;
        for (line, raw) in table.rows.iter().enumerate() {
            let mut row = Row::new();
            let mut complete = true;
            for (index, spec) in &indexes {
                let cell = raw.get(*index).map(|c| c.trim()).unwrap_or("");
                if is_missing(cell) {
                    complete = false;
                    continue;
                }
                let value = match spec.kind {
                    ColumnKind::Number => Value::Number(cell.parse::<f64>().map_err(|_| {
                        ZenithError::Parse(format!(
                            "{}: line {}, column {}: '{}' is not a number",
                            path.display(),
                            line + 2,
                            spec.name,
                            cell
                        ))
                    })?),
                    ColumnKind::Text => Value::Text(cell.to_string()),
                };
                row.insert(spec.name.clone(), value);
            }
            if complete {
                rows.push(row);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!("⚠️ Dropped {} incomplete rows from {}", dropped, path.display());
        }

        self.source.set_file(path);
        self.rows = rows;
        self.loaded = true;
        self.update();

        info!("✅ Loaded {} rows into {}", self.rows.len(), self.entity.name);
        Ok(())
    }

    /// Load again from the current data file
    pub fn reload(&mut self) -> Result<()> {
        let path = self
            .source
            .file_path
            .clone()
            .ok_or_else(|| ZenithError::NotFound(format!("data file of {}", self.entity.name)))?;
        self.load(&path)
    }

    pub fn metadata(&self) -> Metadata {
        self.source.extend_metadata(self.entity.metadata(), self.size())
    }

    /// Apply attributes (identity, descriptors, `File_Data`) and optionally load the data file
    pub fn set(&mut self, values: &Metadata, load_data: bool) -> Result<()> {
        self.entity.set(values)?;
        self.source.set(&self.entity, values);
        if load_data {
            self.reload()?;
        }
        self.update();
        Ok(())
    }

    /// Read an attribute bootstrap file and apply it with [`Table::set`]
    pub fn boot(&mut self, path: &Path, load_data: bool) -> Result<()> {
        let values = Entity::read_boot_table(path)?;
        self.entity.set_from_boot(&values, path)?;
        self.set(&values, load_data)
    }

    /// Refresh derived attributes after data or paths change
    pub fn update(&mut self) {
        self.source.update_folder();
    }

    fn write_rows(&self, f: &mut fmt::Formatter<'_>, rows: &[Row]) -> fmt::Result {
        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| row.get(&c.name).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            writeln!(f, "{}", cells.join(";"))?;
        }
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{} ({})]", self.entity.name, self.entity.alias)?;
        write!(f, "{}", self.metadata())?;
        writeln!(f, "Data:")?;
        if !self.loaded {
            return writeln!(f, "None");
        }
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(f, "{}", names.join(";"))?;
        if self.rows.len() <= 10 {
            self.write_rows(f, &self.rows)
        } else {
            self.write_rows(f, &self.rows[..5])?;
            writeln!(f, " ... ")?;
            self.write_rows(f, &self.rows[self.rows.len() - 5..])
        }
    }
}
