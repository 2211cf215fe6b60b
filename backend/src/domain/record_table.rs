//! # Record Table (Ledger)
//!
//! Append-only store of uniquely identified, timestamped records with an
//! active/archived status.
//!
//! ## Column Model
//!
//! ```text
//! RecId;RecTable;RecTimestamp;RecStatus | main... | extra... | files...
//! └──────── ledger managed ───────────┘ └──── declared by the schema ────┘
//! ```
//!
//! Every record carries every declared column; absent values are "".
//!
//! ## Invariants
//!
//! - ids are unique and their numeric part strictly increases with each insert
//! - archiving flips `RecStatus` to `Off`; nothing is physically deleted
//! - records stay in insertion order
//!
//! ## Operators
//!
//! A ledger may declare operator columns: pure functions from the current
//! records to one value per record. [`Ledger::refresh`] recomputes them.

use log::{debug, info, warn};
use shared::{
    Fields, Metadata, Record, RecordStatus, BASE_COLUMNS, REC_ID, REC_STATUS, REC_TABLE,
    REC_TIMESTAMP,
};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::LedgerConfig;
use crate::domain::dataset::DataSource;
use crate::domain::entity::Entity;
use crate::domain::running_time::timestamp_now;
use crate::error::{Result, ZenithError};
use crate::storage::{CsvStorage, DelimitedTable};

/// Key column of single-record files
pub const FIELD_FIELD: &str = "Field";
/// Value column of single-record files
pub const RECORD_VALUE_FIELD: &str = "Value";

/// Data columns declared by a ledger, grouped the way they are laid out in files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSchema {
    pub main: Vec<String>,
    pub extra: Vec<String>,
    pub files: Vec<String>,
}

impl Default for LedgerSchema {
    fn default() -> Self {
        Self::new(["Kind", "Value"], ["Category"], ["File_NF", "File_Invoice"])
    }
}

impl LedgerSchema {
    pub fn new<S: Into<String>>(
        main: impl IntoIterator<Item = S>,
        extra: impl IntoIterator<Item = S>,
        files: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            main: main.into_iter().map(Into::into).collect(),
            extra: extra.into_iter().map(Into::into).collect(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// main + extra + files
    pub fn data_columns(&self) -> Vec<&str> {
        self.main
            .iter()
            .chain(&self.extra)
            .chain(&self.files)
            .map(String::as_str)
            .collect()
    }

    /// Base columns followed by the data columns
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = BASE_COLUMNS.to_vec();
        columns.extend(self.data_columns());
        columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.data_columns().contains(&column)
    }

    /// Keep only the declared data columns of `fields`
    pub fn filter(&self, fields: &Fields) -> Fields {
        fields
            .iter()
            .filter(|(k, _)| self.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Keys of `fields` that are not declared data columns
    pub fn unknown_keys(&self, fields: &Fields) -> Vec<String> {
        fields
            .keys()
            .filter(|k| !self.contains(k))
            .cloned()
            .collect()
    }

    /// `fields` restricted to the data columns, every column present
    fn normalize(&self, fields: &Fields) -> Fields {
        self.data_columns()
            .into_iter()
            .map(|c| (c.to_string(), fields.get(c).cloned().unwrap_or_default()))
            .collect()
    }
}

/// Pure function computing one value per record
pub type OperatorFn = fn(&[Record]) -> Vec<String>;

/// A derived column and the function that computes it
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    pub column: &'static str,
    pub func: OperatorFn,
}

/// Append-only record store
#[derive(Debug, Clone)]
pub struct Ledger {
    pub entity: Entity,
    pub source: DataSource,
    schema: LedgerSchema,
    config: LedgerConfig,
    operators: Vec<Operator>,
    records: Vec<Record>,
    has_data: bool,
    /// Largest id number ever held, so ids freed by an edit are not reissued
    last_issued: u64,
}

impl Ledger {
    /// Empty ledger with the default schema and configuration
    pub fn new(name: &str, alias: Option<&str>) -> Self {
        Self::with_schema(name, alias, LedgerSchema::default())
    }

    pub fn with_schema(name: &str, alias: Option<&str>, schema: LedgerSchema) -> Self {
        Self {
            entity: Entity::new(name, alias),
            source: DataSource::default(),
            schema,
            config: LedgerConfig::default(),
            operators: Vec::new(),
            records: Vec::new(),
            has_data: false,
            last_issued: 0,
        }
    }

    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare an operator column, recomputed on [`Ledger::refresh`]
    pub fn with_operator(mut self, column: &'static str, func: OperatorFn) -> Self {
        self.operators.retain(|op| op.column != column);
        self.operators.push(Operator { column, func });
        self
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Records with `RecStatus == On`
    pub fn active_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_active())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether data was ever loaded or inserted
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Row count, `None` before any data
    pub fn size(&self) -> Option<usize> {
        self.has_data.then_some(self.records.len())
    }

    fn storage(&self) -> CsvStorage {
        self.config.storage()
    }

    fn timestamp(&self) -> String {
        timestamp_now(&self.config.timestamp_format)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ZenithError::missing_record(id))
    }

    /// Largest numeric id suffix in use, 0 when empty
    fn last_id_number(&self) -> u64 {
        self.records
            .iter()
            .filter_map(|r| r.id_number(&self.config.id_prefix))
            .max()
            .unwrap_or(0)
    }

    fn id_high_water(&self) -> u64 {
        self.last_id_number().max(self.last_issued)
    }

    /// Id the next insert will receive
    pub fn next_id(&self) -> String {
        self.config.format_id(self.id_high_water() + 1)
    }

    /// Merge a delimited file into the ledger
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.load_with(path, true)
    }

    /// Replace the ledger contents with a delimited file
    pub fn reload(&mut self, path: &Path) -> Result<()> {
        self.load_with(path, false)
    }

    fn load_with(&mut self, path: &Path, append: bool) -> Result<()> {
        let table = self.storage().read_table(path)?;
        let added = self.set_data(&table, append)?;
        self.source.set_file(path);
        self.update();
        info!(
            "✅ Loaded {} records from {} into {}",
            added,
            path.display(),
            self.entity.name
        );
        Ok(())
    }

    /// Set ledger data from raw delimited rows.
    ///
    /// Rows without an id get one numbered above every id already issued and
    /// every explicit id of the incoming rows. Within the incoming rows the
    /// first occurrence of an id wins; when appending, incoming ids already
    /// present in the ledger are skipped. Returns the number of records taken.
    pub fn set_data(&mut self, table: &DelimitedTable, append: bool) -> Result<usize> {
        let has_id = table.has_column(REC_ID);
        let now = self.timestamp();

        let prefix = self.config.id_prefix.as_str();
        let incoming_max = table
            .rows
            .iter()
            .filter_map(|row| table.cell(row, REC_ID))
            .filter_map(|id| id.trim().strip_prefix(prefix)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let mut next_number = self.id_high_water().max(incoming_max) + 1;

        let existing: HashSet<&str> = if append {
            self.records.iter().map(|r| r.id.as_str()).collect()
        } else {
            HashSet::new()
        };
        let mut seen = HashSet::new();
        let mut incoming = Vec::with_capacity(table.len());
        let mut duplicates = 0;

        for row in &table.rows {
            let given_id = if has_id {
                table.cell(row, REC_ID).map(str::trim).unwrap_or("")
            } else {
                ""
            };
            let id = if given_id.is_empty() {
                let id = self.config.format_id(next_number);
                next_number += 1;
                id
            } else {
                given_id.to_string()
            };

            if existing.contains(id.as_str()) || !seen.insert(id.clone()) {
                duplicates += 1;
                continue;
            }

            let timestamp = table
                .cell(row, REC_TIMESTAMP)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| now.clone());

            let status = match table.cell(row, REC_STATUS).map(str::trim) {
                Some(s) if !s.is_empty() => {
                    RecordStatus::from_string(s).map_err(ZenithError::Parse)?
                }
                _ => RecordStatus::On,
            };

            let fields = self
                .schema
                .data_columns()
                .into_iter()
                .map(|c| {
                    let value = table.cell(row, c).unwrap_or("").to_string();
                    (c.to_string(), value)
                })
                .collect();

            incoming.push(Record {
                id,
                table: self.entity.name.clone(),
                timestamp,
                status,
                fields,
            });
        }

        if duplicates > 0 {
            warn!("⚠️ Skipped {} records with duplicate ids", duplicates);
        }

        let added = incoming.len();
        if append {
            self.records.extend(incoming);
        } else {
            self.records = incoming;
        }
        self.has_data = true;
        self.last_issued = self.id_high_water();
        Ok(added)
    }

    /// Insert a record, dropping keys outside the schema. Returns the new id.
    pub fn insert(&mut self, fields: &Fields) -> Result<String> {
        let number = self.id_high_water() + 1;
        let id = self.config.format_id(number);
        if self.records.iter().any(|r| r.id == id) {
            return Err(ZenithError::Integrity(format!("id {} already in use", id)));
        }

        let record = Record {
            id: id.clone(),
            table: self.entity.name.clone(),
            timestamp: self.timestamp(),
            status: RecordStatus::On,
            fields: self.schema.normalize(fields),
        };
        self.records.push(record);
        self.has_data = true;
        self.last_issued = number;
        self.update();

        debug!("Inserted {} into {}", id, self.entity.name);
        Ok(id)
    }

    /// Insert a record, failing if any key is outside the schema
    pub fn insert_strict(&mut self, fields: &Fields) -> Result<String> {
        let unknown = self.schema.unknown_keys(fields);
        if !unknown.is_empty() {
            return Err(ZenithError::SchemaMismatch(unknown));
        }
        self.insert(fields)
    }

    /// Overwrite the given fields of a record and stamp a fresh timestamp.
    ///
    /// With `filter`, keys outside the data columns are ignored. Without it,
    /// `RecId`, `RecTable` and `RecStatus` may be overwritten too.
    pub fn edit(&mut self, id: &str, fields: &Fields, filter: bool) -> Result<()> {
        let index = self.position(id)?;
        let updates = if filter {
            self.schema.filter(fields)
        } else {
            fields.clone()
        };

        // Validate before touching the record
        let status = match updates.get(REC_STATUS) {
            Some(s) => Some(RecordStatus::from_string(s).map_err(ZenithError::Parse)?),
            None => None,
        };
        if let Some(new_id) = updates.get(REC_ID) {
            if new_id != id && self.records.iter().any(|r| &r.id == new_id) {
                return Err(ZenithError::Integrity(format!("id {} already in use", new_id)));
            }
        }

        let timestamp = self.timestamp();
        let record = &mut self.records[index];
        for (key, value) in updates {
            match key.as_str() {
                REC_ID => record.id = value,
                REC_TABLE => record.table = value,
                REC_STATUS | REC_TIMESTAMP => {}
                _ => {
                    record.fields.insert(key, value);
                }
            }
        }
        if let Some(status) = status {
            record.status = status;
        }
        record.timestamp = timestamp;

        debug!("Edited {} in {}", id, self.entity.name);
        Ok(())
    }

    /// Soft-delete a record: `RecStatus` becomes `Off`
    pub fn archive(&mut self, id: &str) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert(REC_STATUS.to_string(), RecordStatus::Off.to_string());
        self.edit(id, &fields, false)
    }

    pub fn get(&self, id: &str) -> Result<&Record> {
        self.position(id).map(|index| &self.records[index])
    }

    /// Vertical `(Field, Value)` listing of a record: schema columns first,
    /// then any derived columns.
    pub fn record_sheet(&self, id: &str) -> Result<Metadata> {
        let record = self.get(id)?;
        let mut sheet: Metadata = self
            .schema
            .columns()
            .into_iter()
            .map(|c| (c, record.cell(c)))
            .collect();
        for (key, value) in &record.fields {
            if !sheet.contains_key(key) {
                sheet.insert(key.as_str(), value.as_str());
            }
        }
        Ok(sheet)
    }

    /// The schema-ordered table as written by [`Ledger::export`]
    pub fn to_table(&self, filter_archived: bool) -> DelimitedTable {
        let columns = self.schema.columns();
        let mut table = DelimitedTable::new(columns.iter().copied());
        for record in &self.records {
            if filter_archived && !record.is_active() {
                continue;
            }
            table.push_row(columns.iter().map(|c| record.cell(c)));
        }
        table
    }

    fn export_folder(&self, folder: Option<&Path>) -> Result<PathBuf> {
        folder
            .map(Path::to_path_buf)
            .or_else(|| self.source.folder.clone())
            .ok_or_else(|| {
                ZenithError::NotFound(format!("export folder of {}", self.entity.name))
            })
    }

    /// Write the ledger to `<folder>/<filename>.csv`.
    ///
    /// `folder` defaults to the data folder and `filename` to the ledger
    /// name. With `filter_archived`, only active records are written.
    pub fn export(
        &self,
        folder: Option<&Path>,
        filename: Option<&str>,
        filter_archived: bool,
    ) -> Result<PathBuf> {
        if !self.has_data {
            return Err(ZenithError::NotFound(format!("data of {}", self.entity.name)));
        }
        let folder = self.export_folder(folder)?;
        let filename = filename.unwrap_or(&self.entity.name);
        let path = folder.join(format!("{}.csv", filename));

        self.storage().write_table(&path, &self.to_table(filter_archived))?;
        info!("📄 EXPORT: {} written to {}", self.entity.name, path.display());
        Ok(path)
    }

    /// Overwrite the sourced data file with the current records
    pub fn save(&self) -> Result<PathBuf> {
        let file = self
            .source
            .file_path
            .as_ref()
            .ok_or_else(|| ZenithError::NotFound(format!("data file of {}", self.entity.name)))?;
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.entity.name.clone());
        self.export(file.parent(), Some(&stem), false)
    }

    /// Write one record as a `Field;Value` file, named `<ledger>_<id>` by default
    pub fn export_record(
        &self,
        id: &str,
        folder: Option<&Path>,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let sheet = self.record_sheet(id)?;
        let folder = self.export_folder(folder)?;
        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_{}", self.entity.name, id));
        let path = folder.join(format!("{}.csv", filename));

        self.storage()
            .write_pairs(&path, FIELD_FIELD, RECORD_VALUE_FIELD, &sheet)?;
        info!("📄 EXPORT: record {} written to {}", id, path.display());
        Ok(path)
    }

    /// Read a `Field;Value` file into data fields. Nothing is inserted.
    pub fn load_record_data(&self, path: &Path) -> Result<Fields> {
        let pairs = self
            .storage()
            .read_pairs(path, FIELD_FIELD, RECORD_VALUE_FIELD)?;
        Ok(pairs
            .iter()
            .filter(|(k, _)| self.schema.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }

    /// Recompute operator columns, then [`Ledger::update`]
    pub fn refresh(&mut self) -> Result<()> {
        for operator in self.operators.clone() {
            let values = (operator.func)(&self.records);
            if values.len() != self.records.len() {
                return Err(ZenithError::Integrity(format!(
                    "operator {} returned {} values for {} records",
                    operator.column,
                    values.len(),
                    self.records.len()
                )));
            }
            for (record, value) in self.records.iter_mut().zip(values) {
                record.fields.insert(operator.column.to_string(), value);
            }
            debug!("Refreshed operator column {}", operator.column);
        }
        self.update();
        Ok(())
    }

    /// Re-derive the data folder and stamp the current name on every record
    pub fn update(&mut self) {
        self.source.update_folder();
        for record in &mut self.records {
            if record.table != self.entity.name {
                record.table = self.entity.name.clone();
            }
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.entity.name = name.to_string();
        self.update();
    }

    pub fn metadata(&self) -> Metadata {
        self.source.extend_metadata(self.entity.metadata(), self.size())
    }

    /// Apply attributes and optionally load (and refresh) the data file
    pub fn set(&mut self, values: &Metadata, load_data: bool) -> Result<()> {
        self.entity.set(values)?;
        self.source.set(&self.entity, values);
        if load_data {
            let path = self.source.file_path.clone().ok_or_else(|| {
                ZenithError::NotFound(format!("data file of {}", self.entity.name))
            })?;
            self.load(&path)?;
            self.refresh()?;
        }
        self.update();
        Ok(())
    }

    /// Read an attribute bootstrap file and apply it with [`Ledger::set`]
    pub fn boot(&mut self, path: &Path, load_data: bool) -> Result<()> {
        let values = Entity::read_boot_table(path)?;
        self.entity.set_from_boot(&values, path)?;
        self.set(&values, load_data)
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{} ({})]", self.entity.name, self.entity.alias)?;
        write!(f, "{}", self.metadata())?;
        writeln!(f, "Data:")?;
        let table = self.to_table(false);
        writeln!(f, "{}", table.headers.join(";"))?;
        for row in &table.rows {
            writeln!(f, "{}", row.join(";"))?;
        }
        Ok(())
    }
}
