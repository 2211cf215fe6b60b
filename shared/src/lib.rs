//! Plain data types shared by every layer of the record bookkeeping stack.
//!
//! Nothing in here touches the filesystem: these are the values that the
//! domain layer produces and the storage layer serializes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ledger-managed column holding the record identifier
pub const REC_ID: &str = "RecId";
/// Ledger-managed column holding the owning ledger name
pub const REC_TABLE: &str = "RecTable";
/// Ledger-managed column holding the creation / last edit time
pub const REC_TIMESTAMP: &str = "RecTimestamp";
/// Ledger-managed column holding the active/archived flag
pub const REC_STATUS: &str = "RecStatus";

/// Base columns, in file order. Always present in every ledger.
pub const BASE_COLUMNS: [&str; 4] = [REC_ID, REC_TABLE, REC_TIMESTAMP, REC_STATUS];

/// Format used for `RecTimestamp` values
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ledger-specific values of one record, keyed by column name
pub type Fields = BTreeMap<String, String>;

/// Status of a record: active or archived (soft-deleted)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Active record
    #[default]
    On,
    /// Archived record, still stored and exportable
    Off,
}

impl RecordStatus {
    /// Text used in delimited files
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::On => "On",
            RecordStatus::Off => "Off",
        }
    }

    /// Parse from the text stored in delimited files
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "on" => Ok(RecordStatus::On),
            "off" => Ok(RecordStatus::Off),
            _ => Err(format!("Invalid record status: {}", s)),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// `"Rec"` followed by a zero-padded sequence number
    pub id: String,
    /// Name of the owning ledger when the row was last written
    pub table: String,
    /// Creation or last edit time (`YYYY-MM-DD HH:MM:SS`)
    pub timestamp: String,
    pub status: RecordStatus,
    /// Data columns (main, extra, files) plus any derived columns
    pub fields: Fields,
}

impl Record {
    /// Value of any column, base columns included. Absent columns read as "".
    pub fn cell(&self, column: &str) -> String {
        match column {
            REC_ID => self.id.clone(),
            REC_TABLE => self.table.clone(),
            REC_TIMESTAMP => self.timestamp.clone(),
            REC_STATUS => self.status.to_string(),
            _ => self.field(column).to_string(),
        }
    }

    /// Value of a data column, "" when absent
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::On
    }

    /// Numeric part of the id, given the id prefix
    pub fn id_number(&self, prefix: &str) -> Option<u64> {
        self.id.strip_prefix(prefix)?.parse().ok()
    }

    /// The timestamp as a date-time, if it is well formed under `format`
    pub fn parsed_timestamp(&self, format: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, format).ok()
    }
}

/// Ordered attribute/value mapping describing an object.
///
/// Insertion order is kept so that metadata listings read the same way
/// every time: identity first, then whatever each layer appends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an attribute. New attributes go to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Attribute;Value")?;
        for (k, v) in self.iter() {
            writeln!(f, "{};{}", k, v)?;
        }
        Ok(())
    }
}

/// A typed cell of a generic data table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Rolling totals of a budget, Prospected and Cancelled entries excluded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub total_revenue: f64,
    /// Negative-signed sum of expenses
    pub total_expenses: f64,
    pub total_net: f64,
}

/// One line of a grouped budget summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub key: String,
    pub value: f64,
}

/// How often a single tag occurs across budget entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}
