//! # CSV Storage Module
//!
//! Reads and writes the semicolon-separated files that back entities,
//! tables and ledgers.
//!
//! ## File Formats
//!
//! Ledger data, one row per record:
//! ```csv
//! RecId;RecTable;RecTimestamp;RecStatus;Kind;Value;Category;File_NF;File_Invoice
//! Rec0001;Stock;2024-01-15 10:30:00;On;input;177;tools;;
//! ```
//!
//! Attribute bootstrap files and single-record exports are two-column tables:
//! ```csv
//! Attribute;Value
//! Name;Stock
//! Alias;Sk
//! ```
//!
//! All writes go to a temporary sibling file first and are moved into place.

pub mod table_file;

#[cfg(test)]
pub mod test_utils;

pub use table_file::{CsvStorage, DelimitedTable};
