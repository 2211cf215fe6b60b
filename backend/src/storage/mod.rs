//! # Storage Module
//!
//! Flat-file persistence for the domain layer. Only delimited text files are
//! supported; there is no database and no background I/O.

pub mod csv;

pub use self::csv::{CsvStorage, DelimitedTable};
