//! # Zenith backend
//!
//! Record bookkeeping over flat delimited files.
//!
//! The layers build on each other:
//! ```text
//! Entity     identity (name, alias) and metadata
//!   ↓
//! Table      one dataset sourced from a delimited file
//!   ↓
//! Ledger     append-only, id-stamped, status-tracked records
//!   ↓
//! Budget     signed values, totals and grouped summaries
//! ```
//! `Collection` keeps owned copies of any of them behind a name-keyed catalog.
//!
//! Storage lives in [`storage::csv`]; everything under [`domain`] works on
//! in-memory values and only touches files through it.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use config::LedgerConfig;
pub use domain::{
    Budget, Catalogued, Collection, ColumnKind, ColumnSpec, DataSource, Entity, Frequency,
    Ledger, LedgerSchema, Operator, Table,
};
pub use error::{Result, ZenithError};
pub use storage::csv::{CsvStorage, DelimitedTable};
