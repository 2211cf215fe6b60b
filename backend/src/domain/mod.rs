//! Domain layer: entities, tables, ledgers, budgets and collections.
//!
//! Each layer owns the one below it and extends its metadata rather than
//! inheriting from it.

pub mod budget;
pub mod collection;
pub mod dataset;
pub mod entity;
pub mod record_table;
pub mod running_time;

pub use budget::{Budget, Frequency};
pub use collection::{Catalogued, Collection};
pub use dataset::{ColumnKind, ColumnSpec, DataSource, Table};
pub use entity::Entity;
pub use record_table::{Ledger, LedgerSchema, Operator};
