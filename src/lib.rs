//! # schemaobj - Schema object construction for migration operations
//!
//! Builds free-standing schema elements (tables, columns, primary keys,
//! foreign keys, unique and check constraints, indexes) from flat
//! descriptions, the way a migration operation needs them.
//!
//! schemaobj provides:
//! - Qualified-name parsing for `schema.table` and `schema.table.column`
//! - A per-call catalog that owns every table it builds
//! - Placeholder tables and columns so foreign-key targets always resolve
//! - Copy-on-attach for elements that already belong to another table
//! - Naming conventions taken from the migration context

pub mod naming;
pub mod column;
pub mod constraint;
pub mod index;
pub mod convention;
pub mod table;
pub mod catalog;
pub mod linker;
pub mod built;
pub mod factory;
pub mod config;
pub mod logging;

use std::collections::BTreeMap;

// Re-exports for convenient access
pub use naming::{ColumnSpec, TableKey, split_qualified};
pub use column::{Column, ColumnType};
pub use constraint::{Constraint, ConstraintKind, ForeignKey};
pub use index::{Index, IndexElement, IndexTarget};
pub use convention::NamingConvention;
pub use table::{AttachStats, Table};
pub use catalog::Catalog;
pub use built::Built;
pub use factory::{ForeignKeyArgs, SchemaItem, SchemaObjects, TableOptions};
pub use config::{MigrationConfig, MigrationContext};

/// Dialect-specific options, attached to elements verbatim
pub type DialectOptions = BTreeMap<String, serde_json::Value>;

/// Result type alias for schemaobj operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schemaobj operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'kind' can be one of {valid}, got '{kind}'")]
    UnsupportedKind { kind: String, valid: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),
}
