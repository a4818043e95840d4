//! Column types and column definitions
//!
//! A column belongs to at most one table at a time. The owning table is
//! recorded as a back-reference; attaching an owned column to another table
//! attaches a detached copy instead.

use crate::DialectOptions;
use crate::naming::TableKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Column data types known to the builder.
///
/// Types are carried for downstream tooling only; nothing here checks
/// compatibility between referencing and referenced columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// No type information - the marker used for placeholder columns
    Untyped,
    Integer,
    BigInteger,
    Boolean,
    Float,
    Text,
    Timestamp,
    /// Any other type, kept verbatim
    Custom(String),
}

impl ColumnType {
    /// Get the string representation of the column type
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Untyped => "untyped",
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "biginteger",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Custom(name) => name,
        }
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, ColumnType::Untyped)
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "untyped" | "null" | "" => ColumnType::Untyped,
            "integer" | "int" | "int4" => ColumnType::Integer,
            "biginteger" | "bigint" | "int8" => ColumnType::BigInteger,
            "boolean" | "bool" => ColumnType::Boolean,
            "float" | "double" | "real" => ColumnType::Float,
            "text" | "string" | "varchar" => ColumnType::Text,
            "timestamp" | "datetime" => ColumnType::Timestamp,
            _ => ColumnType::Custom(s.to_string()),
        })
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    pub data_type: ColumnType,
    pub nullable: bool,
    /// Set when the column is covered by its table's primary key
    pub primary_key: bool,
    /// Dialect-specific options, passed through untouched
    #[serde(default)]
    pub options: DialectOptions,
    /// Owning table, if attached
    #[serde(default)]
    pub(crate) table: Option<TableKey>,
}

impl Column {
    /// Create a new, unattached column
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            options: DialectOptions::new(),
            table: None,
        }
    }

    /// An untyped stand-in column, used when only the name is known
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Untyped)
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// The table this column is attached to
    pub fn table(&self) -> Option<&TableKey> {
        self.table.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.table.is_some()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data_type.is_untyped()
    }

    /// Deep copy without the owner back-reference.
    ///
    /// Primary-key membership belongs to the old table's constraint, so it
    /// is not carried over either.
    pub fn detached_copy(&self) -> Self {
        Self {
            table: None,
            primary_key: false,
            ..self.clone()
        }
    }
}
