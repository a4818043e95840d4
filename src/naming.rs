//! Qualified names - identity of tables and foreign-key targets
//!
//! Format: `[<schema>.]<table>` for tables, `[<schema>.]<table>.<column>`
//! for column specs.
//!
//! Schema qualifiers may themselves contain dots, so only the final segment
//! is ever split off:
//! - `orders` → schema none, table `orders`
//! - `sales.orders` → schema `sales`, table `orders`
//! - `db.sales.orders` → schema `db.sales`, table `orders`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Split a possibly schema-qualified name into `(schema, name)`.
///
/// Everything before the last dot is the schema; a name without a dot has
/// no schema.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((schema, table)) => (Some(schema), table),
        None => (None, name),
    }
}

/// Treat empty names as absent.
pub(crate) fn normalize_name(name: Option<&str>) -> Option<String> {
    name.filter(|n| !n.is_empty()).map(str::to_string)
}

/// Drop repeated names, keeping the first position of each.
pub(crate) fn dedup_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for name in names {
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Key of a table inside a catalog.
///
/// Serializes as its qualified string, so it can be used as a map key in
/// JSON dumps of a catalog. Keys compare, hash and order by that string:
/// a table named `a.b` without a schema and table `b` in schema `a` are the
/// same key.
#[derive(Debug, Clone)]
pub struct TableKey {
    /// Schema qualifier, if any
    pub schema: Option<String>,
    /// Table name
    pub name: String,
}

impl TableKey {
    /// Create a key from a bare table name and an optional schema.
    ///
    /// An empty schema is treated as no schema.
    pub fn new(name: impl Into<String>, schema: Option<&str>) -> Self {
        Self {
            schema: normalize_name(schema),
            name: name.into(),
        }
    }

    /// Parse a qualified `schema.table` string
    pub fn parse(qualified: &str) -> Self {
        let (schema, name) = split_qualified(qualified);
        Self::new(name, schema)
    }

    /// Qualified string form
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        self.qualified() == other.qualified()
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified().hash(state);
    }
}

impl PartialOrd for TableKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TableKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.qualified().cmp(&other.qualified())
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

impl FromStr for TableKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::parse(s))
    }
}

impl Serialize for TableKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.qualified())
    }
}

impl<'de> Deserialize<'de> for TableKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TableKey::parse(&s))
    }
}

/// A `[schema.]table.column` reference, as carried by a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSpec {
    pub table: TableKey,
    pub column: String,
}

impl ColumnSpec {
    pub fn new(table: TableKey, column: impl Into<String>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }

    /// Parse a column spec string.
    ///
    /// The last segment is the column; the rest is parsed as a table key.
    /// Both parts must be non-empty.
    pub fn parse(spec: &str) -> Result<Self> {
        let (table_key, column) = spec
            .rsplit_once('.')
            .filter(|(table, column)| !table.is_empty() && !column.is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "foreign key target '{}' must be of the form [schema.]table.column",
                    spec
                ))
            })?;
        Ok(Self::new(TableKey::parse(table_key), column))
    }

    pub fn to_spec_string(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_spec_string())
    }
}

impl FromStr for ColumnSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
