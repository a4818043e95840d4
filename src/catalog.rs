//! Catalog - the root container of one construction call
//!
//! A catalog maps qualified table keys to tables and carries the naming
//! convention it was created with. Each top-level build allocates its own
//! catalog; nothing is shared between calls.

use std::collections::BTreeMap;
use crate::column::Column;
use crate::constraint::Constraint;
use crate::convention::NamingConvention;
use crate::index::Index;
use crate::naming::{ColumnSpec, TableKey};
use crate::table::{Attachment, Table};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Tables indexed by qualified key
    tables: BTreeMap<TableKey, Table>,
    /// Copied at creation, never changed afterwards
    naming_convention: Option<NamingConvention>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new(naming_convention: Option<NamingConvention>) -> Self {
        Self {
            tables: BTreeMap::new(),
            naming_convention,
        }
    }

    pub fn naming_convention(&self) -> Option<&NamingConvention> {
        self.naming_convention.as_ref()
    }

    /// Get a table by key
    pub fn table(&self, key: &TableKey) -> Option<&Table> {
        self.tables.get(key)
    }

    /// Get a table by qualified name (`schema.table` or `table`)
    pub fn table_by_name(&self, qualified: &str) -> Option<&Table> {
        self.table(&TableKey::parse(qualified))
    }

    pub fn contains(&self, key: &TableKey) -> bool {
        self.tables.contains_key(key)
    }

    /// All tables, ordered by key
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up the column a foreign-key target points at
    pub fn resolve(&self, spec: &ColumnSpec) -> Option<(&Table, &Column)> {
        let table = self.table(&spec.table)?;
        let column = table.column(&spec.column)?;
        Some((table, column))
    }

    /// Define a real table under `key`.
    ///
    /// An existing entry is reused; a placeholder entry becomes a real
    /// definition.
    pub fn define_table(&mut self, key: TableKey) -> &mut Table {
        let table = self
            .tables
            .entry(key.clone())
            .or_insert_with(|| Table::new(key));
        table.mark_defined();
        table
    }

    /// Get-or-create a placeholder table. Returns the table and whether it
    /// was created.
    ///
    /// Existing entries, real or placeholder, are never replaced.
    pub fn ensure_table(&mut self, key: &TableKey) -> (&mut Table, bool) {
        let created = !self.tables.contains_key(key);
        if created {
            tracing::debug!("Creating placeholder table {}", key);
        }
        let table = self
            .tables
            .entry(key.clone())
            .or_insert_with(|| Table::placeholder(key.clone()));
        (table, created)
    }

    /// Attach a constraint to a table of this catalog, applying the
    /// catalog's naming convention.
    pub fn attach_constraint(&mut self, key: &TableKey, constraint: Constraint) -> Result<(usize, Attachment)> {
        let convention = self.naming_convention.as_ref();
        let table = self
            .tables
            .get_mut(key)
            .ok_or_else(|| Error::TableNotFound(key.qualified()))?;
        table.attach_constraint(constraint, convention)
    }

    /// Attach an index to a table of this catalog
    pub fn attach_index(&mut self, key: &TableKey, index: Index) -> Result<(usize, Attachment)> {
        let convention = self.naming_convention.as_ref();
        let table = self
            .tables
            .get_mut(key)
            .ok_or_else(|| Error::TableNotFound(key.qualified()))?;
        table.attach_index(index, convention)
    }

    /// Get statistics about the catalog
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            tables: self.tables.len(),
            ..CatalogStats::default()
        };
        for table in self.tables.values() {
            if table.is_placeholder() {
                stats.placeholder_tables += 1;
            }
            stats.columns += table.columns().len();
            stats.placeholder_columns += table.columns().iter().filter(|c| c.is_placeholder()).count();
            stats.constraints += table.constraints().len();
            stats.foreign_keys += table.foreign_keys().count();
            stats.indexes += table.indexes().len();
        }
        stats
    }
}

impl std::ops::Index<&TableKey> for Catalog {
    type Output = Table;

    /// Panics if the table is not in the catalog
    fn index(&self, key: &TableKey) -> &Table {
        &self.tables[key]
    }
}

/// Statistics about a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub tables: usize,
    pub placeholder_tables: usize,
    pub columns: usize,
    pub placeholder_columns: usize,
    pub constraints: usize,
    pub foreign_keys: usize,
    pub indexes: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Tables: {} (placeholders: {})", self.tables, self.placeholder_tables)?;
        writeln!(f, "  Columns: {} (untyped: {})", self.columns, self.placeholder_columns)?;
        writeln!(f, "  Constraints: {} (foreign keys: {})", self.constraints, self.foreign_keys)?;
        writeln!(f, "  Indexes: {}", self.indexes)
    }
}
