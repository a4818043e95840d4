use crate::{Error, Result};
use crate::catalog::Catalog;
use crate::naming::{ColumnSpec, TableKey};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ForeignKeyLinkerStats {
    pub targets: usize,
    pub tables_created: usize,
    pub columns_created: usize,
}

impl fmt::Display for ForeignKeyLinkerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Foreign Key Linker Stats:")?;
        writeln!(f, "  Targets: {}", self.targets)?;
        writeln!(f, "  Placeholder tables: {}", self.tables_created)?;
        writeln!(f, "  Placeholder columns: {}", self.columns_created)
    }
}

/// Makes every foreign-key target of a table dereferenceable within its
/// catalog, creating placeholder tables and columns as needed.
pub struct ForeignKeyLinker<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> ForeignKeyLinker<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        Self { catalog }
    }

    /// Link the targets of every foreign key on one table
    pub fn link_table(&mut self, key: &TableKey) -> Result<ForeignKeyLinkerStats> {
        let targets: Vec<String> = self
            .catalog
            .table(key)
            .ok_or_else(|| Error::TableNotFound(key.qualified()))?
            .foreign_keys()
            .filter_map(|c| c.as_foreign_key())
            .flat_map(|fk| fk.targets().map(str::to_string))
            .collect();

        let mut stats = ForeignKeyLinkerStats::default();
        for target in targets {
            let spec = ColumnSpec::parse(&target)?;
            self.link_target(&spec, &mut stats);
        }
        Ok(stats)
    }

    /// Link every table in the catalog
    pub fn link_all(&mut self) -> Result<ForeignKeyLinkerStats> {
        let keys: Vec<TableKey> = self.catalog.tables().map(|t| t.key()).collect();
        let mut total = ForeignKeyLinkerStats::default();
        for key in keys {
            let stats = self.link_table(&key)?;
            total.targets += stats.targets;
            total.tables_created += stats.tables_created;
            total.columns_created += stats.columns_created;
        }
        Ok(total)
    }

    /// Get-or-create the table and column a target names
    pub fn link_target(&mut self, spec: &ColumnSpec, stats: &mut ForeignKeyLinkerStats) {
        stats.targets += 1;

        let (table, table_created) = self.catalog.ensure_table(&spec.table);
        if table_created {
            stats.tables_created += 1;
        }
        if table.ensure_column(&spec.column) {
            tracing::debug!("Creating placeholder column {}", spec);
            stats.columns_created += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, ColumnType};
    use crate::constraint::{Constraint, ForeignKey};

    fn catalog_with_fk(targets: &[&str]) -> (Catalog, TableKey) {
        let mut catalog = Catalog::default();
        let key = TableKey::new("orders", None);
        let locals: Vec<String> = (0..targets.len()).map(|i| format!("c{}", i)).collect();
        {
            let table = catalog.define_table(key.clone());
            for local in &locals {
                table.append_column(Column::new(local.as_str(), ColumnType::Integer));
            }
        }
        let fk = ForeignKey::new(locals.iter().map(String::as_str), targets.iter().copied()).unwrap();
        catalog
            .attach_constraint(&key, Constraint::foreign_key(Some("fk"), fk))
            .unwrap();
        (catalog, key)
    }

    #[test]
    fn test_link_creates_placeholders() {
        let (mut catalog, key) = catalog_with_fk(&["sales.customers.id"]);
        let stats = ForeignKeyLinker::new(&mut catalog).link_table(&key).unwrap();

        assert_eq!(stats.tables_created, 1);
        assert_eq!(stats.columns_created, 1);
        let customers = catalog.table_by_name("sales.customers").unwrap();
        assert!(customers.is_placeholder());
        assert_eq!(customers.schema.as_deref(), Some("sales"));
        assert!(customers.column("id").unwrap().data_type.is_untyped());
    }

    #[test]
    fn test_link_is_idempotent() {
        let (mut catalog, key) = catalog_with_fk(&["customers.id", "customers.id"]);
        let mut linker = ForeignKeyLinker::new(&mut catalog);
        let first = linker.link_table(&key).unwrap();
        let second = linker.link_table(&key).unwrap();

        assert_eq!(first.targets, 2);
        assert_eq!(first.tables_created, 1);
        assert_eq!(first.columns_created, 1);
        assert_eq!(second.tables_created, 0);
        assert_eq!(second.columns_created, 0);

        let customers = catalog.table_by_name("customers").unwrap();
        assert_eq!(customers.columns().len(), 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_link_reuses_existing_table() {
        let (mut catalog, key) = catalog_with_fk(&["customers.email"]);
        catalog
            .define_table(TableKey::new("customers", None))
            .append_column(Column::new("id", ColumnType::Integer));

        let stats = ForeignKeyLinker::new(&mut catalog).link_table(&key).unwrap();
        assert_eq!(stats.tables_created, 0);
        assert_eq!(stats.columns_created, 1);

        let customers = catalog.table_by_name("customers").unwrap();
        assert!(!customers.is_placeholder());
        assert_eq!(customers.column_names(), vec!["id", "email"]);
        assert_eq!(customers.column("id").unwrap().data_type, ColumnType::Integer);
    }

    #[test]
    fn test_link_all() {
        let (mut catalog, _) = catalog_with_fk(&["a.x", "b.y"]);
        let stats = ForeignKeyLinker::new(&mut catalog).link_all().unwrap();
        assert_eq!(stats.tables_created, 2);
        assert!(stats.to_string().contains("Placeholder tables: 2"));
    }
}
