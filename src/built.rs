//! Built elements - a produced element together with the catalog that owns it
//!
//! Every factory operation returns a `Built<T>`: the catalog it allocated
//! plus the location of the element it produced. The handle dereferences to
//! the element, and the owning table and catalog stay reachable from it, so
//! cross-references can be followed without any shared ownership.

use crate::catalog::Catalog;
use crate::constraint::Constraint;
use crate::index::Index;
use crate::naming::TableKey;
use crate::table::{AttachStats, Table};
use std::marker::PhantomData;
use std::ops::Deref;

#[derive(Debug, Clone)]
pub struct Built<T> {
    catalog: Catalog,
    table: TableKey,
    /// Position among the table's constraints or indexes
    slot: usize,
    stats: AttachStats,
    _element: PhantomData<fn() -> T>,
}

impl<T> Built<T> {
    pub(crate) fn new(catalog: Catalog, table: TableKey, slot: usize, stats: AttachStats) -> Self {
        Self {
            catalog,
            table,
            slot,
            stats,
            _element: PhantomData,
        }
    }

    /// The catalog owning the element
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// The table owning the element (the element itself for `Built<Table>`)
    pub fn table(&self) -> &Table {
        &self.catalog[&self.table]
    }

    pub fn table_key(&self) -> &TableKey {
        &self.table
    }

    /// How the inputs of this build were attached
    pub fn stats(&self) -> AttachStats {
        self.stats
    }
}

impl Built<Constraint> {
    pub fn constraint(&self) -> &Constraint {
        &self.table().constraints()[self.slot]
    }
}

impl Built<Index> {
    pub fn index(&self) -> &Index {
        &self.table().indexes()[self.slot]
    }
}

impl Deref for Built<Table> {
    type Target = Table;

    fn deref(&self) -> &Table {
        self.table()
    }
}

impl Deref for Built<Constraint> {
    type Target = Constraint;

    fn deref(&self) -> &Constraint {
        self.constraint()
    }
}

impl Deref for Built<Index> {
    type Target = Index;

    fn deref(&self) -> &Index {
        self.index()
    }
}
