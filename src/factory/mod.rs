//! Schema object factory
//!
//! Builds tables, constraints and indexes from flat arguments. Every
//! operation allocates a fresh catalog, attaches what it builds, makes all
//! foreign-key targets resolvable inside that catalog and returns the
//! produced element together with its catalog.
//!
//! Build order within one call is always: catalog → table → elements →
//! foreign-key linking.

pub mod generic;

use crate::built::Built;
use crate::catalog::Catalog;
use crate::column::{Column, ColumnType};
use crate::config::MigrationContext;
use crate::constraint::{Constraint, ForeignKey};
use crate::index::{Index, IndexElement, IndexTarget};
use crate::linker::ForeignKeyLinker;
use crate::naming::{ColumnSpec, TableKey, dedup_names};
use crate::table::{AttachStats, Table};
use crate::{DialectOptions, Result};

/// Table name used for indexes built without one
pub const NO_TABLE: &str = "no_table";

/// Anchor column given to tables built for a check constraint
const CHECK_ANCHOR_COLUMN: &str = "x";

/// An element passed into [`SchemaObjects::table`].
#[derive(Debug, Clone)]
pub enum SchemaItem {
    Column(Column),
    Constraint(Constraint),
    Index(Index),
}

impl From<Column> for SchemaItem {
    fn from(column: Column) -> Self {
        SchemaItem::Column(column)
    }
}

impl From<Constraint> for SchemaItem {
    fn from(constraint: Constraint) -> Self {
        SchemaItem::Constraint(constraint)
    }
}

impl From<Index> for SchemaItem {
    fn from(index: Index) -> Self {
        SchemaItem::Index(index)
    }
}

enum TableElement {
    Constraint(Constraint),
    Index(Index),
}

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub schema: Option<String>,
    /// Dialect-specific table options, passed through untouched
    pub options: DialectOptions,
}

impl TableOptions {
    pub fn in_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::default()
        }
    }
}

/// Arguments of [`SchemaObjects::foreign_key`].
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyArgs<'a> {
    pub name: Option<&'a str>,
    pub source: &'a str,
    pub referent: &'a str,
    pub local_columns: &'a [&'a str],
    pub remote_columns: &'a [&'a str],
    pub onupdate: Option<&'a str>,
    pub ondelete: Option<&'a str>,
    pub deferrable: Option<bool>,
    pub source_schema: Option<&'a str>,
    pub referent_schema: Option<&'a str>,
    pub initially: Option<&'a str>,
    pub match_type: Option<&'a str>,
    pub options: DialectOptions,
}

impl<'a> ForeignKeyArgs<'a> {
    pub fn new(
        name: Option<&'a str>,
        source: &'a str,
        referent: &'a str,
        local_columns: &'a [&'a str],
        remote_columns: &'a [&'a str],
    ) -> Self {
        Self {
            name,
            source,
            referent,
            local_columns,
            remote_columns,
            ..Self::default()
        }
    }
}

/// Factory for schema elements.
///
/// Holds only an optional reference to the migration context; the naming
/// convention is read from it each time a catalog is created.
#[derive(Clone, Copy, Default)]
pub struct SchemaObjects<'a> {
    context: Option<&'a dyn MigrationContext>,
}

impl<'a> SchemaObjects<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: &'a dyn MigrationContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// Create a fresh catalog carrying the context's current naming
    /// convention, if any.
    pub fn new_catalog(&self) -> Catalog {
        Catalog::new(self.context.and_then(|ctx| ctx.naming_convention()))
    }

    /// An unattached column
    pub fn column(&self, name: &str, data_type: ColumnType) -> Column {
        Column::new(name, data_type)
    }

    /// Build a table from columns, constraints and indexes.
    ///
    /// Columns are attached first, in order, then constraints and indexes.
    /// Elements already owned by another table are copied; unowned elements
    /// are adopted. Every foreign key is then linked so its target exists
    /// in the returned catalog.
    pub fn table<I>(&self, name: &str, items: I, options: TableOptions) -> Result<Built<Table>>
    where
        I: IntoIterator<Item = SchemaItem>,
    {
        let mut catalog = self.new_catalog();
        let key = TableKey::new(name, options.schema.as_deref());
        let mut stats = AttachStats::default();

        let mut elements = Vec::new();
        {
            let table = catalog.define_table(key.clone());
            table.options.extend(options.options);
            for item in items {
                match item {
                    SchemaItem::Column(column) => stats.record(table.append_column(column)),
                    SchemaItem::Constraint(constraint) => elements.push(TableElement::Constraint(constraint)),
                    SchemaItem::Index(index) => elements.push(TableElement::Index(index)),
                }
            }
        }

        for element in elements {
            let (_, attachment) = match element {
                TableElement::Constraint(constraint) => catalog.attach_constraint(&key, constraint)?,
                TableElement::Index(index) => catalog.attach_index(&key, index)?,
            };
            stats.record(attachment);
        }

        let linked = ForeignKeyLinker::new(&mut catalog).link_table(&key)?;
        tracing::debug!(
            "Built table {} ({}; {} placeholder table(s), {} placeholder column(s))",
            key,
            stats,
            linked.tables_created,
            linked.columns_created
        );
        Ok(Built::new(catalog, key, 0, stats))
    }

    /// Build a primary key over untyped placeholder columns
    pub fn primary_key(
        &self,
        name: Option<&str>,
        table_name: &str,
        columns: &[&str],
        schema: Option<&str>,
    ) -> Result<Built<Constraint>> {
        let mut catalog = self.new_catalog();
        let key = TableKey::new(table_name, schema);
        define_with_columns(&mut catalog, &key, columns.iter().map(|c| Column::placeholder(*c)));

        let constraint = Constraint::primary_key(name, columns.iter().copied());
        finish_constraint(catalog, key, constraint)
    }

    /// Build a foreign key between a source table and a referent table.
    ///
    /// When source and referent are the same table, local and remote
    /// columns share that one table. Otherwise the referent is a
    /// placeholder table holding the remote columns.
    pub fn foreign_key(&self, args: ForeignKeyArgs<'_>) -> Result<Built<Constraint>> {
        let source_key = TableKey::new(args.source, args.source_schema);
        let referent_key = TableKey::new(args.referent, args.referent_schema);

        let targets = args
            .remote_columns
            .iter()
            .map(|c| ColumnSpec::new(referent_key.clone(), *c).to_spec_string());
        let foreign_key = ForeignKey::new(args.local_columns.iter().copied(), targets)?
            .with_onupdate(args.onupdate)
            .with_ondelete(args.ondelete)
            .with_match(args.match_type);

        let mut catalog = self.new_catalog();
        let source_columns = if source_key == referent_key {
            dedup_names(args.local_columns.iter().chain(args.remote_columns).copied())
        } else {
            let (referent, _) = catalog.ensure_table(&referent_key);
            for column in args.remote_columns {
                referent.ensure_column(column);
            }
            dedup_names(args.local_columns.iter().copied())
        };
        define_with_columns(&mut catalog, &source_key, source_columns.into_iter().map(Column::placeholder));

        let constraint = Constraint::foreign_key(args.name, foreign_key)
            .with_deferrable(args.deferrable)
            .with_initially(args.initially)
            .with_options(args.options);
        finish_constraint(catalog, source_key, constraint)
    }

    pub fn unique_constraint(
        &self,
        name: Option<&str>,
        source: &str,
        local_columns: &[&str],
        schema: Option<&str>,
        options: DialectOptions,
    ) -> Result<Built<Constraint>> {
        let mut catalog = self.new_catalog();
        let key = TableKey::new(source, schema);
        define_with_columns(&mut catalog, &key, local_columns.iter().map(|c| Column::placeholder(*c)));

        let constraint = Constraint::unique(name, local_columns.iter().copied()).with_options(options);
        finish_constraint(catalog, key, constraint)
    }

    /// Build a check constraint. The condition is kept as opaque text.
    pub fn check_constraint(
        &self,
        name: Option<&str>,
        source: &str,
        condition: &str,
        schema: Option<&str>,
        options: DialectOptions,
    ) -> Result<Built<Constraint>> {
        let mut catalog = self.new_catalog();
        let key = TableKey::new(source, schema);
        define_with_columns(
            &mut catalog,
            &key,
            [Column::new(CHECK_ANCHOR_COLUMN, ColumnType::Integer)],
        );

        let constraint = Constraint::check(name, condition).with_options(options);
        finish_constraint(catalog, key, constraint)
    }

    /// Build a constraint whose kind is given as a tag: `"foreignkey"`,
    /// `"primary"`, `"unique"`, `"check"`, or `None` for a bare constraint.
    pub fn generic_constraint(
        &self,
        name: Option<&str>,
        table_name: &str,
        kind: Option<&str>,
        schema: Option<&str>,
        options: DialectOptions,
    ) -> Result<Built<Constraint>> {
        let table_options = TableOptions {
            schema: schema.map(str::to_string),
            ..TableOptions::default()
        };
        let table = self.table(table_name, std::iter::empty(), table_options)?;
        let constructor = generic::constructor(kind)?;

        let key = table.table_key().clone();
        let constraint = constructor(name).with_options(options);
        finish_constraint(table.into_catalog(), key, constraint)
    }

    /// Build an index.
    ///
    /// An empty table name falls back to [`NO_TABLE`]. Name targets that the
    /// table lacks are added as untyped placeholder columns; expressions are
    /// bound to the table as text. A boolean `"unique"` entry in `options`
    /// is taken out and sets the index's unique flag; any other value under
    /// that key is passed through like every other option.
    pub fn index<I>(
        &self,
        name: Option<&str>,
        table_name: &str,
        columns: I,
        schema: Option<&str>,
        mut options: DialectOptions,
    ) -> Result<Built<Index>>
    where
        I: IntoIterator,
        I::Item: Into<IndexTarget>,
    {
        let table_name = if table_name.is_empty() { NO_TABLE } else { table_name };
        let key = TableKey::new(table_name, schema);
        let mut catalog = self.new_catalog();

        let (table, _) = catalog.ensure_table(&key);
        let elements: Vec<IndexElement> = columns
            .into_iter()
            .map(|target| match target.into() {
                IndexTarget::Name(column) => {
                    table.ensure_column(&column);
                    IndexElement::Column(column)
                }
                IndexTarget::Expression(text) => IndexElement::Expression(text),
            })
            .collect();

        let unique = match options.remove("unique") {
            Some(serde_json::Value::Bool(flag)) => flag,
            Some(other) => {
                options.insert("unique".to_string(), other);
                false
            }
            None => false,
        };
        let index = Index::new(name, elements).with_unique(unique).with_options(options);

        let (slot, attachment) = catalog.attach_index(&key, index)?;
        let mut stats = AttachStats::default();
        stats.record(attachment);
        Ok(Built::new(catalog, key, slot, stats))
    }
}

fn define_with_columns(catalog: &mut Catalog, key: &TableKey, columns: impl IntoIterator<Item = Column>) {
    let table = catalog.define_table(key.clone());
    for column in columns {
        table.append_column(column);
    }
}

/// Attach the produced constraint, link foreign keys and hand back the
/// catalog.
fn finish_constraint(mut catalog: Catalog, key: TableKey, constraint: Constraint) -> Result<Built<Constraint>> {
    let (slot, attachment) = catalog.attach_constraint(&key, constraint)?;
    ForeignKeyLinker::new(&mut catalog).link_table(&key)?;

    let mut stats = AttachStats::default();
    stats.record(attachment);
    Ok(Built::new(catalog, key, slot, stats))
}
