//! Table containers
//!
//! A table owns its columns, constraints and indexes. Every element carries
//! a back-reference to its owner; attaching an element that already has an
//! owner attaches a detached copy, so the original owner is never modified.

use crate::column::Column;
use crate::constraint::{Constraint, ConstraintKind};
use crate::convention::{NameTokens, NamingConvention};
use crate::index::Index;
use crate::naming::TableKey;
use crate::{DialectOptions, Error, Result};
use serde::{Deserialize, Serialize};

/// How an element ended up on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// The element was unowned and was taken as-is
    Adopted,
    /// The element was owned elsewhere; a copy was attached
    Copied,
}

/// Counts of adopted and copied elements during one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachStats {
    pub adopted: usize,
    pub copied: usize,
}

impl AttachStats {
    pub fn record(&mut self, attachment: Attachment) {
        match attachment {
            Attachment::Adopted => self.adopted += 1,
            Attachment::Copied => self.copied += 1,
        }
    }
}

impl std::fmt::Display for AttachStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} adopted, {} copied", self.adopted, self.copied)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub schema: Option<String>,
    /// Ordered; position is the column's default ordinal
    columns: Vec<Column>,
    constraints: Vec<Constraint>,
    indexes: Vec<Index>,
    /// Created only to satisfy a foreign-key target
    placeholder: bool,
    #[serde(default)]
    pub options: DialectOptions,
}

impl Table {
    pub fn new(key: TableKey) -> Self {
        Self {
            name: key.name,
            schema: key.schema,
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            placeholder: false,
            options: DialectOptions::new(),
        }
    }

    pub fn placeholder(key: TableKey) -> Self {
        Self {
            placeholder: true,
            ..Self::new(key)
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub(crate) fn mark_defined(&mut self) {
        self.placeholder = false;
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_foreign_key())
    }

    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| matches!(c.kind, ConstraintKind::PrimaryKey { .. }))
    }

    /// Attach a column.
    ///
    /// A column already owned elsewhere is copied first. A column whose name
    /// is already present replaces the existing one in place, so the first
    /// position wins and the last definition wins.
    pub fn append_column(&mut self, column: Column) -> Attachment {
        let key = self.key();
        let (mut column, attachment) = match column.table() {
            Some(owner) => {
                tracing::debug!("Copying column {}.{} onto {}", owner, column.name, key);
                (column.detached_copy(), Attachment::Copied)
            }
            None => {
                tracing::trace!("Adopting column {} onto {}", column.name, key);
                (column, Attachment::Adopted)
            }
        };
        column.table = Some(key);

        match self.columns.iter().position(|c| c.name == column.name) {
            Some(pos) => {
                column.primary_key = self.columns[pos].primary_key;
                self.columns[pos] = column;
            }
            None => self.columns.push(column),
        }
        attachment
    }

    /// Get-or-create an untyped placeholder column. Returns true if created.
    pub fn ensure_column(&mut self, name: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.append_column(Column::placeholder(name));
        true
    }

    fn check_columns(&self, what: &str, columns: &[&str]) -> Result<()> {
        match columns.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(Error::Configuration(format!(
                "can't attach {} to table '{}': no column named '{}'",
                what,
                self.key(),
                missing
            ))),
            None => Ok(()),
        }
    }

    /// Attach a constraint, returning its position among the table's
    /// constraints.
    ///
    /// An owned constraint is copied and retargeted: self-referencing
    /// foreign-key targets follow the copy to this table. Every local column
    /// must already exist here. A primary key replaces any existing one in
    /// place.
    pub fn attach_constraint(
        &mut self,
        constraint: Constraint,
        convention: Option<&NamingConvention>,
    ) -> Result<(usize, Attachment)> {
        let key = self.key();
        let (mut constraint, attachment) = match constraint.table() {
            Some(owner) => {
                let owner = owner.clone();
                let mut copy = constraint.detached_copy();
                if let ConstraintKind::ForeignKey(fk) = &mut copy.kind {
                    fk.retarget_self_references(&owner, &key);
                }
                tracing::debug!(
                    "Copying {} constraint {:?} from {} onto {}",
                    copy.kind,
                    copy.name,
                    owner,
                    key
                );
                (copy, Attachment::Copied)
            }
            None => {
                tracing::trace!("Adopting {} constraint {:?} onto {}", constraint.kind, constraint.name, key);
                (constraint, Attachment::Adopted)
            }
        };

        self.check_columns(
            &format!("{} constraint", constraint.kind),
            &constraint.local_columns(),
        )?;

        if let Some(convention) = convention {
            self.apply_constraint_convention(&mut constraint, convention);
        }
        constraint.table = Some(key);

        if let ConstraintKind::PrimaryKey { columns } = &constraint.kind {
            for column in &mut self.columns {
                column.primary_key = columns.contains(&column.name);
            }
            if let Some(pos) = self
                .constraints
                .iter()
                .position(|c| matches!(c.kind, ConstraintKind::PrimaryKey { .. }))
            {
                self.constraints[pos] = constraint;
                return Ok((pos, attachment));
            }
        }

        self.constraints.push(constraint);
        Ok((self.constraints.len() - 1, attachment))
    }

    /// Attach an index, returning its position among the table's indexes.
    pub fn attach_index(
        &mut self,
        index: Index,
        convention: Option<&NamingConvention>,
    ) -> Result<(usize, Attachment)> {
        let key = self.key();
        let (mut index, attachment) = match index.table() {
            Some(owner) => {
                tracing::debug!("Copying index {:?} from {} onto {}", index.name, owner, key);
                (index.detached_copy(), Attachment::Copied)
            }
            None => {
                tracing::trace!("Adopting index {:?} onto {}", index.name, key);
                (index, Attachment::Adopted)
            }
        };

        self.check_columns("index", &index.column_names())?;

        if let Some(template) = convention.and_then(|c| c.template("ix")) {
            if !index.conventional_name {
                let tokens = NameTokens {
                    table_name: &self.name,
                    constraint_name: index.name.as_deref(),
                    columns: index.column_names(),
                    ..NameTokens::default()
                };
                if let Some(name) = conventional_name(template, index.name.as_deref(), &tokens) {
                    index.name = Some(name);
                    index.conventional_name = true;
                }
            }
        }
        index.table = Some(key);

        self.indexes.push(index);
        Ok((self.indexes.len() - 1, attachment))
    }

    fn apply_constraint_convention(&self, constraint: &mut Constraint, convention: &NamingConvention) {
        if constraint.conventional_name {
            return;
        }
        let Some(template) = constraint.kind.convention_key().and_then(|k| convention.template(k))
        else {
            return;
        };

        let fk = constraint.as_foreign_key();
        let referred_specs: Vec<_> = fk
            .map(|fk| fk.elements.iter().filter_map(|e| e.target_spec().ok()).collect())
            .unwrap_or_default();
        let tokens = NameTokens {
            table_name: &self.name,
            constraint_name: constraint.name.as_deref(),
            columns: constraint.local_columns(),
            referred_table_name: referred_specs.first().map(|s| s.table.name.as_str()),
            referred_columns: referred_specs.iter().map(|s| s.column.as_str()).collect(),
        };

        match conventional_name(template, constraint.name.as_deref(), &tokens) {
            Some(name) => {
                tracing::debug!("Naming {} constraint on {} as {}", constraint.kind, self.name, name);
                constraint.name = Some(name);
                constraint.conventional_name = true;
            }
            None if constraint.name.is_none() => {
                tracing::debug!(
                    "Convention template {:?} does not apply to unnamed {} constraint on {}",
                    template,
                    constraint.kind,
                    self.name
                );
            }
            None => {}
        }
    }
}

/// Name an element from a template.
///
/// Explicit names are kept unless the template embeds them via
/// `constraint_name`.
fn conventional_name(template: &str, explicit: Option<&str>, tokens: &NameTokens<'_>) -> Option<String> {
    if explicit.is_some() && !NamingConvention::uses_constraint_name(template) {
        return None;
    }
    NamingConvention::render(template, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::constraint::ForeignKey;
    use crate::index::IndexElement;

    fn owned_table(name: &str, columns: &[&str]) -> Table {
        let mut table = Table::new(TableKey::new(name, None));
        for c in columns {
            table.append_column(Column::new(*c, ColumnType::Integer));
        }
        table
    }

    #[test]
    fn test_append_adopts_unowned_column() {
        let mut table = Table::new(TableKey::new("users", None));
        let attachment = table.append_column(Column::new("id", ColumnType::Integer));
        assert_eq!(attachment, Attachment::Adopted);
        assert_eq!(table.column("id").unwrap().table(), Some(&table.key()));
    }

    #[test]
    fn test_append_copies_owned_column() {
        let source = owned_table("orders", &["id"]);
        let original = source.column("id").unwrap().clone();

        let mut target = Table::new(TableKey::new("invoices", None));
        let attachment = target.append_column(original.clone());

        assert_eq!(attachment, Attachment::Copied);
        assert_eq!(target.column("id").unwrap().table(), Some(&TableKey::new("invoices", None)));
        assert_eq!(source.column("id").unwrap(), &original);
    }

    #[test]
    fn test_duplicate_column_replaces_in_place() {
        let mut table = Table::new(TableKey::new("t", None));
        table.append_column(Column::placeholder("a"));
        table.append_column(Column::placeholder("b"));
        table.append_column(Column::new("a", ColumnType::Text));

        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.column("a").unwrap().data_type, ColumnType::Text);
    }

    #[test]
    fn test_ensure_column_is_idempotent() {
        let mut table = Table::new(TableKey::new("t", None));
        assert!(table.ensure_column("id"));
        assert!(!table.ensure_column("id"));
        assert_eq!(table.columns().len(), 1);
        assert!(table.column("id").unwrap().is_placeholder());
    }

    #[test]
    fn test_constraint_requires_columns() {
        let mut table = owned_table("users", &["id"]);
        let err = table
            .attach_constraint(Constraint::unique(Some("uq"), ["email"]), None)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("email")));
    }

    #[test]
    fn test_primary_key_marks_and_replaces() {
        let mut table = owned_table("users", &["id", "email"]);
        table.attach_constraint(Constraint::check(None, "id > 0"), None).unwrap();
        let (first, _) = table
            .attach_constraint(Constraint::primary_key(Some("pk1"), ["id"]), None)
            .unwrap();
        let (second, _) = table
            .attach_constraint(Constraint::primary_key(Some("pk2"), ["email"]), None)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(table.constraints().len(), 2);
        assert_eq!(table.primary_key().unwrap().name.as_deref(), Some("pk2"));
        assert!(!table.column("id").unwrap().primary_key);
        assert!(table.column("email").unwrap().primary_key);
    }

    #[test]
    fn test_copied_self_reference_follows_table() {
        let mut nodes = owned_table("nodes", &["id", "parent_id"]);
        let fk = ForeignKey::new(["parent_id"], ["nodes.id"]).unwrap();
        nodes
            .attach_constraint(Constraint::foreign_key(Some("fk_parent"), fk), None)
            .unwrap();
        let attached = nodes.foreign_keys().next().unwrap().clone();

        let mut tree = owned_table("tree", &["id", "parent_id"]);
        let (pos, attachment) = tree.attach_constraint(attached, None).unwrap();

        assert_eq!(attachment, Attachment::Copied);
        let copied = tree.constraints()[pos].as_foreign_key().unwrap();
        assert_eq!(copied.elements[0].target, "tree.id");
        // original still points at itself
        let original = nodes.foreign_keys().next().unwrap().as_foreign_key().unwrap();
        assert_eq!(original.elements[0].target, "nodes.id");
    }

    #[test]
    fn test_convention_names_unnamed_constraint() {
        let convention = NamingConvention {
            uq: Some("uq_%(table_name)s_%(column_0_N_name)s".into()),
            ck: Some("ck_%(table_name)s_%(constraint_name)s".into()),
            ..NamingConvention::default()
        };
        let mut table = owned_table("users", &["email", "tenant"]);

        let (uq, _) = table
            .attach_constraint(Constraint::unique(None, ["email", "tenant"]), Some(&convention))
            .unwrap();
        let (ck, _) = table
            .attach_constraint(Constraint::check(Some("positive"), "tenant > 0"), Some(&convention))
            .unwrap();
        let (ck_unnamed, _) = table
            .attach_constraint(Constraint::check(None, "tenant < 10"), Some(&convention))
            .unwrap();

        assert_eq!(table.constraints()[uq].name.as_deref(), Some("uq_users_email_tenant"));
        assert_eq!(table.constraints()[ck].name.as_deref(), Some("ck_users_positive"));
        assert_eq!(table.constraints()[ck_unnamed].name, None);
    }

    #[test]
    fn test_convention_keeps_explicit_name() {
        let convention = NamingConvention {
            uq: Some("uq_%(column_0_name)s".into()),
            ..NamingConvention::default()
        };
        let mut table = owned_table("users", &["email"]);
        let (pos, _) = table
            .attach_constraint(Constraint::unique(Some("my_uq"), ["email"]), Some(&convention))
            .unwrap();
        assert_eq!(table.constraints()[pos].name.as_deref(), Some("my_uq"));
    }

    #[test]
    fn test_convention_not_applied_twice() {
        let convention = NamingConvention {
            ck: Some("ck_%(table_name)s_%(constraint_name)s".into()),
            ..NamingConvention::default()
        };
        let mut first = owned_table("a", &["x"]);
        let (pos, _) = first
            .attach_constraint(Constraint::check(Some("c"), "x > 0"), Some(&convention))
            .unwrap();
        let named = first.constraints()[pos].clone();
        assert_eq!(named.name.as_deref(), Some("ck_a_c"));

        let mut second = owned_table("b", &["x"]);
        let (pos, _) = second.attach_constraint(named, Some(&convention)).unwrap();
        assert_eq!(second.constraints()[pos].name.as_deref(), Some("ck_a_c"));
    }

    #[test]
    fn test_index_requires_columns_but_not_expressions() {
        let mut table = owned_table("users", &["email"]);
        let ok = Index::new(
            Some("ix_ok"),
            vec![
                IndexElement::Column("email".into()),
                IndexElement::Expression("lower(name)".into()),
            ],
        );
        assert!(table.attach_index(ok, None).is_ok());

        let bad = Index::new(Some("ix_bad"), vec![IndexElement::Column("name".into())]);
        assert!(table.attach_index(bad, None).is_err());
    }

    #[test]
    fn test_index_convention() {
        let convention = NamingConvention {
            ix: Some("ix_%(column_0_label)s".into()),
            ..NamingConvention::default()
        };
        let mut table = owned_table("users", &["email"]);
        let index = Index::new(None, vec![IndexElement::Column("email".into())]);
        let (pos, _) = table.attach_index(index, Some(&convention)).unwrap();
        assert_eq!(table.indexes()[pos].name.as_deref(), Some("ix_users_email"));
    }
}
