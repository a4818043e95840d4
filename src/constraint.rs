//! Constraint types
//!
//! All table-level constraints reduce to five kinds:
//! - `PrimaryKey`: ordered column names
//! - `Unique`: ordered column names
//! - `Check`: opaque condition text
//! - `ForeignKey`: local columns paired with `[schema.]table.column` targets
//! - `Bare`: a named constraint of unspecified kind

use crate::naming::{ColumnSpec, TableKey, normalize_name};
use crate::{DialectOptions, Error, Result};
use serde::{Deserialize, Serialize};

/// One local column of a foreign key and the column it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyElement {
    /// Local column name
    pub column: String,
    /// Target spec, `[schema.]table.column`
    pub target: String,
}

impl ForeignKeyElement {
    /// Parse the target spec
    pub fn target_spec(&self) -> Result<ColumnSpec> {
        ColumnSpec::parse(&self.target)
    }
}

/// Foreign-key body: positional column pairs plus referential actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub elements: Vec<ForeignKeyElement>,
    pub onupdate: Option<String>,
    pub ondelete: Option<String>,
    /// `MATCH` type (`FULL`, `PARTIAL`, `SIMPLE`)
    pub match_type: Option<String>,
}

impl ForeignKey {
    /// Pair local columns with target specs positionally.
    ///
    /// Fails when the two lists differ in length.
    pub fn new<L, T>(columns: L, targets: T) -> Result<Self>
    where
        L: IntoIterator,
        L::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        if columns.len() != targets.len() {
            return Err(Error::Configuration(format!(
                "foreign key has {} local column(s) but {} referenced column(s)",
                columns.len(),
                targets.len()
            )));
        }

        Ok(Self {
            elements: columns
                .into_iter()
                .zip(targets)
                .map(|(column, target)| ForeignKeyElement { column, target })
                .collect(),
            ..Self::default()
        })
    }

    pub fn with_onupdate(mut self, action: Option<&str>) -> Self {
        self.onupdate = normalize_name(action);
        self
    }

    pub fn with_ondelete(mut self, action: Option<&str>) -> Self {
        self.ondelete = normalize_name(action);
        self
    }

    pub fn with_match(mut self, match_type: Option<&str>) -> Self {
        self.match_type = normalize_name(match_type);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.column.as_str())
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.target.as_str())
    }

    /// Table referenced by the first element
    pub fn referred_table(&self) -> Option<TableKey> {
        self.elements
            .first()
            .and_then(|e| e.target_spec().ok())
            .map(|spec| spec.table)
    }

    /// Rewrite targets pointing at `from` so they point at `to`.
    ///
    /// Used when a self-referencing foreign key is copied onto another table.
    pub(crate) fn retarget_self_references(&mut self, from: &TableKey, to: &TableKey) {
        for element in &mut self.elements {
            if let Ok(spec) = element.target_spec() {
                if &spec.table == from {
                    element.target = ColumnSpec::new(to.clone(), spec.column).to_spec_string();
                }
            }
        }
    }
}

/// The kind-specific body of a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey { columns: Vec<String> },
    Unique { columns: Vec<String> },
    Check { condition: String },
    ForeignKey(ForeignKey),
    Bare,
}

impl ConstraintKind {
    /// Tag used when the kind is given as data (`None` for a bare constraint)
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            ConstraintKind::PrimaryKey { .. } => Some("primary"),
            ConstraintKind::Unique { .. } => Some("unique"),
            ConstraintKind::Check { .. } => Some("check"),
            ConstraintKind::ForeignKey(_) => Some("foreignkey"),
            ConstraintKind::Bare => None,
        }
    }

    /// Key of the naming-convention template for this kind
    pub fn convention_key(&self) -> Option<&'static str> {
        match self {
            ConstraintKind::PrimaryKey { .. } => Some("pk"),
            ConstraintKind::Unique { .. } => Some("uq"),
            ConstraintKind::Check { .. } => Some("ck"),
            ConstraintKind::ForeignKey(_) => Some("fk"),
            ConstraintKind::Bare => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey { .. } => "primary key",
            ConstraintKind::Unique { .. } => "unique",
            ConstraintKind::Check { .. } => "check",
            ConstraintKind::ForeignKey(_) => "foreign key",
            ConstraintKind::Bare => "bare",
        }
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: ConstraintKind,
    pub deferrable: Option<bool>,
    pub initially: Option<String>,
    /// Dialect-specific options, passed through untouched
    #[serde(default)]
    pub options: DialectOptions,
    /// Owning table, if attached
    #[serde(default)]
    pub(crate) table: Option<TableKey>,
    /// The name was produced by a naming convention
    #[serde(default)]
    pub(crate) conventional_name: bool,
}

impl Constraint {
    fn with_kind(name: Option<&str>, kind: ConstraintKind) -> Self {
        Self {
            name: normalize_name(name),
            kind,
            deferrable: None,
            initially: None,
            options: DialectOptions::new(),
            table: None,
            conventional_name: false,
        }
    }

    pub fn primary_key<'a>(name: Option<&str>, columns: impl IntoIterator<Item = &'a str>) -> Self {
        let columns = crate::naming::dedup_names(columns);
        Self::with_kind(name, ConstraintKind::PrimaryKey { columns })
    }

    pub fn unique<'a>(name: Option<&str>, columns: impl IntoIterator<Item = &'a str>) -> Self {
        let columns = crate::naming::dedup_names(columns);
        Self::with_kind(name, ConstraintKind::Unique { columns })
    }

    pub fn check(name: Option<&str>, condition: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            ConstraintKind::Check {
                condition: condition.into(),
            },
        )
    }

    pub fn foreign_key(name: Option<&str>, foreign_key: ForeignKey) -> Self {
        Self::with_kind(name, ConstraintKind::ForeignKey(foreign_key))
    }

    pub fn bare(name: Option<&str>) -> Self {
        Self::with_kind(name, ConstraintKind::Bare)
    }

    pub fn with_deferrable(mut self, deferrable: Option<bool>) -> Self {
        self.deferrable = deferrable;
        self
    }

    pub fn with_initially(mut self, initially: Option<&str>) -> Self {
        self.initially = normalize_name(initially);
        self
    }

    pub fn with_options(mut self, options: DialectOptions) -> Self {
        self.options.extend(options);
        self
    }

    /// The table this constraint is attached to
    pub fn table(&self) -> Option<&TableKey> {
        self.table.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.table.is_some()
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::ForeignKey(_))
    }

    pub fn as_foreign_key(&self) -> Option<&ForeignKey> {
        match &self.kind {
            ConstraintKind::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }

    /// Names of the columns of the owning table this constraint covers
    pub fn local_columns(&self) -> Vec<&str> {
        match &self.kind {
            ConstraintKind::PrimaryKey { columns } | ConstraintKind::Unique { columns } => {
                columns.iter().map(String::as_str).collect()
            }
            ConstraintKind::ForeignKey(fk) => fk.columns().collect(),
            ConstraintKind::Check { .. } | ConstraintKind::Bare => Vec::new(),
        }
    }

    /// Deep copy without the owner back-reference
    pub fn detached_copy(&self) -> Self {
        Self {
            table: None,
            ..self.clone()
        }
    }
}
