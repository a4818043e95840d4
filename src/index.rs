//! Index definitions
//!
//! An index entry is either a column of the owning table or a textual
//! expression bound to it (e.g. `lower(email)`).

use crate::DialectOptions;
use crate::naming::{TableKey, normalize_name};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();

fn identifier_pattern() -> &'static Regex {
    IDENTIFIER.get_or_init(|| {
        Regex::new(r#"^(?:([A-Za-z_][A-Za-z0-9_$]*)|"([^"]+)")$"#).expect("identifier pattern is valid")
    })
}

/// What a caller asks an index to cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    /// A column name; a placeholder column is created if the table lacks it
    Name(String),
    /// Raw SQL text, never resolved against the table
    Expression(String),
}

impl IndexTarget {
    pub fn expression(text: impl Into<String>) -> Self {
        IndexTarget::Expression(text.into())
    }

    /// Classify a string: identifiers name columns, anything else is an
    /// expression. A double-quoted identifier names the column inside the
    /// quotes.
    pub fn classify(text: &str) -> Self {
        let name = identifier_pattern()
            .captures(text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)));
        match name {
            Some(name) => IndexTarget::Name(name.as_str().to_string()),
            None => IndexTarget::Expression(text.to_string()),
        }
    }
}

impl From<&str> for IndexTarget {
    fn from(text: &str) -> Self {
        IndexTarget::classify(text)
    }
}

impl From<String> for IndexTarget {
    fn from(text: String) -> Self {
        IndexTarget::classify(&text)
    }
}

/// A resolved index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexElement {
    Column(String),
    Expression(String),
}

impl IndexElement {
    pub fn column_name(&self) -> Option<&str> {
        match self {
            IndexElement::Column(name) => Some(name),
            IndexElement::Expression(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: Option<String>,
    pub elements: Vec<IndexElement>,
    pub unique: bool,
    #[serde(default)]
    pub options: DialectOptions,
    #[serde(default)]
    pub(crate) table: Option<TableKey>,
    #[serde(default)]
    pub(crate) conventional_name: bool,
}

impl Index {
    pub fn new(name: Option<&str>, elements: Vec<IndexElement>) -> Self {
        Self {
            name: normalize_name(name),
            elements,
            unique: false,
            options: DialectOptions::new(),
            table: None,
            conventional_name: false,
        }
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_options(mut self, options: DialectOptions) -> Self {
        self.options.extend(options);
        self
    }

    pub fn table(&self) -> Option<&TableKey> {
        self.table.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.table.is_some()
    }

    /// Names of the plain columns this index covers
    pub fn column_names(&self) -> Vec<&str> {
        self.elements.iter().filter_map(IndexElement::column_name).collect()
    }

    pub fn detached_copy(&self) -> Self {
        Self {
            table: None,
            ..self.clone()
        }
    }
}
