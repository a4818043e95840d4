//! Naming conventions for generated constraint and index names
//!
//! Templates use `%(token)s` placeholders, keyed by element kind:
//! `pk`, `uq`, `ck`, `fk`, `ix`.
//!
//! Supported tokens:
//! - `table_name`, `constraint_name`, `referred_table_name`
//! - `column_0_name`, `column_0N_name`, `column_0_N_name`
//! - `column_0_label`, `column_0N_label`, `column_0_N_label`
//! - `referred_column_0_name`, `referred_column_0N_name`, `referred_column_0_N_name`
//!
//! `0N` joins every column with no separator, `0_N` joins with `_`. A label
//! is `<table>_<column>`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static TOKEN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    TOKEN.get_or_init(|| Regex::new(r"%\((\w+)\)s").expect("token pattern is valid"))
}

/// Per-kind name templates, copied from a target schema model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ck: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ix: Option<String>,
}

/// Values available to a template.
#[derive(Debug, Clone, Default)]
pub struct NameTokens<'a> {
    pub table_name: &'a str,
    pub constraint_name: Option<&'a str>,
    pub columns: Vec<&'a str>,
    pub referred_table_name: Option<&'a str>,
    pub referred_columns: Vec<&'a str>,
}

impl NameTokens<'_> {
    fn value(&self, token: &str) -> Option<String> {
        match token {
            "table_name" => return Some(self.table_name.to_string()),
            "constraint_name" => return self.constraint_name.map(str::to_string),
            "referred_table_name" => return self.referred_table_name.map(str::to_string),
            _ => {}
        }

        let (columns, rest, referred) = match token.strip_prefix("referred_column_0") {
            Some(rest) => (&self.referred_columns, rest, true),
            None => (&self.columns, token.strip_prefix("column_0")?, false),
        };

        let label = |c: &str| format!("{}_{}", self.table_name, c);
        match rest {
            "_name" => columns.first().map(|c| c.to_string()),
            "N_name" => join(columns.iter().map(|c| c.to_string()), ""),
            "_N_name" => join(columns.iter().map(|c| c.to_string()), "_"),
            "_label" if !referred => columns.first().map(|c| label(*c)),
            "N_label" if !referred => join(columns.iter().map(|c| label(*c)), ""),
            "_N_label" if !referred => join(columns.iter().map(|c| label(*c)), "_"),
            _ => None,
        }
    }
}

fn join(parts: impl Iterator<Item = String>, sep: &str) -> Option<String> {
    let parts: Vec<String> = parts.collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

impl NamingConvention {
    /// Template registered for a kind key
    pub fn template(&self, key: &str) -> Option<&str> {
        match key {
            "pk" => self.pk.as_deref(),
            "uq" => self.uq.as_deref(),
            "ck" => self.ck.as_deref(),
            "fk" => self.fk.as_deref(),
            "ix" => self.ix.as_deref(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pk.is_none()
            && self.uq.is_none()
            && self.ck.is_none()
            && self.fk.is_none()
            && self.ix.is_none()
    }

    /// Render a template.
    ///
    /// Returns `None` if any token has no value (unknown token, missing
    /// constraint name, no columns).
    pub fn render(template: &str, tokens: &NameTokens<'_>) -> Option<String> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in token_pattern().captures_iter(template) {
            let whole = caps.get(0)?;
            out.push_str(&template[last..whole.start()]);
            out.push_str(&tokens.value(&caps[1])?);
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Some(out)
    }

    /// Whether a template needs the element's own name
    pub fn uses_constraint_name(template: &str) -> bool {
        token_pattern()
            .captures_iter(template)
            .any(|caps| &caps[1] == "constraint_name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> NameTokens<'static> {
        NameTokens {
            table_name: "orders",
            constraint_name: None,
            columns: vec!["customer_id", "region"],
            referred_table_name: Some("customers"),
            referred_columns: vec!["id", "region"],
        }
    }

    #[test]
    fn test_render_column_tokens() {
        let t = tokens();
        assert_eq!(
            NamingConvention::render("uq_%(table_name)s_%(column_0_name)s", &t).unwrap(),
            "uq_orders_customer_id"
        );
        assert_eq!(
            NamingConvention::render("uq_%(column_0_N_name)s", &t).unwrap(),
            "uq_customer_id_region"
        );
        assert_eq!(
            NamingConvention::render("uq_%(column_0N_name)s", &t).unwrap(),
            "uq_customer_idregion"
        );
        assert_eq!(
            NamingConvention::render("ix_%(column_0_label)s", &t).unwrap(),
            "ix_orders_customer_id"
        );
    }

    #[test]
    fn test_render_referred_tokens() {
        let t = tokens();
        assert_eq!(
            NamingConvention::render(
                "fk_%(table_name)s_%(column_0_name)s_%(referred_table_name)s_%(referred_column_0_N_name)s",
                &t
            )
            .unwrap(),
            "fk_orders_customer_id_customers_id_region"
        );
    }

    #[test]
    fn test_render_missing_token() {
        let t = tokens();
        assert!(NamingConvention::render("ck_%(table_name)s_%(constraint_name)s", &t).is_none());
        assert!(NamingConvention::render("x_%(no_such_token)s", &t).is_none());
        assert!(NamingConvention::render("x_%(referred_column_0_label)s", &t).is_none());

        let empty = NameTokens {
            table_name: "t",
            ..NameTokens::default()
        };
        assert!(NamingConvention::render("pk_%(column_0_name)s", &empty).is_none());
    }

    #[test]
    fn test_render_constraint_name() {
        let t = NameTokens {
            constraint_name: Some("positive_total"),
            ..tokens()
        };
        assert_eq!(
            NamingConvention::render("ck_%(table_name)s_%(constraint_name)s", &t).unwrap(),
            "ck_orders_positive_total"
        );
        assert!(NamingConvention::uses_constraint_name("ck_%(constraint_name)s"));
        assert!(!NamingConvention::uses_constraint_name("pk_%(table_name)s"));
    }

    #[test]
    fn test_template_lookup() {
        let convention = NamingConvention {
            pk: Some("pk_%(table_name)s".into()),
            ..NamingConvention::default()
        };
        assert_eq!(convention.template("pk"), Some("pk_%(table_name)s"));
        assert_eq!(convention.template("fk"), None);
        assert!(!convention.is_empty());
        assert!(NamingConvention::default().is_empty());
    }
}
