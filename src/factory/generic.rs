//! Constraint constructors selected by kind tag
//!
//! Used when the kind of a constraint is only known as data. New kinds are
//! added as rows of `KINDS`.

use crate::constraint::{Constraint, ForeignKey};
use crate::{Error, Result};

pub type Constructor = fn(Option<&str>) -> Constraint;

fn foreign_key(name: Option<&str>) -> Constraint {
    Constraint::foreign_key(name, ForeignKey::default())
}

fn primary(name: Option<&str>) -> Constraint {
    Constraint::primary_key(name, std::iter::empty::<&str>())
}

fn unique(name: Option<&str>) -> Constraint {
    Constraint::unique(name, std::iter::empty::<&str>())
}

fn check(name: Option<&str>) -> Constraint {
    Constraint::check(name, "")
}

/// Tag → constructor. `None` is a bare constraint of unspecified kind.
static KINDS: &[(Option<&str>, Constructor)] = &[
    (Some("foreignkey"), foreign_key),
    (Some("primary"), primary),
    (Some("unique"), unique),
    (Some("check"), check),
    (None, Constraint::bare),
];

/// Look up the constructor for a kind tag
pub fn constructor(kind: Option<&str>) -> Result<Constructor> {
    KINDS
        .iter()
        .find(|(tag, _)| *tag == kind)
        .map(|(_, ctor)| *ctor)
        .ok_or_else(|| Error::UnsupportedKind {
            kind: kind.unwrap_or_default().to_string(),
            valid: valid_kinds(),
        })
}

/// Recognised tags, sorted, with the bare kind last as `unspecified`
pub fn valid_kinds() -> String {
    let mut tags: Vec<&str> = KINDS.iter().filter_map(|(tag, _)| *tag).collect();
    tags.sort_unstable();
    let mut parts: Vec<String> = tags.into_iter().map(|t| format!("'{}'", t)).collect();
    if KINDS.iter().any(|(tag, _)| tag.is_none()) {
        parts.push("unspecified".to_string());
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;

    #[test]
    fn test_every_tag_builds_matching_kind() {
        for (tag, _) in KINDS {
            let ctor = constructor(*tag).unwrap();
            let constraint = ctor(Some("c"));
            assert_eq!(constraint.kind.tag(), *tag);
            assert_eq!(constraint.name.as_deref(), Some("c"));
        }
    }

    #[test]
    fn test_placeholder_bodies_are_empty() {
        let check = constructor(Some("check")).unwrap()(None);
        assert_eq!(check.kind, ConstraintKind::Check { condition: String::new() });
        let fk = constructor(Some("foreignkey")).unwrap()(None);
        assert!(fk.as_foreign_key().unwrap().elements.is_empty());
    }

    #[test]
    fn test_unknown_tag() {
        let err = constructor(Some("exclude")).unwrap_err();
        match &err {
            Error::UnsupportedKind { kind, valid } => {
                assert_eq!(kind, "exclude");
                assert_eq!(valid, "'check', 'foreignkey', 'primary', 'unique', unspecified");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("'check', 'foreignkey'"));
    }
}
