//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// One concrete fact: an ordered, variable-arity sequence of string fields.
///
/// Field 0 is the subject of a policy rule or the inheriting entity of a
/// grouping rule, field 1 the object or inherited role, trailing fields are
/// domains and extra qualifiers. Equality is positional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTuple(Vec<String>);

impl RuleTuple {
    /// Build a tuple from any sequence of string-like fields.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Number of fields.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Borrow the fields.
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Consume the tuple, returning its fields.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Positional filter with empty-string wildcards.
    ///
    /// Matches iff the tuple has at least `field_index + field_values.len()`
    /// fields and every non-empty value equals the field at
    /// `field_index + i`.
    pub fn matches_filter(&self, field_index: usize, field_values: &[&str]) -> bool {
        if self.0.len() < field_index + field_values.len() {
            return false;
        }
        field_values
            .iter()
            .enumerate()
            .all(|(i, value)| value.is_empty() || self.0[field_index + i] == *value)
    }
}

impl Deref for RuleTuple {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for RuleTuple {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl From<Vec<&str>> for RuleTuple {
    fn from(fields: Vec<&str>) -> Self {
        Self::new(fields)
    }
}

impl<const N: usize> From<[&str; N]> for RuleTuple {
    fn from(fields: [&str; N]) -> Self {
        Self::new(fields)
    }
}

impl FromIterator<String> for RuleTuple {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RuleTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_supports_wildcards_and_offsets() {
        let rule = RuleTuple::from(["alice", "admin", "corp"]);
        assert!(rule.matches_filter(0, &["alice"]));
        assert!(rule.matches_filter(1, &["admin", "corp"]));
        assert!(rule.matches_filter(0, &["", "admin"]));
        assert!(!rule.matches_filter(0, &["bob"]));
        assert!(rule.matches_filter(0, &[]));
    }

    #[test]
    fn short_tuples_never_match() {
        let rule = RuleTuple::from(["alice", "admin"]);
        assert!(!rule.matches_filter(1, &["admin", "corp"]));
        assert!(!rule.matches_filter(2, &[""]));
    }

    #[test]
    fn display_joins_fields() {
        assert_eq!(RuleTuple::from(["a", "b"]).to_string(), "a, b");
    }
}
