//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
//! String and sequence helpers shared by the model.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static ASSERTION_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([rp][0-9]*)\.").expect("valid assertion reference pattern"));

/// Rewrite `r.sub` / `p2.obj` style references to `r_sub` / `p2_obj`.
pub fn escape_assertion(s: &str) -> String {
    ASSERTION_REFERENCE.replace_all(s, "${1}_").into_owned()
}

/// Strip a trailing `#` comment.
pub fn remove_comments(s: &str) -> String {
    match s.find('#') {
        Some(pos) => s[..pos].trim().to_owned(),
        None => s.to_owned(),
    }
}

/// Positional equality of two field sequences.
pub fn array_equals<A, B>(a: &[A], b: &[B]) -> bool
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.as_ref() == y.as_ref())
}

/// Remove repeated values in place, keeping the first occurrence of each.
pub fn array_remove_duplicates(values: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(values.len());
    values.retain(|value| seen.insert(value.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_request_and_policy_references() {
        assert_eq!(
            escape_assertion("g(r.sub, p.sub, r.dom) && r2.obj == p2.obj"),
            "g(r_sub, p_sub, r_dom) && r2_obj == p2_obj"
        );
        assert_eq!(escape_assertion("keyMatch(xr.obj)"), "keyMatch(xr.obj)");
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(remove_comments("a && b # trailing note"), "a && b");
        assert_eq!(remove_comments("plain"), "plain");
    }

    #[test]
    fn equality_is_positional() {
        assert!(array_equals(&["a", "b"], &["a".to_string(), "b".to_string()]));
        assert!(!array_equals(&["a", "b"], &["b", "a"]));
        assert!(!array_equals(&["a"], &["a", "b"]));
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut values = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        array_remove_duplicates(&mut values);
        assert_eq!(values, vec!["b", "a"]);
    }
}
