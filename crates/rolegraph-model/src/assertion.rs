//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use rolegraph_roles::RoleManager;
use tracing::debug;

use crate::errors::{ModelError, Result};
use crate::rule::RuleTuple;
use crate::section::Section;
use crate::util::{escape_assertion, remove_comments};

/// One named rule set of a section, e.g. `p` or `g2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// Policy type.
    pub key: String,
    /// Definition; normalised for sections without tokens.
    pub value: String,
    /// Field names (`p_sub`, `p_dom`, ...) for request and policy assertions.
    pub tokens: Vec<String>,
    /// Rules in insertion order, never containing duplicates.
    pub rules: Vec<RuleTuple>,
}

impl Assertion {
    pub(crate) fn new(section: Section, key: &str, value: &str) -> Self {
        let (value, tokens) = match section {
            Section::Request | Section::Policy => {
                let tokens = value
                    .split(", ")
                    .map(|token| format!("{key}_{}", token.trim()))
                    .collect();
                (value.to_owned(), tokens)
            }
            _ => (remove_comments(&escape_assertion(value)), Vec::new()),
        };
        Self {
            key: key.to_owned(),
            value,
            tokens,
            rules: Vec::new(),
        }
    }

    /// Number of `_` placeholders in a role definition.
    pub fn placeholder_count(&self) -> usize {
        self.value.matches('_').count()
    }

    /// Check a grouping rule against this assertion's role definition.
    pub fn check_grouping_arity(&self, rule: &RuleTuple) -> Result<usize> {
        let count = self.placeholder_count();
        if count < 2 {
            return Err(ModelError::InvalidRoleDefinition {
                ptype: self.key.clone(),
                placeholders: count,
            });
        }
        if rule.arity() < count {
            return Err(ModelError::GroupingArity {
                ptype: self.key.clone(),
                expected: count,
                found: rule.arity(),
            });
        }
        Ok(count)
    }

    /// Replay every rule into `rm` as an inheritance link.
    ///
    /// Fields beyond the first two, up to the placeholder count, become the
    /// link's domain qualifiers. Returns the number of rules replayed.
    pub fn build_role_links(&self, rm: &mut dyn RoleManager) -> Result<usize> {
        for rule in &self.rules {
            let count = self.check_grouping_arity(rule)?;
            let domain: Vec<&str> = rule[2..count].iter().map(String::as_str).collect();
            rm.add_link(&rule[0], &rule[1], &domain);
        }
        debug!(ptype = %self.key, links = self.rules.len(), "role links built");
        Ok(self.rules.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegraph_roles::DefaultRoleManager;

    #[test]
    fn policy_tokens_are_prefixed_with_key() {
        let ast = Assertion::new(Section::Policy, "p", "sub, dom, obj, act");
        assert_eq!(ast.tokens, vec!["p_sub", "p_dom", "p_obj", "p_act"]);
        assert_eq!(ast.value, "sub, dom, obj, act");
    }

    #[test]
    fn expression_sections_are_normalised() {
        let ast = Assertion::new(Section::Matcher, "m", "r.sub == p.sub # same subject");
        assert_eq!(ast.value, "r_sub == p_sub");
        assert!(ast.tokens.is_empty());
    }

    #[test]
    fn arity_is_validated_against_placeholders() {
        let ast = Assertion::new(Section::Grouping, "g", "_, _, _");
        assert_eq!(ast.check_grouping_arity(&["u", "r", "d"].into()).unwrap(), 3);
        assert_eq!(
            ast.check_grouping_arity(&["u", "r"].into()),
            Err(ModelError::GroupingArity {
                ptype: "g".into(),
                expected: 3,
                found: 2
            })
        );

        let broken = Assertion::new(Section::Grouping, "g", "_");
        assert!(matches!(
            broken.check_grouping_arity(&["u", "r"].into()),
            Err(ModelError::InvalidRoleDefinition { placeholders: 1, .. })
        ));
    }

    #[test]
    fn links_honour_declared_arity() {
        let mut ast = Assertion::new(Section::Grouping, "g", "_, _");
        ast.rules.push(["alice", "admin", "ignored"].into());
        let mut rm = DefaultRoleManager::default();
        assert_eq!(ast.build_role_links(&mut rm).unwrap(), 1);
        assert_eq!(rm.get_roles("alice", &[]), vec!["admin"]);

        let mut ast = Assertion::new(Section::Grouping, "g", "_, _, _, _");
        ast.rules.push(["alice", "admin", "tenant", "eu"].into());
        let mut rm = DefaultRoleManager::default();
        ast.build_role_links(&mut rm).unwrap();
        assert_eq!(rm.get_roles("alice", &["tenant", "eu"]), vec!["admin"]);
    }
}
