//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use rolegraph_roles::RoleManager;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::assertion::Assertion;
use crate::errors::{ModelError, Result};
use crate::rule::RuleTuple;
use crate::section::Section;
use crate::util::{array_equals, array_remove_duplicates};

/// The whole access control model: section -> policy type -> assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    sections: BTreeMap<Section, IndexMap<String, Assertion>>,
}

impl Model {
    /// Model with the built-in `r`, `p`, `g`, `e` and `m` definitions.
    pub fn new() -> Self {
        let mut model = Self::empty();
        for section in Section::iter() {
            model.add_def(section, section.as_ref(), section.default_definition());
        }
        model
    }

    /// Model without any definition.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Define (or redefine) an assertion. Returns `false` for an empty value.
    pub fn add_def(&mut self, section: Section, key: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        self.sections
            .entry(section)
            .or_default()
            .insert(key.to_owned(), Assertion::new(section, key, value));
        true
    }

    /// Whether `(section, ptype)` has been defined.
    pub fn has_assertion(&self, section: Section, ptype: &str) -> bool {
        self.sections
            .get(&section)
            .is_some_and(|assertions| assertions.contains_key(ptype))
    }

    /// Look up a defined assertion.
    pub fn assertion(&self, section: Section, ptype: &str) -> Result<&Assertion> {
        self.sections
            .get(&section)
            .and_then(|assertions| assertions.get(ptype))
            .ok_or_else(|| undefined(section, ptype))
    }

    fn rule_assertion_mut(&mut self, section: Section, ptype: &str) -> Result<&mut Assertion> {
        if !section.holds_rules() {
            return Err(ModelError::NoRuleStorage(section));
        }
        self.sections
            .get_mut(&section)
            .and_then(|assertions| assertions.get_mut(ptype))
            .ok_or_else(|| undefined(section, ptype))
    }

    /// Assertions of one section in definition order.
    pub fn assertions(&self, section: Section) -> impl Iterator<Item = &Assertion> {
        self.sections
            .get(&section)
            .into_iter()
            .flat_map(|assertions| assertions.values())
    }

    /// Normalised expression of an effect or matcher assertion.
    pub fn expression(&self, section: Section, key: &str) -> Result<&str> {
        self.assertion(section, key).map(|ast| ast.value.as_str())
    }

    /// Live rule list of an assertion.
    pub fn get_rule(&self, section: Section, ptype: &str) -> Result<&[RuleTuple]> {
        self.assertion(section, ptype).map(|ast| ast.rules.as_slice())
    }

    /// Rules whose fields starting at `field_index` match `field_values`.
    ///
    /// Empty values are wildcards; rules too short to cover the filter never match.
    pub fn get_filtered_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<Vec<RuleTuple>> {
        Ok(self
            .get_rule(section, ptype)?
            .iter()
            .filter(|rule| rule.matches_filter(field_index, field_values))
            .cloned()
            .collect())
    }

    /// Exact positional membership test.
    pub fn has_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<bool> {
        Ok(self
            .get_rule(section, ptype)?
            .iter()
            .any(|existing| array_equals(existing.fields(), rule.fields())))
    }

    /// Append `rule` unless an equal rule exists. Returns whether it was added.
    ///
    /// Grouping rules are checked against the role definition first.
    pub fn add(&mut self, section: Section, ptype: &str, rule: RuleTuple) -> Result<bool> {
        let ast = self.rule_assertion_mut(section, ptype)?;
        if section == Section::Grouping {
            ast.check_grouping_arity(&rule)?;
        }
        if ast
            .rules
            .iter()
            .any(|existing| array_equals(existing.fields(), rule.fields()))
        {
            return Ok(false);
        }
        ast.rules.push(rule);
        Ok(true)
    }

    /// Remove the first rule equal to `rule`.
    pub fn remove(&mut self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<bool> {
        let ast = self.rule_assertion_mut(section, ptype)?;
        match ast
            .rules
            .iter()
            .position(|existing| array_equals(existing.fields(), rule.fields()))
        {
            Some(pos) => {
                ast.rules.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every rule matching the field filter, keeping survivors in order.
    pub fn remove_filtered_rule(
        &mut self,
        section: Section,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<bool> {
        let ast = self.rule_assertion_mut(section, ptype)?;
        let before = ast.rules.len();
        ast.rules
            .retain(|rule| !rule.matches_filter(field_index, field_values));
        let removed = before - ast.rules.len();
        if removed > 0 {
            debug!(%section, ptype, field_index, removed, "filtered rules removed");
        }
        Ok(removed > 0)
    }

    /// Distinct values at `field_index` across all rules of an assertion.
    ///
    /// Rules shorter than `field_index + 1` contribute nothing.
    pub fn get_values_for_field_in_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
    ) -> Result<Vec<String>> {
        let mut values: Vec<String> = self
            .get_rule(section, ptype)?
            .iter()
            .filter_map(|rule| rule.field(field_index).map(str::to_owned))
            .collect();
        array_remove_duplicates(&mut values);
        Ok(values)
    }

    /// Replace every rule of an assertion, dropping duplicates from the input.
    pub fn replace_rules<I>(&mut self, section: Section, ptype: &str, rules: I) -> Result<usize>
    where
        I: IntoIterator<Item = RuleTuple>,
    {
        let ast = self.rule_assertion_mut(section, ptype)?;
        let mut seen = HashSet::new();
        let mut replacement = Vec::new();
        for rule in rules {
            if section == Section::Grouping {
                ast.check_grouping_arity(&rule)?;
            }
            if seen.insert(rule.clone()) {
                replacement.push(rule);
            }
        }
        ast.rules = replacement;
        Ok(ast.rules.len())
    }

    /// Every policy and grouping rule as `(section, ptype, rule)`.
    pub fn rule_lines(&self) -> Vec<(Section, String, RuleTuple)> {
        [Section::Policy, Section::Grouping]
            .into_iter()
            .flat_map(|section| {
                self.assertions(section).flat_map(move |ast| {
                    ast.rules
                        .iter()
                        .map(move |rule| (section, ast.key.clone(), rule.clone()))
                })
            })
            .collect()
    }

    /// Drop all policy and grouping rules, keeping definitions.
    pub fn clear(&mut self) {
        for section in [Section::Policy, Section::Grouping] {
            if let Some(assertions) = self.sections.get_mut(&section) {
                for ast in assertions.values_mut() {
                    ast.rules.clear();
                }
            }
        }
    }

    /// Replay every grouping assertion into `rm`. Returns the number of rules replayed.
    pub fn build_role_links(&self, rm: &mut dyn RoleManager) -> Result<usize> {
        let mut total = 0;
        for ast in self.assertions(Section::Grouping) {
            total += ast.build_role_links(rm)?;
        }
        Ok(total)
    }
}

fn undefined(section: Section, ptype: &str) -> ModelError {
    ModelError::UndefinedAssertion {
        section,
        ptype: ptype.to_owned(),
    }
}
