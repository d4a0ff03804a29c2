//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use thiserror::Error;

use crate::section::Section;

/// Result alias used throughout the model crate.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Configuration errors raised when model definitions and rule data disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A `(section, ptype)` pair was referenced but never defined.
    #[error("assertion {section}.{ptype} is not defined in the model")]
    UndefinedAssertion {
        /// Section that was queried.
        section: Section,
        /// Policy type that was queried.
        ptype: String,
    },
    /// A section name or header outside `r`, `p`, `g`, `e`, `m`.
    #[error("section [{0}] is not supported")]
    UnsupportedSection(String),
    /// The section only carries a definition and cannot store rules.
    #[error("section [{0}] does not store rules")]
    NoRuleStorage(Section),
    /// A definition line declared a key without a value.
    #[error("definition {section}.{key} is empty")]
    EmptyDefinition {
        /// Section of the definition.
        section: Section,
        /// Key of the definition.
        key: String,
    },
    /// A role definition declares fewer than two placeholders.
    #[error("role definition {ptype} needs at least 2 \"_\" placeholders, found {placeholders}")]
    InvalidRoleDefinition {
        /// Grouping policy type.
        ptype: String,
        /// Number of `_` placeholders found.
        placeholders: usize,
    },
    /// A grouping rule is shorter than its role definition requires.
    #[error("grouping rule for {ptype} has {found} fields, role definition requires {expected}")]
    GroupingArity {
        /// Grouping policy type.
        ptype: String,
        /// Placeholder count declared by the definition.
        expected: usize,
        /// Field count of the offending rule.
        found: usize,
    },
    /// A rule or definition line could not be parsed.
    #[error("malformed line: {0}")]
    MalformedLine(String),
}
