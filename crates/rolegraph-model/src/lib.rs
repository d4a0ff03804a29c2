//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
//! The rolegraph rule model.
//!
//! A [`Model`] maps each [`Section`] to its named [`Assertion`]s. The policy
//! (`p`) and grouping (`g`) assertions own ordered, duplicate-free collections
//! of [`RuleTuple`]s; request, effect and matcher assertions only carry their
//! normalised definition for the external decision engine.
#![warn(missing_docs)]

pub mod assertion;
pub mod definition;
pub mod errors;
pub mod model;
pub mod rule;
pub mod section;
pub mod util;

pub use assertion::Assertion;
pub use definition::parse_rule_line;
pub use errors::{ModelError, Result};
pub use model::Model;
pub use rule::RuleTuple;
pub use section::Section;

/// Policy type of the default grouping assertion.
pub const DEFAULT_GROUPING_PTYPE: &str = "g";

/// Policy type of the default policy assertion.
pub const DEFAULT_POLICY_PTYPE: &str = "p";
