//! ---
//! rg_section: "05-rule-manager"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule manager orchestration over model, resolver and adapter."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
//! The rolegraph rule manager.
//!
//! [`RuleManager`] is the public surface of the engine: it owns the rule
//! model and the role graph behind one lock, translates role operations into
//! grouping and policy rule mutations, and mirrors those mutations to an
//! optional storage adapter.
#![warn(missing_docs)]

pub mod errors;
pub mod manager;
pub mod metrics;
mod state;

pub use errors::{ManagerError, Result};
pub use manager::{RuleManager, RuleManagerBuilder};
pub use metrics::RuleMetrics;

pub use rolegraph_model::{Model, RuleTuple, Section};
pub use rolegraph_roles::RoleLink;
