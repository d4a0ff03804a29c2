//! ---
//! rg_section: "03-role-hierarchy"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Role inheritance graph and transitive closure queries."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
//! Role hierarchy resolution for the rolegraph engine.
//!
//! A [`RoleManager`] stores "name inherits role" links, optionally scoped to a
//! domain, and answers which roles a name effectively holds and which names
//! effectively hold a role. Domains partition the graph: a link added under one
//! domain never influences queries under another.
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

pub mod default_role_manager;

pub use default_role_manager::DefaultRoleManager;

/// Traversal ceiling used when no explicit depth is configured.
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 10;

/// Contract between the rule model and a role inheritance store.
///
/// `domain` is the ordered list of scoping qualifiers taken from a grouping
/// rule. The qualifiers are compared field by field, so `["a", "b"]` and
/// `["a::b"]` are distinct domains, as are `[""]` and the implicit default
/// domain selected by an empty slice.
pub trait RoleManager: Send + Sync {
    /// Discard every link in every domain.
    fn clear(&mut self);

    /// Record that `name1` inherits `name2`. Returns `false` if the link already existed.
    fn add_link(&mut self, name1: &str, name2: &str, domain: &[&str]) -> bool;

    /// Whether `name2` is reachable from `name1` within the depth ceiling.
    fn has_link(&self, name1: &str, name2: &str, domain: &[&str]) -> bool;

    /// Roles reachable upward from `name`, in breadth-first discovery order.
    fn get_roles(&self, name: &str, domain: &[&str]) -> Vec<String>;

    /// Names from which `name` is reachable, in breadth-first discovery order.
    fn get_users(&self, name: &str, domain: &[&str]) -> Vec<String>;

    /// Every direct link currently stored.
    fn links(&self) -> Vec<RoleLink>;
}

/// A single direct inheritance edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleLink {
    /// Inheriting entity (user or role).
    pub name: String,
    /// Inherited role.
    pub role: String,
    /// Domain qualifiers, empty for the default domain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
}
