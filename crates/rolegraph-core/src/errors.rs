//! ---
//! rg_section: "05-rule-manager"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule manager orchestration over model, resolver and adapter."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use rolegraph_model::ModelError;
use rolegraph_persistence::PersistenceError;
use thiserror::Error;

/// Result alias used by the rule manager.
pub type Result<T> = std::result::Result<T, ManagerError>;

/// Errors surfaced by [`crate::RuleManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The model and the rule data disagree.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// The adapter failed; any in-memory change has already been applied.
    #[error("adapter failure: {0}")]
    Adapter(#[from] PersistenceError),
    /// The operation needs a storage adapter but none is attached.
    #[error("no storage adapter attached")]
    NoAdapter,
}
