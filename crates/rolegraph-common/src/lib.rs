//! ---
//! rg_section: "01-common"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Shared configuration and tracing primitives."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
//! Shared primitives for the rolegraph workspace.
//! This crate exposes configuration loading and logging setup consumed by
//! the engine crates and the CLI.

pub mod config;
pub mod logging;

pub use config::{EngineConfig, LoadedEngineConfig, LoggingConfig, RoleManagerConfig, StorageConfig};
pub use logging::{init_tracing, LogFormat};
