//! ---
//! rg_section: "04-persistence"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Persistence abstractions and storage bindings."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Storage adapters for rolegraph rules.
//!
//! The engine keeps its authority in memory; an adapter mirrors mutations
//! for durability and supplies the initial rule set at startup.

use rolegraph_model::{ModelError, RuleTuple, Section};
use serde::{Deserialize, Serialize};

pub mod file;
pub mod memory;

pub use file::CsvFileAdapter;
pub use memory::MemoryAdapter;

/// Result alias used throughout the persistence crate.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Error type for the persistence subsystem.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Wrapper for IO errors encountered while reading/writing rule files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper for CSV encoding issues.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A stored rule does not fit the model.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    /// The adapter does not support the operation.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),
}

/// A rule as persisted: its assertion coordinates plus fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoredRule {
    /// Section of the owning assertion.
    pub section: Section,
    /// Policy type of the owning assertion.
    pub ptype: String,
    /// Rule fields.
    pub rule: RuleTuple,
}

impl StoredRule {
    /// Build a stored rule, deriving the section from the policy type.
    pub fn new(ptype: impl Into<String>, rule: RuleTuple) -> Result<Self> {
        let ptype = ptype.into();
        let section = Section::from_ptype(&ptype)?;
        Ok(Self {
            section,
            ptype,
            rule,
        })
    }

    /// Whether this rule belongs to `(section, ptype)`.
    pub fn belongs_to(&self, section: Section, ptype: &str) -> bool {
        self.section == section && self.ptype == ptype
    }
}

/// Contract a storage backend fulfils for the rule manager.
///
/// Incremental operations default to [`PersistenceError::Unimplemented`];
/// callers treat that as "nothing to mirror".
pub trait RuleAdapter: Send + Sync {
    /// Load every stored rule.
    fn load_all(&self) -> Result<Vec<StoredRule>>;

    /// Replace the stored rule set.
    fn save_all(&self, rules: &[StoredRule]) -> Result<()>;

    /// Persist one added rule.
    fn add_rule(&self, _section: Section, _ptype: &str, _rule: &RuleTuple) -> Result<()> {
        Err(PersistenceError::Unimplemented("add_rule"))
    }

    /// Remove one rule.
    fn remove_rule(&self, _section: Section, _ptype: &str, _rule: &RuleTuple) -> Result<()> {
        Err(PersistenceError::Unimplemented("remove_rule"))
    }

    /// Remove every rule matching the field filter.
    fn remove_filtered_rule(
        &self,
        _section: Section,
        _ptype: &str,
        _field_index: usize,
        _field_values: &[&str],
    ) -> Result<()> {
        Err(PersistenceError::Unimplemented("remove_filtered_rule"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unimplemented_error_display() {
        let err = PersistenceError::Unimplemented("remove_rule");
        assert_eq!(format!("{err}"), "not implemented: remove_rule");
    }

    #[test]
    fn stored_rule_derives_section() {
        let rule = StoredRule::new("g2", RuleTuple::from(["a", "b"])).unwrap();
        assert_eq!(rule.section, Section::Grouping);
        assert!(rule.belongs_to(Section::Grouping, "g2"));
        assert!(StoredRule::new("z", RuleTuple::default()).is_err());
    }
}
