//! ---
//! rg_section: "04-persistence"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Persistence abstractions and storage bindings."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use parking_lot::Mutex;
use rolegraph_model::{RuleTuple, Section};

use crate::{Result, RuleAdapter, StoredRule};

/// Adapter keeping rules in process memory.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    rules: Mutex<Vec<StoredRule>>,
}

impl MemoryAdapter {
    /// Create an empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored rules.
    pub fn rules(&self) -> Vec<StoredRule> {
        self.rules.lock().clone()
    }
}

impl RuleAdapter for MemoryAdapter {
    fn load_all(&self) -> Result<Vec<StoredRule>> {
        Ok(self.rules())
    }

    fn save_all(&self, rules: &[StoredRule]) -> Result<()> {
        *self.rules.lock() = rules.to_vec();
        Ok(())
    }

    fn add_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<()> {
        self.rules.lock().push(StoredRule {
            section,
            ptype: ptype.to_owned(),
            rule: rule.clone(),
        });
        Ok(())
    }

    fn remove_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<()> {
        self.rules
            .lock()
            .retain(|stored| !(stored.belongs_to(section, ptype) && stored.rule == *rule));
        Ok(())
    }

    fn remove_filtered_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<()> {
        self.rules.lock().retain(|stored| {
            !(stored.belongs_to(section, ptype)
                && stored.rule.matches_filter(field_index, field_values))
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_incremental_mutations() {
        let adapter = MemoryAdapter::new();
        let rule = RuleTuple::from(["alice", "admin", "corp"]);
        adapter.add_rule(Section::Grouping, "g", &rule).unwrap();
        adapter
            .add_rule(Section::Grouping, "g", &RuleTuple::from(["bob", "admin", "corp"]))
            .unwrap();
        adapter.remove_rule(Section::Grouping, "g", &rule).unwrap();
        assert_eq!(adapter.rules().len(), 1);

        adapter
            .remove_filtered_rule(Section::Grouping, "g", 1, &["admin"])
            .unwrap();
        assert!(adapter.load_all().unwrap().is_empty());
    }
}
