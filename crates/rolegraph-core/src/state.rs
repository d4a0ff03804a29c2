//! ---
//! rg_section: "05-rule-manager"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule manager orchestration over model, resolver and adapter."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use rolegraph_model::{Model, Result};
use rolegraph_roles::DefaultRoleManager;

/// Model and role graph guarded together by the manager's lock.
#[derive(Debug, Clone)]
pub(crate) struct EngineState {
    pub(crate) model: Model,
    pub(crate) roles: DefaultRoleManager,
}

impl EngineState {
    pub(crate) fn new(model: Model, max_hierarchy_depth: usize) -> Self {
        Self {
            model,
            roles: DefaultRoleManager::new(max_hierarchy_depth),
        }
    }

    /// Replay the grouping rules into a fresh graph and swap it in.
    ///
    /// On error the previous graph stays in place.
    pub(crate) fn rebuild_role_links(&mut self) -> Result<usize> {
        let mut fresh = DefaultRoleManager::new(self.roles.max_hierarchy_depth());
        let replayed = self.model.build_role_links(&mut fresh)?;
        fresh.print_roles();
        self.roles = fresh;
        Ok(replayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegraph_model::{RuleTuple, Section};
    use rolegraph_roles::RoleManager;

    #[test]
    fn rebuild_replaces_stale_links() {
        let mut state = EngineState::new(Model::new(), 10);
        state
            .model
            .add(Section::Grouping, "g", RuleTuple::from(["alice", "admin", "corp"]))
            .unwrap();
        assert_eq!(state.rebuild_role_links().unwrap(), 1);
        assert_eq!(state.roles.get_roles("alice", &["corp"]), vec!["admin"]);

        state.model.clear();
        assert_eq!(state.rebuild_role_links().unwrap(), 0);
        assert!(state.roles.is_empty());
    }

    #[test]
    fn rebuild_replays_every_grouping_assertion() {
        let mut model = Model::new();
        model.add_def(Section::Grouping, "g2", "_, _");
        model
            .add(Section::Grouping, "g", RuleTuple::from(["alice", "admin", "corp"]))
            .unwrap();
        model
            .add(Section::Grouping, "g2", RuleTuple::from(["/reports", "/data"]))
            .unwrap();

        let mut state = EngineState::new(model, 3);
        assert_eq!(state.rebuild_role_links().unwrap(), 2);
        assert_eq!(state.roles.max_hierarchy_depth(), 3);
        assert!(state.roles.has_link("/reports", "/data", &[]));
        assert!(!state.roles.has_link("alice", "admin", &[]));
    }
}
