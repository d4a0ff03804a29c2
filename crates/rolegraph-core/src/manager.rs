//! ---
//! rg_section: "05-rule-manager"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule manager orchestration over model, resolver and adapter."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rolegraph_common::EngineConfig;
use rolegraph_model::{
    util::array_remove_duplicates, Model, RuleTuple, Section, DEFAULT_GROUPING_PTYPE,
    DEFAULT_POLICY_PTYPE,
};
use rolegraph_persistence::{CsvFileAdapter, PersistenceError, RuleAdapter, StoredRule};
use rolegraph_roles::{RoleLink, RoleManager, DEFAULT_MAX_HIERARCHY_DEPTH};
use tracing::{debug, info, warn};

use crate::errors::{ManagerError, Result};
use crate::metrics::RuleMetrics;
use crate::state::EngineState;

/// Builder for [`RuleManager`].
pub struct RuleManagerBuilder {
    model: Option<Model>,
    max_hierarchy_depth: usize,
    auto_build_role_links: bool,
    auto_save: bool,
    adapter: Option<Arc<dyn RuleAdapter>>,
    metrics: Option<RuleMetrics>,
}

impl Default for RuleManagerBuilder {
    fn default() -> Self {
        Self {
            model: None,
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
            auto_build_role_links: true,
            auto_save: true,
            adapter: None,
            metrics: None,
        }
    }
}

impl RuleManagerBuilder {
    /// Apply the flags and depth from a loaded configuration.
    ///
    /// A configured `storage.rule_file` attaches a [`CsvFileAdapter`].
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.max_hierarchy_depth = config.role_manager.max_hierarchy_depth;
        self.auto_build_role_links = config.auto_build_role_links;
        self.auto_save = config.auto_save;
        if let Some(path) = &config.storage.rule_file {
            self.adapter = Some(Arc::new(CsvFileAdapter::new(path)));
        }
        self
    }

    /// Start from `model` instead of the built-in definitions.
    pub fn model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Hop ceiling for role and user closure queries.
    pub fn max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }

    /// Rebuild the role graph after every grouping mutation.
    pub fn auto_build_role_links(mut self, enabled: bool) -> Self {
        self.auto_build_role_links = enabled;
        self
    }

    /// Mirror mutations to the adapter.
    pub fn auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Attach a storage adapter.
    pub fn adapter(mut self, adapter: Arc<dyn RuleAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Record activity in `metrics`.
    pub fn metrics(mut self, metrics: RuleMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the manager, materialising links for any grouping rules already in the model.
    pub fn build(self) -> Result<RuleManager> {
        let model = self.model.unwrap_or_else(Model::new);
        let mut state = EngineState::new(model, self.max_hierarchy_depth);
        state.rebuild_role_links()?;
        Ok(RuleManager {
            state: RwLock::new(state),
            adapter: self.adapter,
            auto_build_role_links: AtomicBool::new(self.auto_build_role_links),
            auto_save: AtomicBool::new(self.auto_save),
            metrics: self.metrics,
        })
    }
}

/// Thread-safe facade over the rule model and the role graph.
///
/// Mutations take one exclusive lock over both; queries share a read lock.
/// A role graph rebuild swaps in a freshly built graph, so readers see either
/// the old graph or the new one. Adapter calls happen after the lock is released.
///
/// With auto-rebuild disabled, grouping mutations leave the role graph
/// untouched until [`RuleManager::build_role_links`] is called.
///
/// Adapter calls are not serialised with the in-memory mutations. Two writers
/// racing on the same rule can reach the adapter in the opposite order from
/// the one they took the lock in, leaving the store and memory disagreeing.
/// Callers that need the store to match memory exactly should serialise their
/// writes or follow up with [`RuleManager::save_policy`].
pub struct RuleManager {
    state: RwLock<EngineState>,
    adapter: Option<Arc<dyn RuleAdapter>>,
    auto_build_role_links: AtomicBool,
    auto_save: AtomicBool,
    metrics: Option<RuleMetrics>,
}

impl Default for RuleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleManager {
    /// Manager over the built-in model with default settings and no adapter.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EngineState::new(Model::new(), DEFAULT_MAX_HIERARCHY_DEPTH)),
            adapter: None,
            auto_build_role_links: AtomicBool::new(true),
            auto_save: AtomicBool::new(true),
            metrics: None,
        }
    }

    /// Start building a manager.
    pub fn builder() -> RuleManagerBuilder {
        RuleManagerBuilder::default()
    }

    /// Manager honouring a loaded configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    /// Toggle automatic role graph rebuilds.
    pub fn enable_auto_build_role_links(&self, enabled: bool) {
        self.auto_build_role_links.store(enabled, Ordering::Release);
    }

    /// Toggle mirroring of mutations to the adapter.
    pub fn enable_auto_save(&self, enabled: bool) {
        self.auto_save.store(enabled, Ordering::Release);
    }

    /// Whether grouping mutations rebuild the role graph.
    pub fn auto_build_role_links_enabled(&self) -> bool {
        self.auto_build_role_links.load(Ordering::Acquire)
    }

    /// Attached metrics, if any.
    pub fn metrics(&self) -> Option<&RuleMetrics> {
        self.metrics.as_ref()
    }

    // ----- role hierarchy -------------------------------------------------

    /// Give `user` the role `role` within `domain`.
    pub fn add_role_for_user_in_domain(&self, user: &str, role: &str, domain: &str) -> Result<bool> {
        self.add_named_grouping_policy(DEFAULT_GROUPING_PTYPE, [user, role, domain])
    }

    /// Remove every grouping rule whose first field is `user`.
    pub fn delete_user(&self, user: &str) -> Result<bool> {
        self.remove_filtered_named_grouping_policy(DEFAULT_GROUPING_PTYPE, 0, &[user])
    }

    /// Remove `role` from the hierarchy and every policy rule it is the subject of.
    ///
    /// Grouping rules are matched on field 1 and policy rules on field 0 only;
    /// a role appearing elsewhere in a policy rule is left alone.
    pub fn delete_role(&self, role: &str) -> Result<()> {
        let (grouping, policy) = {
            let mut state = self.state.write();
            // Both assertions must exist before either rule set is touched.
            state.model.assertion(Section::Grouping, DEFAULT_GROUPING_PTYPE)?;
            state.model.assertion(Section::Policy, DEFAULT_POLICY_PTYPE)?;
            let grouping = remove_filtered(
                &mut state.model,
                Section::Grouping,
                DEFAULT_GROUPING_PTYPE,
                1,
                &[role],
            )?;
            let policy = remove_filtered(
                &mut state.model,
                Section::Policy,
                DEFAULT_POLICY_PTYPE,
                0,
                &[role],
            )?;
            if self.auto_build_role_links_enabled() {
                self.rebuild_locked(&mut state)?;
            }
            (grouping, policy)
        };
        self.record_removed(grouping + policy);
        info!(role, grouping, policy, "role deleted");

        // Mirror both removals even if the first one fails; report the first error.
        let grouping_mirror = if grouping > 0 {
            self.persist(|adapter| {
                adapter.remove_filtered_rule(Section::Grouping, DEFAULT_GROUPING_PTYPE, 1, &[role])
            })
        } else {
            Ok(())
        };
        let policy_mirror = if policy > 0 {
            self.persist(|adapter| {
                adapter.remove_filtered_rule(Section::Policy, DEFAULT_POLICY_PTYPE, 0, &[role])
            })
        } else {
            Ok(())
        };
        grouping_mirror.and(policy_mirror)
    }

    /// Roles reachable from `name`, breadth-first.
    pub fn get_roles_for_user(&self, name: &str, domain: &[&str]) -> Vec<String> {
        self.state.read().roles.get_roles(name, domain)
    }

    /// Roles reachable from `name` within `domain`.
    pub fn get_roles_for_user_in_domain(&self, name: &str, domain: &str) -> Vec<String> {
        self.get_roles_for_user(name, &[domain])
    }

    /// Names that reach `name`, breadth-first.
    pub fn get_users_for_role(&self, name: &str, domain: &[&str]) -> Vec<String> {
        self.state.read().roles.get_users(name, domain)
    }

    /// Names that reach `name` within `domain`.
    pub fn get_users_for_role_in_domain(&self, name: &str, domain: &str) -> Vec<String> {
        self.get_users_for_role(name, &[domain])
    }

    /// Whether `role` is among the roles of `name`.
    pub fn has_role_for_user(&self, name: &str, role: &str, domain: &[&str]) -> bool {
        self.get_roles_for_user(name, domain)
            .iter()
            .any(|candidate| candidate == role)
    }

    /// Whether `role` is among the roles of `name` within `domain`.
    pub fn has_role_for_user_in_domain(&self, name: &str, role: &str, domain: &str) -> bool {
        self.has_role_for_user(name, role, &[domain])
    }

    /// Reachability query on the role graph; a name always reaches itself.
    pub fn has_link(&self, name1: &str, name2: &str, domain: &[&str]) -> bool {
        self.state.read().roles.has_link(name1, name2, domain)
    }

    /// Direct links in the current role graph.
    pub fn role_links(&self) -> Vec<RoleLink> {
        self.state.read().roles.links()
    }

    /// Distinct roles (field 1) across every grouping assertion.
    pub fn get_all_roles(&self) -> Result<Vec<String>> {
        let state = self.state.read();
        let mut roles = Vec::new();
        for ast in state.model.assertions(Section::Grouping) {
            roles.extend(
                state
                    .model
                    .get_values_for_field_in_rule(Section::Grouping, &ast.key, 1)?,
            );
        }
        array_remove_duplicates(&mut roles);
        Ok(roles)
    }

    /// Distinct roles (field 1) of one grouping assertion.
    pub fn get_all_named_roles(&self, ptype: &str) -> Result<Vec<String>> {
        self.get_values_for_field_in_rule(Section::Grouping, ptype, 1)
    }

    /// Distinct policy subjects (field 0 of `p`).
    pub fn get_all_subjects(&self) -> Result<Vec<String>> {
        self.get_values_for_field_in_rule(Section::Policy, DEFAULT_POLICY_PTYPE, 0)
    }

    /// Distinct domains (field 2 of `g`).
    pub fn get_all_domains(&self) -> Result<Vec<String>> {
        self.get_values_for_field_in_rule(Section::Grouping, DEFAULT_GROUPING_PTYPE, 2)
    }

    /// Rebuild the role graph from every grouping assertion.
    pub fn build_role_links(&self) -> Result<()> {
        let mut state = self.state.write();
        self.rebuild_locked(&mut state)
    }

    // ----- grouping rules -------------------------------------------------

    /// Add a rule to the default grouping assertion.
    pub fn add_grouping_policy(&self, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.add_named_grouping_policy(DEFAULT_GROUPING_PTYPE, rule)
    }

    /// Add a rule to grouping assertion `ptype`.
    pub fn add_named_grouping_policy(&self, ptype: &str, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.add_rule(Section::Grouping, ptype, rule.into())
    }

    /// Remove a rule from the default grouping assertion.
    pub fn remove_grouping_policy(&self, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.remove_named_grouping_policy(DEFAULT_GROUPING_PTYPE, rule)
    }

    /// Remove a rule from grouping assertion `ptype`.
    pub fn remove_named_grouping_policy(
        &self,
        ptype: &str,
        rule: impl Into<RuleTuple>,
    ) -> Result<bool> {
        self.remove_rule(Section::Grouping, ptype, &rule.into())
    }

    /// Remove default grouping rules matching the field filter.
    pub fn remove_filtered_grouping_policy(
        &self,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<bool> {
        self.remove_filtered_named_grouping_policy(DEFAULT_GROUPING_PTYPE, field_index, field_values)
    }

    /// Remove grouping rules of `ptype` matching the field filter.
    pub fn remove_filtered_named_grouping_policy(
        &self,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<bool> {
        self.remove_filtered_rule(Section::Grouping, ptype, field_index, field_values)
    }

    /// Whether the default grouping assertion holds `rule`.
    pub fn has_grouping_policy(&self, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.has_rule(Section::Grouping, DEFAULT_GROUPING_PTYPE, &rule.into())
    }

    /// Rules of the default grouping assertion.
    pub fn get_grouping_policy(&self) -> Result<Vec<RuleTuple>> {
        self.get_rule(Section::Grouping, DEFAULT_GROUPING_PTYPE)
    }

    /// Default grouping rules matching the field filter.
    pub fn get_filtered_grouping_policy(
        &self,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<Vec<RuleTuple>> {
        self.get_filtered_rule(
            Section::Grouping,
            DEFAULT_GROUPING_PTYPE,
            field_index,
            field_values,
        )
    }

    // ----- policy rules ---------------------------------------------------

    /// Add a rule to the default policy assertion.
    pub fn add_policy(&self, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.add_named_policy(DEFAULT_POLICY_PTYPE, rule)
    }

    /// Add a rule to policy assertion `ptype`.
    pub fn add_named_policy(&self, ptype: &str, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.add_rule(Section::Policy, ptype, rule.into())
    }

    /// Remove a rule from the default policy assertion.
    pub fn remove_policy(&self, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.remove_named_policy(DEFAULT_POLICY_PTYPE, rule)
    }

    /// Remove a rule from policy assertion `ptype`.
    pub fn remove_named_policy(&self, ptype: &str, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.remove_rule(Section::Policy, ptype, &rule.into())
    }

    /// Remove default policy rules matching the field filter.
    pub fn remove_filtered_policy(&self, field_index: usize, field_values: &[&str]) -> Result<bool> {
        self.remove_filtered_named_policy(DEFAULT_POLICY_PTYPE, field_index, field_values)
    }

    /// Remove policy rules of `ptype` matching the field filter.
    pub fn remove_filtered_named_policy(
        &self,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<bool> {
        self.remove_filtered_rule(Section::Policy, ptype, field_index, field_values)
    }

    /// Whether the default policy assertion holds `rule`.
    pub fn has_policy(&self, rule: impl Into<RuleTuple>) -> Result<bool> {
        self.has_rule(Section::Policy, DEFAULT_POLICY_PTYPE, &rule.into())
    }

    /// Rules of the default policy assertion.
    pub fn get_policy(&self) -> Result<Vec<RuleTuple>> {
        self.get_named_policy(DEFAULT_POLICY_PTYPE)
    }

    /// Rules of policy assertion `ptype`.
    pub fn get_named_policy(&self, ptype: &str) -> Result<Vec<RuleTuple>> {
        self.get_rule(Section::Policy, ptype)
    }

    /// Default policy rules matching the field filter.
    pub fn get_filtered_policy(
        &self,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<Vec<RuleTuple>> {
        self.get_filtered_rule(Section::Policy, DEFAULT_POLICY_PTYPE, field_index, field_values)
    }

    // ----- generic reads --------------------------------------------------

    /// Snapshot of one assertion's rules.
    pub fn get_rule(&self, section: Section, ptype: &str) -> Result<Vec<RuleTuple>> {
        Ok(self.state.read().model.get_rule(section, ptype)?.to_vec())
    }

    /// Rules of one assertion matching the field filter.
    pub fn get_filtered_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<Vec<RuleTuple>> {
        Ok(self
            .state
            .read()
            .model
            .get_filtered_rule(section, ptype, field_index, field_values)?)
    }

    /// Exact membership test.
    pub fn has_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<bool> {
        Ok(self.state.read().model.has_rule(section, ptype, rule)?)
    }

    /// Distinct values at one field position.
    pub fn get_values_for_field_in_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
    ) -> Result<Vec<String>> {
        Ok(self
            .state
            .read()
            .model
            .get_values_for_field_in_rule(section, ptype, field_index)?)
    }

    /// Every policy and grouping rule as `(section, ptype, rule)`.
    pub fn rule_lines(&self) -> Vec<(Section, String, RuleTuple)> {
        self.state.read().model.rule_lines()
    }

    /// Normalised matcher expression (`m`).
    pub fn matcher_expression(&self) -> Result<String> {
        Ok(self.state.read().model.expression(Section::Matcher, "m")?.to_owned())
    }

    /// Normalised effect expression (`e`).
    pub fn effect_expression(&self) -> Result<String> {
        Ok(self.state.read().model.expression(Section::Effect, "e")?.to_owned())
    }

    // ----- persistence ----------------------------------------------------

    /// Replace every rule with the adapter's contents.
    ///
    /// The replacement is applied under one write lock; on error the previous
    /// rules and role graph stay in place.
    pub fn load_policy(&self) -> Result<usize> {
        let adapter = self.adapter.as_ref().ok_or(ManagerError::NoAdapter)?;
        let stored = adapter.load_all().map_err(|err| self.adapter_failure(err))?;

        let mut grouped: BTreeMap<(Section, String), Vec<RuleTuple>> = BTreeMap::new();
        for rule in stored {
            grouped
                .entry((rule.section, rule.ptype))
                .or_default()
                .push(rule.rule);
        }

        let mut state = self.state.write();
        let mut next = EngineState {
            model: state.model.clone(),
            roles: state.roles.clone(),
        };
        next.model.clear();
        let mut loaded = 0;
        for ((section, ptype), rules) in grouped {
            loaded += next.model.replace_rules(section, &ptype, rules)?;
        }
        if self.auto_build_role_links_enabled() {
            self.rebuild_locked(&mut next)?;
        }
        *state = next;
        info!(rules = loaded, "policy loaded");
        Ok(loaded)
    }

    /// Write every rule to the adapter, replacing its contents.
    pub fn save_policy(&self) -> Result<()> {
        let adapter = self.adapter.as_ref().ok_or(ManagerError::NoAdapter)?;
        let stored: Vec<_> = self
            .rule_lines()
            .into_iter()
            .map(|(section, ptype, rule)| StoredRule {
                section,
                ptype,
                rule,
            })
            .collect();
        adapter
            .save_all(&stored)
            .map_err(|err| self.adapter_failure(err))?;
        info!(rules = stored.len(), "policy saved");
        Ok(())
    }

    /// Drop every policy and grouping rule and every role link, in memory only.
    pub fn clear_policy(&self) {
        let mut state = self.state.write();
        state.model.clear();
        state.roles.clear();
        debug!("policy cleared");
    }

    // ----- internals ------------------------------------------------------

    fn add_rule(&self, section: Section, ptype: &str, rule: RuleTuple) -> Result<bool> {
        let added = {
            let mut state = self.state.write();
            let added = state.model.add(section, ptype, rule.clone())?;
            self.after_mutation(&mut state, section)?;
            added
        };
        if !added {
            return Ok(false);
        }
        if let Some(metrics) = &self.metrics {
            metrics.inc_added();
        }
        debug!(%section, ptype, rule = %rule, "rule added");
        self.persist(|adapter| adapter.add_rule(section, ptype, &rule))?;
        Ok(true)
    }

    fn remove_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<bool> {
        let removed = {
            let mut state = self.state.write();
            let removed = state.model.remove(section, ptype, rule)?;
            self.after_mutation(&mut state, section)?;
            removed
        };
        if !removed {
            return Ok(false);
        }
        self.record_removed(1);
        debug!(%section, ptype, rule = %rule, "rule removed");
        self.persist(|adapter| adapter.remove_rule(section, ptype, rule))?;
        Ok(true)
    }

    fn remove_filtered_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<bool> {
        let removed = {
            let mut state = self.state.write();
            let removed =
                remove_filtered(&mut state.model, section, ptype, field_index, field_values)?;
            self.after_mutation(&mut state, section)?;
            removed
        };
        if removed == 0 {
            return Ok(false);
        }
        self.record_removed(removed);
        self.persist(|adapter| {
            adapter.remove_filtered_rule(section, ptype, field_index, field_values)
        })?;
        Ok(true)
    }

    fn after_mutation(&self, state: &mut EngineState, section: Section) -> Result<()> {
        if section == Section::Grouping && self.auto_build_role_links_enabled() {
            self.rebuild_locked(state)?;
        }
        Ok(())
    }

    fn rebuild_locked(&self, state: &mut EngineState) -> Result<()> {
        let started = Instant::now();
        let replayed = state.rebuild_role_links()?;
        if let Some(metrics) = &self.metrics {
            metrics.inc_rebuild();
        }
        debug!(
            rules = replayed,
            links = state.roles.link_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "role graph rebuilt"
        );
        Ok(())
    }

    fn record_removed(&self, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(metrics) = &self.metrics {
            metrics.inc_removed(count);
        }
    }

    fn persist<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&dyn RuleAdapter) -> rolegraph_persistence::Result<()>,
    {
        if !self.auto_save.load(Ordering::Acquire) {
            return Ok(());
        }
        let Some(adapter) = self.adapter.as_deref() else {
            return Ok(());
        };
        match op(adapter) {
            Ok(()) => Ok(()),
            Err(PersistenceError::Unimplemented(operation)) => {
                debug!(operation, "adapter does not mirror this operation");
                Ok(())
            }
            Err(err) => Err(self.adapter_failure(err)),
        }
    }

    fn adapter_failure(&self, err: PersistenceError) -> ManagerError {
        warn!(error = %err, "storage adapter failed");
        if let Some(metrics) = &self.metrics {
            metrics.inc_adapter_failure();
        }
        ManagerError::Adapter(err)
    }
}

fn remove_filtered(
    model: &mut Model,
    section: Section,
    ptype: &str,
    field_index: usize,
    field_values: &[&str],
) -> rolegraph_model::Result<usize> {
    let before = model.get_rule(section, ptype)?.len();
    model.remove_filtered_rule(section, ptype, field_index, field_values)?;
    Ok(before - model.get_rule(section, ptype)?.len())
}
