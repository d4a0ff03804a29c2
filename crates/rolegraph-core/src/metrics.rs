//! ---
//! rg_section: "05-rule-manager"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule manager orchestration over model, resolver and adapter."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Rule manager metrics exported via Prometheus.
#[derive(Clone)]
pub struct RuleMetrics {
    rules_added_total: IntCounter,
    rules_removed_total: IntCounter,
    role_link_rebuilds_total: IntCounter,
    adapter_failures_total: IntCounter,
}

impl std::fmt::Debug for RuleMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleMetrics")
            .field("rules_added_total", &self.rules_added_total.get())
            .field("rules_removed_total", &self.rules_removed_total.get())
            .field("role_link_rebuilds_total", &self.role_link_rebuilds_total.get())
            .field("adapter_failures_total", &self.adapter_failures_total.get())
            .finish()
    }
}

impl RuleMetrics {
    /// Register metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> anyhow::Result<Self> {
        let rules_added_total =
            IntCounter::new("rolegraph_rules_added_total", "Rules added to the model")?;
        let rules_removed_total =
            IntCounter::new("rolegraph_rules_removed_total", "Rules removed from the model")?;
        let role_link_rebuilds_total = IntCounter::new(
            "rolegraph_role_link_rebuilds_total",
            "Role graph rebuilds from grouping rules",
        )?;
        let adapter_failures_total = IntCounter::new(
            "rolegraph_adapter_failures_total",
            "Storage adapter operations that failed",
        )?;

        registry.register(Box::new(rules_added_total.clone()))?;
        registry.register(Box::new(rules_removed_total.clone()))?;
        registry.register(Box::new(role_link_rebuilds_total.clone()))?;
        registry.register(Box::new(adapter_failures_total.clone()))?;

        Ok(Self {
            rules_added_total,
            rules_removed_total,
            role_link_rebuilds_total,
            adapter_failures_total,
        })
    }

    pub(crate) fn inc_added(&self) {
        self.rules_added_total.inc();
    }

    pub(crate) fn inc_removed(&self, count: usize) {
        self.rules_removed_total.inc_by(count as u64);
    }

    pub(crate) fn inc_rebuild(&self) {
        self.role_link_rebuilds_total.inc();
    }

    pub(crate) fn inc_adapter_failure(&self) {
        self.adapter_failures_total.inc();
    }

    /// Rules added so far.
    pub fn rules_added(&self) -> u64 {
        self.rules_added_total.get()
    }

    /// Rules removed so far.
    pub fn rules_removed(&self) -> u64 {
        self.rules_removed_total.get()
    }

    /// Role graph rebuilds so far.
    pub fn role_link_rebuilds(&self) -> u64 {
        self.role_link_rebuilds_total.get()
    }

    /// Failed adapter calls so far.
    pub fn adapter_failures(&self) -> u64 {
        self.adapter_failures_total.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_increment() {
        let registry = Arc::new(Registry::new());
        let metrics = RuleMetrics::new(registry.clone()).unwrap();
        metrics.inc_added();
        metrics.inc_removed(3);
        metrics.inc_rebuild();
        metrics.inc_adapter_failure();
        assert_eq!(metrics.rules_removed(), 3);
        assert_eq!(registry.gather().len(), 4);
    }

    #[test]
    fn double_registration_fails() {
        let registry = Arc::new(Registry::new());
        RuleMetrics::new(registry.clone()).unwrap();
        assert!(RuleMetrics::new(registry).is_err());
    }
}
