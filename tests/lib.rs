//! ---
//! rg_section: "07-testing"
//! rg_subsection: "integration-tests"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Shared fixtures for rolegraph integration tests."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::sync::Arc;

use rolegraph_core::{RuleManager, RuleTuple};
use rolegraph_persistence::MemoryAdapter;

/// Hierarchy used across suites: alice -> admin -> superuser in `corp`.
pub const CORP_GROUPING: [[&str; 3]; 2] = [["alice", "admin", "corp"], ["admin", "superuser", "corp"]];

/// Manager seeded with [`CORP_GROUPING`] and one admin policy.
pub fn corp_manager() -> RuleManager {
    let manager = RuleManager::new();
    for [user, role, domain] in CORP_GROUPING {
        manager
            .add_role_for_user_in_domain(user, role, domain)
            .expect("seed grouping rule");
    }
    manager
        .add_policy(["admin", "corp", "/data", "read"])
        .expect("seed policy rule");
    manager
}

/// Manager mirroring into a fresh in-memory adapter.
pub fn memory_manager() -> (RuleManager, Arc<MemoryAdapter>) {
    let adapter = Arc::new(MemoryAdapter::new());
    let manager = RuleManager::builder()
        .adapter(adapter.clone())
        .build()
        .expect("manager over memory adapter");
    (manager, adapter)
}

/// Shorthand for building tuples in assertions.
pub fn tuple<const N: usize>(fields: [&str; N]) -> RuleTuple {
    RuleTuple::from(fields)
}
