//! ---
//! rg_section: "07-testing"
//! rg_subsection: "integration-tests"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Role resolver closure, domain and cycle properties."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use rolegraph_roles::{DefaultRoleManager, RoleManager};

#[test]
fn closure_is_transitive() {
    let mut rm = DefaultRoleManager::default();
    rm.add_link("a", "b", &[]);
    rm.add_link("b", "c", &[]);
    let roles = rm.get_roles("a", &[]);
    assert!(roles.contains(&"b".to_owned()));
    assert!(roles.contains(&"c".to_owned()));
    assert!(rm.has_link("a", "c", &[]));
    assert!(!rm.has_link("c", "a", &[]));
}

#[test]
fn domains_are_isolated() {
    let mut rm = DefaultRoleManager::default();
    rm.add_link("a", "b", &["D1"]);
    assert_eq!(rm.get_roles("a", &["D1"]), vec!["b"]);
    assert!(rm.get_roles("a", &["D2"]).is_empty());
    assert!(rm.get_roles("a", &[]).is_empty());
    assert!(!rm.has_link("a", "b", &["D2"]));
}

#[test]
fn cycles_terminate_at_any_depth() {
    for depth in [1, 2, 10, 1_000] {
        let mut rm = DefaultRoleManager::new(depth);
        rm.add_link("a", "b", &[]);
        rm.add_link("b", "a", &[]);
        assert_eq!(rm.get_roles("a", &[]), vec!["b"], "depth {depth}");
        assert_eq!(rm.get_users("a", &[]), vec!["b"], "depth {depth}");
    }
}

#[test]
fn depth_ceiling_bounds_traversal() {
    let mut rm = DefaultRoleManager::new(2);
    for (child, parent) in [("r0", "r1"), ("r1", "r2"), ("r2", "r3")] {
        rm.add_link(child, parent, &[]);
    }
    assert_eq!(rm.get_roles("r0", &[]), vec!["r1", "r2"]);
    assert!(!rm.has_link("r0", "r3", &[]));
}

#[test]
fn breadth_first_discovery_order() {
    let mut rm = DefaultRoleManager::default();
    rm.add_link("u", "x", &[]);
    rm.add_link("u", "y", &[]);
    rm.add_link("x", "z", &[]);
    rm.add_link("y", "z", &[]);
    assert_eq!(rm.get_roles("u", &[]), vec!["x", "y", "z"]);
    assert_eq!(rm.get_users("z", &[]), vec!["x", "y", "u"]);
}

#[test]
fn clear_discards_every_domain() {
    let mut rm = DefaultRoleManager::default();
    rm.add_link("a", "b", &["D1"]);
    rm.add_link("a", "b", &[]);
    assert!(!rm.add_link("a", "b", &[]));
    rm.clear();
    assert!(rm.links().is_empty());
    assert!(rm.has_link("a", "a", &["D1"]));
}
