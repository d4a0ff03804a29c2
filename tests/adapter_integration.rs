//! ---
//! rg_section: "07-testing"
//! rg_subsection: "integration-tests"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "CSV rule file adapter driven through the rule manager."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::fs;
use std::sync::Arc;

use rolegraph_core::{ManagerError, RuleManager};
use rolegraph_persistence::{CsvFileAdapter, RuleAdapter};
use rolegraph_tests::tuple;
use tempfile::tempdir;

fn manager_over(adapter: Arc<CsvFileAdapter>) -> RuleManager {
    let manager = RuleManager::builder().adapter(adapter).build().unwrap();
    manager.load_policy().unwrap();
    manager
}

#[test]
fn hand_written_rule_file_drives_queries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.csv");
    fs::write(
        &path,
        "# corp hierarchy\n\
         p, superuser, corp, /data, write\n\
         g, alice, admin, corp\n\
         g, admin, superuser, corp\n",
    )
    .unwrap();

    let manager = manager_over(Arc::new(CsvFileAdapter::new(&path)));
    assert_eq!(
        manager.get_roles_for_user_in_domain("alice", "corp"),
        vec!["admin", "superuser"]
    );
    assert_eq!(manager.get_all_subjects().unwrap(), vec!["superuser"]);
}

#[test]
fn incremental_mutations_survive_reload() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(CsvFileAdapter::new(dir.path().join("rules.csv")));

    let manager = manager_over(adapter.clone());
    manager.add_role_for_user_in_domain("alice", "admin", "corp").unwrap();
    manager.add_role_for_user_in_domain("bob", "admin", "corp").unwrap();
    manager.add_policy(["admin", "corp", "/data", "read"]).unwrap();
    manager.delete_user("bob").unwrap();
    manager.remove_policy(["admin", "corp", "/data", "read"]).unwrap();

    let reloaded = manager_over(adapter.clone());
    assert_eq!(
        reloaded.get_grouping_policy().unwrap(),
        vec![tuple(["alice", "admin", "corp"])]
    );
    assert!(reloaded.get_policy().unwrap().is_empty());
    assert_eq!(adapter.load_all().unwrap().len(), 1);
}

#[test]
fn empty_domain_reloads_with_full_arity() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(CsvFileAdapter::new(dir.path().join("rules.csv")));

    let manager = manager_over(adapter.clone());
    assert!(manager.add_role_for_user_in_domain("alice", "admin", "").unwrap());

    let reloaded = manager_over(adapter);
    assert_eq!(
        reloaded.get_grouping_policy().unwrap(),
        vec![tuple(["alice", "admin", ""])]
    );
    assert!(reloaded.has_role_for_user_in_domain("alice", "admin", ""));
}

#[test]
fn save_policy_rewrites_the_file() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(CsvFileAdapter::new(dir.path().join("rules.csv")));
    let manager = RuleManager::builder()
        .adapter(adapter.clone())
        .auto_save(false)
        .build()
        .unwrap();
    manager.add_role_for_user_in_domain("alice", "admin", "corp").unwrap();
    assert!(adapter.load_all().unwrap().is_empty());

    manager.save_policy().unwrap();
    let reloaded = manager_over(adapter);
    assert!(reloaded.has_role_for_user_in_domain("alice", "admin", "corp"));
}

#[test]
fn incompatible_rule_files_fail_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.csv");
    fs::write(&path, "g, alice, admin\n").unwrap();

    let manager = RuleManager::builder()
        .adapter(Arc::new(CsvFileAdapter::new(&path)))
        .build()
        .unwrap();
    assert!(matches!(manager.load_policy(), Err(ManagerError::Model(_))));

    fs::write(&path, "x, alice, admin\n").unwrap();
    assert!(matches!(manager.load_policy(), Err(ManagerError::Adapter(_))));
}
