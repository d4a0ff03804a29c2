//! ---
//! rg_section: "07-testing"
//! rg_subsection: "integration-tests"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Model store properties: uniqueness, filtering, arity."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use rolegraph_model::{Model, ModelError, RuleTuple, Section};
use rolegraph_tests::tuple;

fn policy_rules() -> Vec<RuleTuple> {
    vec![
        tuple(["alice", "corp", "/data", "read"]),
        tuple(["alice", "corp", "/data", "write"]),
        tuple(["bob", "corp", "/data", "read"]),
        tuple(["bob", "lab", "/logs", "read"]),
        tuple(["carol", "lab"]),
    ]
}

fn seeded_model() -> Model {
    let mut model = Model::new();
    model
        .replace_rules(Section::Policy, "p", policy_rules())
        .unwrap();
    model
}

#[test]
fn idempotent_insertion() {
    let mut model = Model::new();
    let rule = tuple(["alice", "corp", "/data", "read"]);
    assert!(model.add(Section::Policy, "p", rule.clone()).unwrap());
    let once = model.get_rule(Section::Policy, "p").unwrap().to_vec();
    assert!(!model.add(Section::Policy, "p", rule).unwrap());
    assert_eq!(model.get_rule(Section::Policy, "p").unwrap(), once.as_slice());
}

#[test]
fn filtered_removal_removes_exactly_the_matches() {
    let filters: Vec<(usize, Vec<&str>)> = vec![
        (0, vec!["alice"]),
        (1, vec!["lab"]),
        (0, vec!["", "corp"]),
        (2, vec!["/data", "read"]),
        (1, vec!["lab", "/logs"]),
        (3, vec!["read"]),
    ];
    for (field_index, values) in filters {
        let mut model = seeded_model();
        let before = model.get_rule(Section::Policy, "p").unwrap().to_vec();
        model
            .remove_filtered_rule(Section::Policy, "p", field_index, &values)
            .unwrap();
        let after = model.get_rule(Section::Policy, "p").unwrap().to_vec();

        assert!(after
            .iter()
            .all(|rule| !rule.matches_filter(field_index, &values)));
        for rule in &before {
            if !after.contains(rule) {
                assert!(rule.matches_filter(field_index, &values));
            }
        }
        let survivors: Vec<_> = before
            .iter()
            .filter(|rule| !rule.matches_filter(field_index, &values))
            .cloned()
            .collect();
        assert_eq!(after, survivors, "order preserved for filter {field_index}");
    }
}

#[test]
fn short_tuples_never_match_filters() {
    let mut model = seeded_model();
    assert!(model
        .remove_filtered_rule(Section::Policy, "p", 1, &["lab", ""])
        .unwrap());
    assert!(model
        .has_rule(Section::Policy, "p", &tuple(["carol", "lab"]))
        .unwrap());
    assert!(!model
        .has_rule(Section::Policy, "p", &tuple(["bob", "lab", "/logs", "read"]))
        .unwrap());
    assert!(model
        .get_filtered_rule(Section::Policy, "p", 2, &[""])
        .unwrap()
        .iter()
        .all(|rule| rule.arity() >= 3));
}

#[test]
fn values_for_field_are_distinct() {
    let model = seeded_model();
    let mut subjects = model
        .get_values_for_field_in_rule(Section::Policy, "p", 0)
        .unwrap();
    subjects.sort();
    assert_eq!(subjects, vec!["alice", "bob", "carol"]);
    assert_eq!(
        model
            .get_values_for_field_in_rule(Section::Policy, "p", 3)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn clear_keeps_definitions() {
    let mut model = seeded_model();
    model.clear();
    assert!(model.get_rule(Section::Policy, "p").unwrap().is_empty());
    assert!(model.expression(Section::Matcher, "m").is_ok());
}

#[test]
fn undefined_and_ruleless_sections_are_errors() {
    let mut model = Model::new();
    assert!(matches!(
        model.get_rule(Section::Policy, "p2"),
        Err(ModelError::UndefinedAssertion { .. })
    ));
    assert!(matches!(
        model.add(Section::Matcher, "m", tuple(["x"])),
        Err(ModelError::NoRuleStorage(Section::Matcher))
    ));
}

#[test]
fn grouping_arity_is_enforced() {
    let mut model = Model::new();
    assert!(matches!(
        model.add(Section::Grouping, "g", tuple(["alice", "admin"])),
        Err(ModelError::GroupingArity { expected: 3, found: 2, .. })
    ));
    assert!(model
        .add(Section::Grouping, "g", tuple(["alice", "admin", "corp", "extra"]))
        .unwrap());
}
