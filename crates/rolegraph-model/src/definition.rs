//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
//! Text forms of model definitions and rules.
//!
//! Definition documents use the familiar header layout:
//!
//! ```text
//! [request_definition]
//! r = sub, dom, obj, act
//!
//! [role_definition]
//! g = _, _, _
//! ```
//!
//! Rule lines are comma separated with the policy type first:
//! `g, alice, admin, corp`.
use tracing::debug;

use crate::errors::{ModelError, Result};
use crate::model::Model;
use crate::rule::RuleTuple;
use crate::section::Section;

impl Model {
    /// Parse a definition document. Only the sections it declares exist afterwards.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut model = Model::empty();
        let mut current: Option<Section> = None;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(Section::from_header(header.trim())?);
                continue;
            }

            let section = current.ok_or_else(|| ModelError::MalformedLine(line.to_owned()))?;
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ModelError::MalformedLine(line.to_owned()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ModelError::MalformedLine(line.to_owned()));
            }
            if !model.add_def(section, key, value.trim()) {
                return Err(ModelError::EmptyDefinition {
                    section,
                    key: key.to_owned(),
                });
            }
            debug!(%section, key, "definition loaded");
        }
        Ok(model)
    }

    /// Load one rule line, e.g. `p, alice, corp, /data, read`.
    ///
    /// Blank and `#` lines are ignored and yield `Ok(false)`. Otherwise the
    /// rule is added with the usual duplicate check.
    pub fn load_rule_line(&mut self, line: &str) -> Result<bool> {
        match parse_rule_line(line)? {
            Some((ptype, rule)) => {
                let section = Section::from_ptype(&ptype)?;
                self.add(section, &ptype, rule)
            }
            None => Ok(false),
        }
    }
}

/// Split a rule line into its policy type and fields.
///
/// Returns `None` for blank lines and comments.
pub fn parse_rule_line(line: &str) -> Result<Option<(String, RuleTuple)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut tokens = line.split(',').map(str::trim);
    let ptype = match tokens.next() {
        Some(ptype) if !ptype.is_empty() => ptype.to_owned(),
        _ => return Err(ModelError::MalformedLine(line.to_owned())),
    };
    Ok(Some((ptype, tokens.map(str::to_owned).collect())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_TEXT: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _
g2 = _, _, _

# effect of matching policies
[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act # plain rbac
"#;

    #[test]
    fn parses_definition_documents() {
        let model = Model::from_text(MODEL_TEXT).unwrap();
        assert_eq!(
            model.assertion(Section::Policy, "p").unwrap().tokens,
            vec!["p_sub", "p_obj", "p_act"]
        );
        assert!(model.has_assertion(Section::Grouping, "g2"));
        assert_eq!(
            model.expression(Section::Matcher, "m").unwrap(),
            "g(r_sub, p_sub) && r_obj == p_obj && r_act == p_act"
        );
        assert_eq!(model.assertions(Section::Grouping).count(), 2);
    }

    #[test]
    fn rejects_unknown_headers_and_orphan_lines() {
        assert!(matches!(
            Model::from_text("[policy_rules]\np = sub"),
            Err(ModelError::UnsupportedSection(_))
        ));
        assert!(matches!(
            Model::from_text("p = sub, obj"),
            Err(ModelError::MalformedLine(_))
        ));
        assert!(matches!(
            Model::from_text("[matchers]\nm ="),
            Err(ModelError::EmptyDefinition { .. })
        ));
    }

    #[test]
    fn rule_lines_load_into_matching_assertion() {
        let mut model = Model::new();
        assert!(model.load_rule_line("p, alice, corp, /data, read").unwrap());
        assert!(model.load_rule_line("g, alice, admin, corp").unwrap());
        assert!(!model.load_rule_line("g, alice, admin, corp").unwrap());
        assert!(!model.load_rule_line("# comment").unwrap());
        assert!(!model.load_rule_line("   ").unwrap());

        assert_eq!(
            model.get_rule(Section::Policy, "p").unwrap()[0],
            RuleTuple::from(["alice", "corp", "/data", "read"])
        );
        assert!(matches!(
            model.load_rule_line("x, a, b"),
            Err(ModelError::UnsupportedSection(_))
        ));
        assert!(matches!(
            model.load_rule_line("g3, a, b, c"),
            Err(ModelError::UndefinedAssertion { .. })
        ));
    }
}
