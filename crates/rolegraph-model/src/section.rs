//! ---
//! rg_section: "02-rule-model"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Rule tuples, assertions and the sectioned model store."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::{ModelError, Result};

/// Fixed sections of a model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Section {
    /// Request shape (`r`).
    #[strum(serialize = "r")]
    #[serde(rename = "r")]
    Request,
    /// Policy rules (`p`).
    #[strum(serialize = "p")]
    #[serde(rename = "p")]
    Policy,
    /// Grouping / role inheritance rules (`g`).
    #[strum(serialize = "g")]
    #[serde(rename = "g")]
    Grouping,
    /// Effect-combination expression (`e`).
    #[strum(serialize = "e")]
    #[serde(rename = "e")]
    Effect,
    /// Matcher expression (`m`).
    #[strum(serialize = "m")]
    #[serde(rename = "m")]
    Matcher,
}

impl Section {
    /// Whether assertions of this section own rule tuples.
    pub fn holds_rules(self) -> bool {
        matches!(self, Section::Policy | Section::Grouping)
    }

    /// Built-in definition installed by [`crate::Model::new`].
    pub fn default_definition(self) -> &'static str {
        match self {
            Section::Request => "sub, dom, obj, act",
            Section::Policy => "sub, dom, obj, act",
            Section::Grouping => "_, _, _",
            Section::Effect => "some(where (p.eft == allow)) && !some(where (p.eft == deny))",
            Section::Matcher => {
                "g(r.sub, p.sub, r.dom) && r.dom == p.dom && keyMatch(r.obj, p.obj) && regexMatch(r.act, p.act)"
            }
        }
    }

    /// Header naming the section in a model definition document.
    pub fn header(self) -> &'static str {
        match self {
            Section::Request => "request_definition",
            Section::Policy => "policy_definition",
            Section::Grouping => "role_definition",
            Section::Effect => "policy_effect",
            Section::Matcher => "matchers",
        }
    }

    /// Resolve a definition document header.
    pub fn from_header(header: &str) -> Result<Self> {
        match header {
            "request_definition" => Ok(Section::Request),
            "policy_definition" => Ok(Section::Policy),
            "role_definition" => Ok(Section::Grouping),
            "policy_effect" => Ok(Section::Effect),
            "matchers" => Ok(Section::Matcher),
            other => Err(ModelError::UnsupportedSection(other.to_owned())),
        }
    }

    /// Derive the section from a policy type such as `p`, `p2` or `g`.
    pub fn from_ptype(ptype: &str) -> Result<Self> {
        ptype
            .get(..1)
            .and_then(|prefix| prefix.parse().ok())
            .ok_or_else(|| ModelError::UnsupportedSection(ptype.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptype_prefix_selects_section() {
        assert_eq!(Section::from_ptype("g2").unwrap(), Section::Grouping);
        assert_eq!(Section::from_ptype("p").unwrap(), Section::Policy);
        assert!(Section::from_ptype("").is_err());
        assert!(Section::from_ptype("x").is_err());
    }

    #[test]
    fn section_names_round_trip_through_strum() {
        assert_eq!(Section::Grouping.to_string(), "g");
        assert_eq!("m".parse::<Section>().unwrap(), Section::Matcher);
        assert_eq!(Section::Effect.as_ref(), "e");
    }

    #[test]
    fn headers_map_to_sections() {
        assert_eq!(
            Section::from_header("role_definition").unwrap(),
            Section::Grouping
        );
        assert!(matches!(
            Section::from_header("nope"),
            Err(ModelError::UnsupportedSection(_))
        ));
    }
}
