//! Configuration for the static rules plugin.

use std::collections::BTreeMap;
use std::fmt;

use authz_policy_sdk::{CredentialType, Privilege, ResourceType};
use serde::Deserialize;
use uuid::Uuid;

/// Plugin configuration: the resource tree and one rule template per resource type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticRulesPluginConfig {
    /// Resources in creation order. A parent must be listed before its children.
    pub resources: Vec<ResourceConfig>,

    /// Local rules per resource type. Types without an entry inherit only.
    pub rules: BTreeMap<ResourceType, RuleTemplate>,
}

impl StaticRulesPluginConfig {
    /// Parse the plugin's raw config block; a missing block yields an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown fields or malformed values.
    pub fn from_raw(raw: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        Ok(match raw {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Self::default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub parent: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleTemplate {
    pub credential_rules: Vec<CredentialRuleTemplate>,
    pub privilege_rules: Vec<PrivilegeRuleTemplate>,
    /// Overrides the inherited anonymous-read flag when set.
    pub anonymous_read_access: Option<bool>,
    /// Extra rules handed only to children of the given type.
    pub child_rules: BTreeMap<ResourceType, Vec<CredentialRuleTemplate>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialRuleTemplate {
    pub name: String,
    pub privileges: Vec<Privilege>,
    pub criteria: Vec<CriterionTemplate>,
    #[serde(default = "default_cascade")]
    pub cascade: bool,
}

fn default_cascade() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriterionTemplate {
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    #[serde(default)]
    pub scope: ScopeTemplate,
}

/// Where a criterion's scope comes from, resolved per node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ScopeTemplate {
    /// Platform-wide (`platform`).
    #[default]
    Platform,
    /// The node being resolved (`self`).
    Node,
    /// The node's parent (`parent`).
    Parent,
    /// A fixed resource id.
    Resource(Uuid),
}

impl TryFrom<String> for ScopeTemplate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" | "platform" => Ok(Self::Platform),
            "self" => Ok(Self::Node),
            "parent" => Ok(Self::Parent),
            other => Uuid::parse_str(other).map(Self::Resource).map_err(|_| {
                format!("invalid scope '{other}': expected platform, self, parent or a UUID")
            }),
        }
    }
}

impl fmt::Display for ScopeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Node => f.write_str("self"),
            Self::Parent => f.write_str("parent"),
            Self::Resource(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivilegeRuleTemplate {
    pub name: String,
    pub source: Privilege,
    pub granted: Vec<Privilege>,
}
