//! Domain models for the `authz_policy` module.
//!
//! One [`AuthorizationPolicy`] is attached to every resource node. It carries
//! credential rules (who gets which privileges), privilege rules (which
//! privileges imply others on the same resource) and the anonymous-read flag.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RuleAuthoringError;
use crate::well_known::resource_types;

macro_rules! catalog_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Build a value from a static string, usable in `const` items.
            #[must_use]
            pub const fn from_static(name: &'static str) -> Self {
                Self(Cow::Borrowed(name))
            }

            /// Build a value from an owned string.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(Cow::Owned(name.into()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&'static str> for $name {
            fn from(name: &'static str) -> Self {
                Self::from_static(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self::new(name)
            }
        }
    };
}

catalog_name!(
    /// A privilege kind (e.g. `read`, `create-callout`). Compared by identity only.
    Privilege
);

catalog_name!(
    /// A credential type (e.g. `space-member`, `global-admin`).
    CredentialType
);

catalog_name!(
    /// Resource type name (e.g. `collaboration`, `callout`).
    ResourceType
);

/// Resource scope of a credential.
///
/// Serialized as a string: the empty string is platform-wide, anything else
/// must be a resource UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    /// Valid on every resource.
    Platform,
    /// Valid on one resource.
    Resource(Uuid),
}

impl Scope {
    #[must_use]
    pub fn is_platform(&self) -> bool {
        matches!(self, Self::Platform)
    }
}

impl TryFrom<String> for Scope {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self::Platform);
        }
        Uuid::parse_str(&value).map(Self::Resource)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Platform => Self::new(),
            Scope::Resource(id) => id.to_string(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("*"),
            Self::Resource(id) => write!(f, "{id}"),
        }
    }
}

/// A credential held by a principal, or required by a rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CredentialGrant {
    pub credential_type: CredentialType,
    pub scope: Scope,
}

impl CredentialGrant {
    #[must_use]
    pub fn new(credential_type: CredentialType, scope: Scope) -> Self {
        Self {
            credential_type,
            scope,
        }
    }

    /// A credential valid on every resource.
    #[must_use]
    pub fn platform(credential_type: CredentialType) -> Self {
        Self::new(credential_type, Scope::Platform)
    }

    /// A credential scoped to one resource.
    #[must_use]
    pub fn for_resource(credential_type: CredentialType, resource_id: Uuid) -> Self {
        Self::new(credential_type, Scope::Resource(resource_id))
    }

    /// Whether this held credential satisfies `required`.
    ///
    /// Types must be equal; scopes match when equal or when either side is
    /// platform-wide. A credential scoped to the checked resource only matches
    /// rules that require that same resource.
    #[must_use]
    pub fn matches(&self, required: &CredentialGrant) -> bool {
        if self.credential_type != required.credential_type {
            return false;
        }
        self.scope == required.scope || self.scope.is_platform() || required.scope.is_platform()
    }
}

impl fmt::Display for CredentialGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.credential_type, self.scope)
    }
}

/// Grants privileges to any principal holding one of `criteria`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRule {
    /// Stable identifier, unique among the rules one resource contributes.
    pub name: String,
    pub granted_privileges: BTreeSet<Privilege>,
    /// OR-ed: holding any one of these is enough.
    pub criteria: Vec<CredentialGrant>,
    /// Copied into child policies during inheritance.
    pub cascade: bool,
    /// Resource whose policy first received this rule. Set on append and
    /// kept through inheritance, so nested resources of the same type can
    /// each contribute a rule with the same name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Uuid>,
}

impl CredentialRule {
    /// Create a cascading rule.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        granted_privileges: impl IntoIterator<Item = Privilege>,
        criteria: Vec<CredentialGrant>,
    ) -> Self {
        Self {
            name: name.into(),
            granted_privileges: granted_privileges.into_iter().collect(),
            criteria,
            cascade: true,
            origin: None,
        }
    }

    #[must_use]
    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// Whether any of `credentials` satisfies this rule.
    #[must_use]
    pub fn is_satisfied_by(&self, credentials: &[CredentialGrant]) -> bool {
        credentials.iter().any(|held| {
            self.criteria
                .iter()
                .any(|required| held.matches(required))
        })
    }
}

/// Derives secondary privileges from one already granted on the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeRule {
    pub name: String,
    pub source_privilege: Privilege,
    pub granted_privileges: BTreeSet<Privilege>,
}

impl PrivilegeRule {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_privilege: Privilege,
        granted_privileges: impl IntoIterator<Item = Privilege>,
    ) -> Self {
        Self {
            name: name.into(),
            source_privilege,
            granted_privileges: granted_privileges.into_iter().collect(),
        }
    }
}

/// A node of the resource tree, identified by type and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: Uuid,
    pub resource_type: ResourceType,
}

impl ResourceNode {
    #[must_use]
    pub fn new(resource_type: ResourceType, id: Uuid) -> Self {
        Self { id, resource_type }
    }
}

impl fmt::Display for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// The access policy record owned by exactly one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPolicy {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub credential_rules: Vec<CredentialRule>,
    #[serde(default)]
    pub privilege_rules: Vec<PrivilegeRule>,
    #[serde(default)]
    pub anonymous_read_access: bool,
}

impl AuthorizationPolicy {
    /// Create an empty policy for `node`.
    #[must_use]
    pub fn new(node: &ResourceNode) -> Self {
        Self {
            id: Uuid::now_v7(),
            resource_id: node.id,
            resource_type: node.resource_type.clone(),
            credential_rules: Vec::new(),
            privilege_rules: Vec::new(),
            anonymous_read_access: false,
        }
    }

    /// Create a policy that is never persisted (platform-level checks, one-off variants).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            id: Uuid::nil(),
            resource_id: Uuid::nil(),
            resource_type: resource_types::IN_MEMORY,
            credential_rules: Vec::new(),
            privilege_rules: Vec::new(),
            anonymous_read_access: false,
        }
    }

    /// Drop all rules and the anonymous flag. Keeps `id` and the owner.
    pub fn reset(&mut self) {
        self.credential_rules.clear();
        self.privilege_rules.clear();
        self.anonymous_read_access = false;
    }

    /// Copy the parent's cascading credential rules, in parent order, and its
    /// anonymous-read flag. Expected on a freshly reset policy.
    pub fn inherit_from(&mut self, parent: &AuthorizationPolicy) {
        let inherited = parent
            .credential_rules
            .iter()
            .filter(|rule| rule.cascade)
            .cloned();
        let local = std::mem::take(&mut self.credential_rules);
        self.credential_rules = inherited.chain(local).collect();
        self.anonymous_read_access = parent.anonymous_read_access;
    }

    /// Append credential rules after the existing ones, stamping this
    /// policy's resource as their origin.
    ///
    /// Inherited rules carry another origin and never clash with local ones.
    ///
    /// # Errors
    ///
    /// [`RuleAuthoringError::DuplicateRuleName`] if this resource already
    /// contributed a rule with the same name; no rule is appended in that case.
    pub fn append_credential_rules(
        &mut self,
        rules: impl IntoIterator<Item = CredentialRule>,
    ) -> Result<(), RuleAuthoringError> {
        let origin = Some(self.resource_id);
        let rules: Vec<CredentialRule> = rules
            .into_iter()
            .map(|mut rule| {
                rule.origin = origin;
                rule
            })
            .collect();
        for (idx, rule) in rules.iter().enumerate() {
            let clash = self
                .credential_rules
                .iter()
                .any(|existing| existing.name == rule.name && existing.origin == origin)
                || rules[..idx].iter().any(|earlier| earlier.name == rule.name);
            if clash {
                return Err(RuleAuthoringError::DuplicateRuleName {
                    name: rule.name.clone(),
                    resource_id: self.resource_id,
                });
            }
        }
        self.credential_rules.extend(rules);
        Ok(())
    }

    pub fn append_privilege_rules(&mut self, rules: impl IntoIterator<Item = PrivilegeRule>) {
        self.privilege_rules.extend(rules);
    }

    #[must_use]
    pub fn credential_rule(&self, name: &str) -> Option<&CredentialRule> {
        self.credential_rules.iter().find(|rule| rule.name == name)
    }

    /// True when the policy grants nothing to anyone.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credential_rules.is_empty()
            && self.privilege_rules.is_empty()
            && !self.anonymous_read_access
    }
}

/// Extra credential rules a parent hands to children of one type only.
///
/// They are appended to a clone of the parent's resolved policy used as the
/// parent input for those children; the parent's stored policy never sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRules {
    pub child_type: ResourceType,
    pub credential_rules: Vec<CredentialRule>,
}

/// Rules a resource type contributes on top of what it inherits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRules {
    pub credential_rules: Vec<CredentialRule>,
    pub privilege_rules: Vec<PrivilegeRule>,
    /// Overrides the inherited anonymous-read flag when set.
    pub anonymous_read_access: Option<bool>,
    pub child_rules: Vec<ChildRules>,
}

impl LocalRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn credential_rule(mut self, rule: CredentialRule) -> Self {
        self.credential_rules.push(rule);
        self
    }

    #[must_use]
    pub fn privilege_rule(mut self, rule: PrivilegeRule) -> Self {
        self.privilege_rules.push(rule);
        self
    }

    #[must_use]
    pub fn anonymous_read_access(mut self, value: bool) -> Self {
        self.anonymous_read_access = Some(value);
        self
    }

    /// Add a rule visible only to children of `child_type` through their parent input.
    #[must_use]
    pub fn child_rule(mut self, child_type: ResourceType, rule: CredentialRule) -> Self {
        if let Some(entry) = self
            .child_rules
            .iter_mut()
            .find(|entry| entry.child_type == child_type)
        {
            entry.credential_rules.push(rule);
        } else {
            self.child_rules.push(ChildRules {
                child_type,
                credential_rules: vec![rule],
            });
        }
        self
    }

    /// Child-only rules registered for `child_type`.
    #[must_use]
    pub fn rules_for_child(&self, child_type: &ResourceType) -> &[CredentialRule] {
        self.child_rules
            .iter()
            .find(|entry| &entry.child_type == child_type)
            .map_or(&[], |entry| entry.credential_rules.as_slice())
    }
}
