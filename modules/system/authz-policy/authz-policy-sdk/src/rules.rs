//! Rule constructors shared by the per-resource-type rule builders.

use crate::models::{
    AuthorizationPolicy, CredentialGrant, CredentialRule, CredentialType, Privilege, PrivilegeRule,
};
use crate::well_known::credentials;

/// Platform roles that map onto global credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    Admin,
    Support,
    CommunityRead,
}

impl GlobalRole {
    #[must_use]
    pub fn credential_type(self) -> CredentialType {
        match self {
            Self::Admin => credentials::GLOBAL_ADMIN,
            Self::Support => credentials::GLOBAL_SUPPORT,
            Self::CommunityRead => credentials::GLOBAL_COMMUNITY_READ,
        }
    }
}

/// Cascading rule granting `privileges` to holders of any of `criteria`.
#[must_use]
pub fn credential_rule(
    privileges: impl IntoIterator<Item = Privilege>,
    criteria: Vec<CredentialGrant>,
    name: impl Into<String>,
) -> CredentialRule {
    CredentialRule::new(name, privileges, criteria)
}

/// Cascading rule keyed on credential types only (platform-wide scope).
#[must_use]
pub fn credential_rule_for_types(
    privileges: impl IntoIterator<Item = Privilege>,
    types: impl IntoIterator<Item = CredentialType>,
    name: impl Into<String>,
) -> CredentialRule {
    let criteria = types.into_iter().map(CredentialGrant::platform).collect();
    CredentialRule::new(name, privileges, criteria)
}

/// Cascading rule for the given platform roles.
#[must_use]
pub fn global_roles_rule(
    privileges: impl IntoIterator<Item = Privilege>,
    roles: &[GlobalRole],
    name: impl Into<String>,
) -> CredentialRule {
    credential_rule_for_types(
        privileges,
        roles.iter().map(|role| role.credential_type()),
        name,
    )
}

/// Non-persisted policy granting `privileges` to the given platform roles.
#[must_use]
pub fn global_roles_policy(
    roles: &[GlobalRole],
    privileges: impl IntoIterator<Item = Privilege>,
    name: impl Into<String>,
) -> AuthorizationPolicy {
    let mut policy = AuthorizationPolicy::in_memory();
    policy
        .credential_rules
        .push(global_roles_rule(privileges, roles, name));
    policy
}

/// Credentials every anonymous or registered principal holds.
#[must_use]
pub fn anonymous_and_registered_credentials() -> Vec<CredentialGrant> {
    vec![
        CredentialGrant::platform(credentials::GLOBAL_ANONYMOUS),
        CredentialGrant::platform(credentials::GLOBAL_REGISTERED),
    ]
}

/// Grants `privilege` to anonymous principals.
#[must_use]
pub fn anonymous_access_rule(privilege: Privilege, cascade: bool) -> CredentialRule {
    let name = format!("anonymous agent granted '{privilege}' anonymous access");
    credential_rule_for_types([privilege], [credentials::GLOBAL_ANONYMOUS], name)
        .with_cascade(cascade)
}

/// Grants `privilege` to registered principals.
#[must_use]
pub fn registered_access_rule(privilege: Privilege, cascade: bool) -> CredentialRule {
    let name = format!("registered agent granted '{privilege}' registered access");
    credential_rule_for_types([privilege], [credentials::GLOBAL_REGISTERED], name)
        .with_cascade(cascade)
}

/// Grants `privilege` to anonymous and registered principals alike.
#[must_use]
pub fn anonymous_registered_access_rule(privilege: Privilege, cascade: bool) -> CredentialRule {
    let name = format!("anonymous agent granted '{privilege}' anonymous registered access");
    CredentialRule::new(name, [privilege], anonymous_and_registered_credentials())
        .with_cascade(cascade)
}

/// Holding `source` on a resource also grants `granted` on it.
#[must_use]
pub fn privilege_rule(
    source: Privilege,
    granted: impl IntoIterator<Item = Privilege>,
    name: impl Into<String>,
) -> PrivilegeRule {
    PrivilegeRule::new(name, source, granted)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::evaluator::is_granted;
    use crate::models::Scope;
    use crate::well_known::privileges;
    use uuid::Uuid;

    #[test]
    fn types_only_rules_are_platform_wide_and_cascade() {
        let rule = credential_rule_for_types(
            [privileges::READ],
            [credentials::GLOBAL_ADMIN, credentials::GLOBAL_SUPPORT],
            "global-read",
        );
        assert!(rule.cascade);
        assert_eq!(rule.criteria.len(), 2);
        assert!(rule.criteria.iter().all(|c| c.scope == Scope::Platform));
    }

    #[test]
    fn global_roles_map_to_global_credentials() {
        let rule = global_roles_rule(
            [privileges::UPDATE],
            &[GlobalRole::Admin, GlobalRole::CommunityRead],
            "platform-admins",
        );
        let types: Vec<&CredentialType> = rule.criteria.iter().map(|c| &c.credential_type).collect();
        assert_eq!(types, vec![
            &credentials::GLOBAL_ADMIN,
            &credentials::GLOBAL_COMMUNITY_READ
        ]);
    }

    #[test]
    fn global_roles_policy_is_in_memory() {
        let policy = global_roles_policy(&[GlobalRole::Support], [privileges::READ_USERS], "support");
        assert!(policy.id.is_nil());

        let support = CredentialGrant::platform(credentials::GLOBAL_SUPPORT);
        assert!(is_granted(&policy, &[support], Uuid::nil(), &privileges::READ_USERS).unwrap());
    }

    #[test]
    fn public_access_rules() {
        let anonymous = anonymous_access_rule(privileges::READ, false);
        assert!(!anonymous.cascade);
        assert_eq!(
            anonymous.name,
            "anonymous agent granted 'read' anonymous access"
        );

        let registered = registered_access_rule(privileges::CREATE_MESSAGE, true);
        let holder = CredentialGrant::platform(credentials::GLOBAL_REGISTERED);
        assert!(registered.is_satisfied_by(&[holder.clone()]));

        let both = anonymous_registered_access_rule(privileges::READ, true);
        assert!(both.is_satisfied_by(&[holder]));
        assert!(both.is_satisfied_by(&[CredentialGrant::platform(
            credentials::GLOBAL_ANONYMOUS
        )]));
    }
}
