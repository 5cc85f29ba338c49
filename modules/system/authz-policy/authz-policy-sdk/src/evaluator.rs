//! Rule evaluator.
//!
//! Pure, synchronous computation of the privileges a set of credentials
//! receives from one [`AuthorizationPolicy`]:
//!
//! 1. Union the privileges of every credential rule the credentials satisfy.
//! 2. Close the result under the policy's privilege rules (fixed point).
//! 3. Add `read` when the policy allows anonymous read access.
//!
//! Privilege rules that imply each other in a loop are rejected before
//! expansion, and expansion that keeps growing past the pass cap is an error
//! rather than a silently truncated result.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::error::{AuthzPolicyError, RuleAuthoringError};
use crate::models::{AuthorizationPolicy, CredentialGrant, Privilege, PrivilegeRule};
use crate::well_known::privileges;

/// Default pass cap for privilege expansion.
pub const DEFAULT_MAX_EXPANSION_PASSES: usize = 64;

/// Evaluates policies against a principal's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivilegeEvaluator {
    max_expansion_passes: usize,
}

impl Default for PrivilegeEvaluator {
    fn default() -> Self {
        Self {
            max_expansion_passes: DEFAULT_MAX_EXPANSION_PASSES,
        }
    }
}

impl PrivilegeEvaluator {
    /// Create an evaluator with a custom pass cap (at least one pass).
    #[must_use]
    pub fn new(max_expansion_passes: usize) -> Self {
        Self {
            max_expansion_passes: max_expansion_passes.max(1),
        }
    }

    #[must_use]
    pub fn max_expansion_passes(&self) -> usize {
        self.max_expansion_passes
    }

    /// All privileges `credentials` hold on `resource_id` under `policy`.
    ///
    /// # Errors
    ///
    /// [`RuleAuthoringError`] if the policy's privilege rules are cyclic or
    /// do not converge within the pass cap.
    pub fn granted_privileges(
        &self,
        policy: &AuthorizationPolicy,
        credentials: &[CredentialGrant],
        resource_id: Uuid,
    ) -> Result<BTreeSet<Privilege>, RuleAuthoringError> {
        let mut granted = BTreeSet::new();

        for rule in &policy.credential_rules {
            if rule.is_satisfied_by(credentials) {
                tracing::trace!(%resource_id, rule = %rule.name, "credential rule matched");
                granted.extend(rule.granted_privileges.iter().cloned());
            }
        }

        self.expand(policy, &mut granted)?;

        if policy.anonymous_read_access {
            granted.insert(privileges::READ);
        }

        Ok(granted)
    }

    /// Whether `credentials` hold `required` on `resource_id`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::granted_privileges`].
    pub fn is_granted(
        &self,
        policy: &AuthorizationPolicy,
        credentials: &[CredentialGrant],
        resource_id: Uuid,
        required: &Privilege,
    ) -> Result<bool, RuleAuthoringError> {
        Ok(self
            .granted_privileges(policy, credentials, resource_id)?
            .contains(required))
    }

    /// Like [`Self::is_granted`], failing with a typed error instead of `false`.
    ///
    /// # Errors
    ///
    /// - [`AuthzPolicyError::PolicyNotInitialized`] if the policy grants nothing
    ///   to anyone (it was never propagated)
    /// - [`AuthzPolicyError::AccessDenied`] if the privilege is not held
    /// - [`AuthzPolicyError::RuleAuthoring`] on a broken rule catalog
    pub fn grant_or_fail(
        &self,
        policy: &AuthorizationPolicy,
        credentials: &[CredentialGrant],
        resource_id: Uuid,
        required: &Privilege,
        context: &str,
    ) -> Result<(), AuthzPolicyError> {
        if policy.is_empty() {
            return Err(AuthzPolicyError::PolicyNotInitialized { resource_id });
        }

        if self.is_granted(policy, credentials, resource_id, required)? {
            return Ok(());
        }

        tracing::debug!(
            resource_id = %resource_id,
            privilege = %required,
            credentials = credentials.len(),
            credential_rules = policy.credential_rules.len(),
            anonymous_read_access = policy.anonymous_read_access,
            "access denied: {context}"
        );
        Err(AuthzPolicyError::AccessDenied {
            privilege: required.clone(),
            context: context.to_owned(),
        })
    }

    /// Reject privilege rules that imply each other in a loop.
    ///
    /// # Errors
    ///
    /// [`RuleAuthoringError::CyclicExpansion`] naming a privilege on the cycle
    /// and the rules that form it.
    pub fn validate_privilege_rules(&self, rules: &[PrivilegeRule]) -> Result<(), RuleAuthoringError> {
        match find_cycle(rules) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn expand(
        &self,
        policy: &AuthorizationPolicy,
        granted: &mut BTreeSet<Privilege>,
    ) -> Result<(), RuleAuthoringError> {
        if policy.privilege_rules.is_empty() {
            return Ok(());
        }
        // Validated even when nothing was granted.
        self.validate_privilege_rules(&policy.privilege_rules)?;
        if granted.is_empty() {
            return Ok(());
        }

        for _ in 0..self.max_expansion_passes {
            let mut added = false;
            for rule in &policy.privilege_rules {
                if !granted.contains(&rule.source_privilege) {
                    continue;
                }
                for privilege in &rule.granted_privileges {
                    added |= granted.insert(privilege.clone());
                }
            }
            if !added {
                return Ok(());
            }
        }

        Err(RuleAuthoringError::ExpansionLimitExceeded {
            policy_id: policy.id,
            passes: self.max_expansion_passes,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

type ExpansionGraph<'a> = BTreeMap<&'a Privilege, Vec<(&'a Privilege, &'a str)>>;

fn find_cycle(rules: &[PrivilegeRule]) -> Option<RuleAuthoringError> {
    let mut graph: ExpansionGraph<'_> = BTreeMap::new();
    for rule in rules {
        let edges = graph.entry(&rule.source_privilege).or_default();
        for target in &rule.granted_privileges {
            edges.push((target, rule.name.as_str()));
        }
    }

    let mut visits: BTreeMap<&Privilege, Visit> = BTreeMap::new();
    for &start in graph.keys() {
        if visits.contains_key(start) {
            continue;
        }
        let mut path = vec![start];
        let mut via = Vec::new();
        if let Some(err) = visit(start, &graph, &mut visits, &mut path, &mut via) {
            return Some(err);
        }
    }
    None
}

fn visit<'a>(
    node: &'a Privilege,
    graph: &ExpansionGraph<'a>,
    visits: &mut BTreeMap<&'a Privilege, Visit>,
    path: &mut Vec<&'a Privilege>,
    via: &mut Vec<&'a str>,
) -> Option<RuleAuthoringError> {
    visits.insert(node, Visit::InProgress);

    for &(target, rule) in graph.get(node).map_or(&[][..], Vec::as_slice) {
        match visits.get(target) {
            Some(Visit::Done) => {}
            Some(Visit::InProgress) => {
                let start = path.iter().position(|p| *p == target).unwrap_or(0);
                let mut rules: Vec<String> = via[start..].iter().map(|r| (*r).to_owned()).collect();
                rules.push(rule.to_owned());
                return Some(RuleAuthoringError::CyclicExpansion {
                    privilege: target.clone(),
                    rules,
                });
            }
            None => {
                path.push(target);
                via.push(rule);
                if let Some(err) = visit(target, graph, visits, path, via) {
                    return Some(err);
                }
                path.pop();
                via.pop();
            }
        }
    }

    visits.insert(node, Visit::Done);
    None
}

/// [`PrivilegeEvaluator::granted_privileges`] with the default pass cap.
///
/// # Errors
///
/// See [`PrivilegeEvaluator::granted_privileges`].
pub fn granted_privileges(
    policy: &AuthorizationPolicy,
    credentials: &[CredentialGrant],
    resource_id: Uuid,
) -> Result<BTreeSet<Privilege>, RuleAuthoringError> {
    PrivilegeEvaluator::default().granted_privileges(policy, credentials, resource_id)
}

/// [`PrivilegeEvaluator::is_granted`] with the default pass cap.
///
/// # Errors
///
/// See [`PrivilegeEvaluator::is_granted`].
pub fn is_granted(
    policy: &AuthorizationPolicy,
    credentials: &[CredentialGrant],
    resource_id: Uuid,
    required: &Privilege,
) -> Result<bool, RuleAuthoringError> {
    PrivilegeEvaluator::default().is_granted(policy, credentials, resource_id, required)
}

/// [`PrivilegeEvaluator::grant_or_fail`] with the default pass cap.
///
/// # Errors
///
/// See [`PrivilegeEvaluator::grant_or_fail`].
pub fn grant_or_fail(
    policy: &AuthorizationPolicy,
    credentials: &[CredentialGrant],
    resource_id: Uuid,
    required: &Privilege,
    context: &str,
) -> Result<(), AuthzPolicyError> {
    PrivilegeEvaluator::default().grant_or_fail(policy, credentials, resource_id, required, context)
}
