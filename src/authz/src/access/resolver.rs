//! Permission resolution
//!
//! Resolves "does a principal holding these roles have permission P on
//! resource R" against an [`AccessDecisionStore`].
//!
//! # Algorithm
//!
//! Each role is evaluated on its own, in assignment order, stopping at the
//! first role that grants:
//!
//! ```text
//! (role, R, P)            defined?  → that verdict
//! (role, R, Any)  ┐
//! (role, Any, P)  ┘       both undefined? → (role, Any, Any) == Granted
//!                         otherwise       → granted unless either is Denied
//! ```
//!
//! Within a role the partial wildcards combine pessimistically (a single
//! Denied blocks). Across roles the combination is optimistic: one granting
//! role is enough, and a Denied verdict from another role never cancels it.

use super::store::AccessDecisionStore;
use super::AccessDecision;
use crate::config::ResolverConfig;
use crate::scope::{AccessKey, PermissionScope, ResourceScope};
use agora_core::{PermissionId, ResourceId, RoleId};
use tracing::debug;

/// Which step of the algorithm produced a role's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    /// The reserved owner role
    Owner,
    /// `(role, R, P)` was defined
    Exact,
    /// At least one of `(role, R, Any)` / `(role, Any, P)` was defined
    PartialWildcard,
    /// Fell through to `(role, Any, Any)`
    FullWildcard,
}

/// Verdict of a single role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleVerdict {
    pub role: RoleId,
    pub granted: bool,
    pub step: ResolutionStep,
}

/// Resolver over a borrowed decision table
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    store: &'a AccessDecisionStore,
    config: ResolverConfig,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(store: &'a AccessDecisionStore, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Whether any of `roles` grants `permission` on `resource`
    pub fn has_access(&self, roles: &[RoleId], resource: ResourceId, permission: PermissionId) -> bool {
        self.first_granting(roles, resource, permission).is_some()
    }

    /// The first role that grants, with the step that decided it
    pub fn first_granting(
        &self,
        roles: &[RoleId],
        resource: ResourceId,
        permission: PermissionId,
    ) -> Option<RoleVerdict> {
        roles
            .iter()
            .map(|role| self.resolve_role(*role, resource, permission))
            .find(|verdict| verdict.granted)
    }

    /// Evaluate one role in isolation
    pub fn resolve_role(&self, role: RoleId, resource: ResourceId, permission: PermissionId) -> RoleVerdict {
        let verdict = |granted, step| RoleVerdict { role, granted, step };

        if role.is_owner() && self.config.owner_has_full_access {
            return verdict(true, ResolutionStep::Owner);
        }

        let exact = self.get(role, resource.into(), permission.into());
        if exact.is_defined() {
            debug!("{} exact entry on ({}, {}): {:?}", role, resource, permission, exact);
            return verdict(exact.is_granted(), ResolutionStep::Exact);
        }

        let any_permission = self.get(role, resource.into(), PermissionScope::Any);
        let any_resource = self.get(role, ResourceScope::Any, permission.into());

        if !any_permission.is_defined() && !any_resource.is_defined() {
            let full = self.get(role, ResourceScope::Any, PermissionScope::Any);
            return verdict(full.is_granted(), ResolutionStep::FullWildcard);
        }

        let granted = any_permission != AccessDecision::Denied && any_resource != AccessDecision::Denied;
        debug!(
            "{} partial wildcards on ({}, {}): any-permission={:?} any-resource={:?} → {}",
            role, resource, permission, any_permission, any_resource, granted
        );
        verdict(granted, ResolutionStep::PartialWildcard)
    }

    fn get(&self, role: RoleId, resource: ResourceScope, permission: PermissionScope) -> AccessDecision {
        self.store.get(&AccessKey {
            role,
            resource,
            permission,
        })
    }
}
