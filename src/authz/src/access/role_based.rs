//! Role-based access control
//!
//! Owns a [`RoleRegistry`] and an [`AccessDecisionStore`] behind one lock, so
//! every administrative change is applied in full or not at all, and queries
//! always see a consistent table. Change notifications are emitted while the
//! write lock is held, so observers receive them in commit order.
//!
//! # Example
//!
//! ```rust
//! use agora_authz::access::{AccessControl, AccessDecision, RoleBasedAccessControl};
//! use agora_core::{PermissionId, Principal, ResourceId, RoleId};
//!
//! # fn example() -> agora_authz::Result<()> {
//! let owner = Principal::new("account:owner");
//! let alice = Principal::new("account:alice");
//! let moderator = RoleId::from_name("agora.role.Moderator");
//! let feed = ResourceId::new(1, 1)?;
//! let delete = PermissionId::from_name("agora.permission.DeletePost");
//!
//! let acl = RoleBasedAccessControl::new(owner.clone())?;
//! acl.grant_role(&owner, &alice, moderator)?;
//! acl.set_access(&owner, moderator, feed.into(), delete.into(), AccessDecision::Granted)?;
//!
//! assert!(acl.has_access(&alice, feed, delete));
//! # Ok(())
//! # }
//! ```

use super::metrics::{AccessMetrics, MetricsCollector};
use super::resolver::{PermissionResolver, RoleVerdict};
use super::roles::RoleRegistry;
use super::store::{AccessChange, AccessDecisionStore};
use super::{AccessControl, AccessDecision};
use crate::config::{AccessControlConfig, ResolverConfig};
use crate::error::{AuthzError, Result};
use crate::events::{Event, EventSink, TracingSink};
use crate::scope::{AccessKey, PermissionScope, ResourceScope};
use agora_core::{PermissionId, Principal, ResourceId, RoleId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct AccessState {
    roles: RoleRegistry,
    table: AccessDecisionStore,
}

/// Access control backed by roles and a wildcard decision table
pub struct RoleBasedAccessControl {
    state: RwLock<AccessState>,
    resolver_config: ResolverConfig,
    events: Arc<dyn EventSink>,
    metrics: MetricsCollector,
}

impl RoleBasedAccessControl {
    /// Create an instance owned by `owner`, logging events through `tracing`
    pub fn new(owner: Principal) -> Result<Self> {
        Self::with_sink(owner, Arc::new(TracingSink))
    }

    /// Create an instance that emits change notifications to `events`
    pub fn with_sink(owner: Principal, events: Arc<dyn EventSink>) -> Result<Self> {
        Self::with_settings(owner, ResolverConfig::default(), events)
    }

    pub fn with_settings(
        owner: Principal,
        resolver_config: ResolverConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let roles = RoleRegistry::new(owner.clone())?;

        info!("RoleBasedAccessControl initialized with owner={}", owner);

        Ok(Self {
            state: RwLock::new(AccessState {
                roles,
                table: AccessDecisionStore::new(),
            }),
            resolver_config,
            events,
            metrics: MetricsCollector::new(),
        })
    }

    /// Build an instance from a bootstrap configuration.
    ///
    /// Grants and entries are replayed through the owner-gated operations, so
    /// a configuration that violates an admin invariant fails as a whole.
    pub fn from_config(config: &AccessControlConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let acl = Self::with_settings(config.owner.clone(), config.resolver, events)?;
        for grant in &config.grants {
            acl.grant_role(&config.owner, &grant.account, grant.role)?;
        }
        for entry in &config.access {
            let key = entry.key();
            acl.set_access(&config.owner, key.role, key.resource, key.permission, entry.decision)?;
        }

        info!(
            "Applied configuration: {} grants, {} access entries",
            config.grants.len(),
            config.access.len()
        );
        Ok(acl)
    }

    /// Grant a role. Owner only; the owner role itself is refused.
    pub fn grant_role(&self, caller: &Principal, account: &Principal, role: RoleId) -> Result<()> {
        let mut state = self.state.write();
        Self::require_owner(&state, caller, "grant roles")?;
        state.roles.grant(account, role).inspect_err(|e| {
            warn!("grant_role({}, {}) rejected: {}", account, role, e);
        })?;

        info!("Granted {} to {}", role, account);
        self.events.emit(Event::RoleGranted {
            account: account.clone(),
            role,
        });
        Ok(())
    }

    /// Revoke a role. Owner only; the owner role itself is refused.
    pub fn revoke_role(&self, caller: &Principal, account: &Principal, role: RoleId) -> Result<()> {
        let mut state = self.state.write();
        Self::require_owner(&state, caller, "revoke roles")?;
        state.roles.revoke(account, role).inspect_err(|e| {
            warn!("revoke_role({}, {}) rejected: {}", account, role, e);
        })?;

        info!("Revoked {} from {}", role, account);
        self.events.emit(Event::RoleRevoked {
            account: account.clone(),
            role,
        });
        Ok(())
    }

    /// Set one entry of the decision table. Owner only; entries for the owner
    /// role are refused, as is `Undefined` over `Undefined`.
    pub fn set_access(
        &self,
        caller: &Principal,
        role: RoleId,
        resource: ResourceScope,
        permission: PermissionScope,
        decision: AccessDecision,
    ) -> Result<AccessChange> {
        let key = AccessKey {
            role,
            resource,
            permission,
        };

        let mut state = self.state.write();
        Self::require_owner(&state, caller, "set access")?;
        if role.is_owner() {
            return Err(AuthzError::RoleOperationInvalid(
                "the owner role has no configurable access entries".to_string(),
            ));
        }
        let change = state.table.set(key, decision)?;

        info!("Access {} {:?} → {:?}", key, change, decision);
        let granted = decision.is_granted();
        self.events.emit(match change {
            AccessChange::Added => Event::AccessAdded {
                role,
                resource,
                permission,
                granted,
            },
            AccessChange::Updated => Event::AccessUpdated {
                role,
                resource,
                permission,
                granted,
            },
            AccessChange::Removed => Event::AccessRemoved {
                role,
                resource,
                permission,
            },
        });
        Ok(change)
    }

    /// Hand the owner role to `new_owner` in a single step. Owner only.
    pub fn transfer_ownership(&self, caller: &Principal, new_owner: &Principal) -> Result<()> {
        let mut state = self.state.write();
        Self::require_owner(&state, caller, "transfer ownership")?;
        let previous = state.roles.transfer_owner(new_owner)?;

        info!("Ownership transferred from {} to {}", previous, new_owner);
        self.events.emit(Event::OwnershipTransferred {
            previous,
            owner: new_owner.clone(),
        });
        Ok(())
    }

    /// Raw table read. This is not a resolved decision; use
    /// [`AccessControl::has_access`] for authorization.
    pub fn get_access(&self, role: RoleId, resource: ResourceScope, permission: PermissionScope) -> AccessDecision {
        self.state.read().table.get(&AccessKey {
            role,
            resource,
            permission,
        })
    }

    /// Resolve a query whose arguments arrived as scopes. Wildcards are
    /// rejected with `InvalidQuery`.
    pub fn check(&self, account: &Principal, resource: ResourceScope, permission: PermissionScope) -> Result<bool> {
        let (resource, permission) = match (resource.concrete(), permission.concrete()) {
            (Ok(resource), Ok(permission)) => (resource, permission),
            (Err(e), _) | (_, Err(e)) => {
                self.metrics.record_invalid_query();
                return Err(e);
            }
        };
        Ok(self.has_access(account, resource, permission))
    }

    /// The role that grants the query and the step that decided it, if any
    pub fn explain(&self, account: &Principal, resource: ResourceId, permission: PermissionId) -> Option<RoleVerdict> {
        let state = self.state.read();
        PermissionResolver::new(&state.table, self.resolver_config).first_granting(
            state.roles.roles_of(account),
            resource,
            permission,
        )
    }

    /// Roles held by an account
    pub fn roles_of(&self, account: &Principal) -> Vec<RoleId> {
        self.state.read().roles.roles_of(account).to_vec()
    }

    /// Defined entries for a role
    pub fn entries_for(&self, role: RoleId) -> Vec<(AccessKey, AccessDecision)> {
        self.state.read().table.entries_for(role)
    }

    pub fn metrics(&self) -> AccessMetrics {
        self.metrics.snapshot()
    }

    fn require_owner(state: &AccessState, caller: &Principal, what: &str) -> Result<()> {
        if *caller == *state.roles.owner() {
            Ok(())
        } else {
            warn!("{} attempted to {} without owning the access control", caller, what);
            Err(AuthzError::RoleOperationInvalid(format!(
                "only the owner can {}, {} is not the owner",
                what, caller
            )))
        }
    }
}

impl AccessControl for RoleBasedAccessControl {
    fn has_access(&self, account: &Principal, resource: ResourceId, permission: PermissionId) -> bool {
        let verdict = self.explain(account, resource, permission);
        let granted = verdict.is_some();

        debug!(
            "has_access({}, {}, {}) = {} via {:?}",
            account, resource, permission, granted, verdict
        );
        self.metrics.record(granted);
        granted
    }

    fn has_role(&self, account: &Principal, role: RoleId) -> bool {
        self.state.read().roles.has_role(account, role)
    }

    fn owner(&self) -> Principal {
        self.state.read().roles.owner().clone()
    }
}

impl std::fmt::Debug for RoleBasedAccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RoleBasedAccessControl")
            .field("owner", state.roles.owner())
            .field("principals", &state.roles.principal_count())
            .field("entries", &state.table.len())
            .finish()
    }
}
