//! Access control
//!
//! Role-based permission resolution with layered wildcards.
//!
//! # Components
//!
//! - [`AccessDecisionStore`]: raw `(role, resource, permission)` → decision table
//! - [`RoleRegistry`]: principal → roles, with the reserved owner role
//! - [`PermissionResolver`]: the wildcard resolution algorithm
//! - [`RoleBasedAccessControl`]: owner-gated administration over the three,
//!   emitting change notifications
//! - [`OwnerOnlyAccessControl`]: the owner may do everything, nobody else anything
//!
//! Primitives hold an `Arc<dyn AccessControl>` and only ever query it; the
//! administrative operations live on the concrete types.

pub mod metrics;
pub mod owner_only;
pub mod resolver;
pub mod role_based;
pub mod roles;
pub mod store;

pub use metrics::{AccessMetrics, MetricsCollector};
pub use owner_only::OwnerOnlyAccessControl;
pub use resolver::{PermissionResolver, ResolutionStep, RoleVerdict};
pub use role_based::RoleBasedAccessControl;
pub use roles::RoleRegistry;
pub use store::{AccessChange, AccessDecisionStore};

use crate::error::{AuthzError, Result};
use agora_core::{PermissionId, Principal, ResourceId, RoleId};
use serde::{Deserialize, Serialize};

/// Tri-state access decision. `Undefined` is never treated as granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    #[default]
    Undefined,
    Granted,
    Denied,
}

impl AccessDecision {
    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }

    /// Boolean collapse: only `Granted` is true
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Read-only access control surface consumed by primitives and rule modules
pub trait AccessControl: Send + Sync {
    /// Whether `account` holds `permission` on `resource`
    fn has_access(&self, account: &Principal, resource: ResourceId, permission: PermissionId) -> bool;

    /// Whether `account` holds `role`
    fn has_role(&self, account: &Principal, role: RoleId) -> bool;

    /// Current owner
    fn owner(&self) -> Principal;
}

/// Fail with `AccessDenied` unless `account` holds `permission` on `resource`
pub fn require_access(
    access: &dyn AccessControl,
    account: &Principal,
    resource: ResourceId,
    permission: PermissionId,
) -> Result<()> {
    if access.has_access(account, resource, permission) {
        Ok(())
    } else {
        Err(AuthzError::AccessDenied(format!(
            "{} lacks {} on {}",
            account, permission, resource
        )))
    }
}

/// Fail with `AccessDenied` unless `caller` is acting for itself
pub fn require_self(caller: &Principal, subject: &Principal) -> Result<()> {
    if caller == subject && !caller.is_absent() {
        Ok(())
    } else {
        Err(AuthzError::AccessDenied(format!(
            "{} cannot act on behalf of {}",
            caller, subject
        )))
    }
}
