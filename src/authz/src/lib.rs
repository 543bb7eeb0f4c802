//! # Agora Authorization Core
//!
//! The authorization-and-extensibility core shared by every Agora primitive.
//!
//! ## Features
//!
//! - **Role-based access control** with layered wildcards: exact entries,
//!   then "any permission on this resource" / "this permission on any
//!   resource", then "anything"
//! - **Asymmetric override policy**: denied-overrides within a role,
//!   granted-overrides across roles
//! - **Rule modules**: swappable extension logic that can veto any
//!   state-changing action, dispatched under a Gate or Notify discipline
//!   with full rollback
//! - **Change notifications** for indexers, emitted only after commit
//!
//! ## Example
//!
//! ```rust
//! use agora_authz::{AccessControl, AccessDecision, PermissionScope, ResourceScope, RoleBasedAccessControl};
//! use agora_core::{PermissionId, Principal, ResourceId, RoleId};
//!
//! # fn main() -> agora_authz::Result<()> {
//! let owner = Principal::new("account:owner");
//! let alice = Principal::new("account:alice");
//! let editor = RoleId::from_name("agora.role.Editor");
//! let feed = ResourceId::new(1, 1)?;
//! let edit = PermissionId::from_name("agora.permission.EditPost");
//!
//! let acl = RoleBasedAccessControl::new(owner.clone())?;
//! acl.grant_role(&owner, &alice, editor)?;
//! acl.set_access(&owner, editor, ResourceScope::Any, edit.into(), AccessDecision::Granted)?;
//!
//! assert!(acl.has_access(&alice, feed, edit));
//! assert!(acl.check(&alice, feed.into(), PermissionScope::Any).is_err());
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod extra_data;
pub mod rules;
pub mod scope;
pub mod slots;

#[cfg(test)]
pub(crate) mod testing;

pub use access::{
    require_access, require_self, AccessChange, AccessControl, AccessDecision, AccessMetrics,
    OwnerOnlyAccessControl, RoleBasedAccessControl,
};
pub use config::{AccessControlConfig, ResolverConfig};
pub use error::{AuthzError, Result};
pub use events::{Event, EventRecord, EventSink, MemorySink, TracingSink};
pub use extra_data::ExtraDataStore;
pub use rules::{
    Discipline, HookAction, HookCall, RuleDispatcher, RuleModule, RuleResult, RuleSlot, RuleTarget,
    RuleVeto,
};
pub use scope::{AccessKey, PermissionScope, ResourceScope};
pub use slots::DefaultSlot;
