//! Owner-only access control: the owner holds every permission, nobody else
//! holds any.

use super::AccessControl;
use crate::error::{AuthzError, Result};
use crate::events::{Event, EventSink, TracingSink};
use agora_core::{PermissionId, Principal, ResourceId, RoleId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

pub struct OwnerOnlyAccessControl {
    owner: RwLock<Principal>,
    events: Arc<dyn EventSink>,
}

impl OwnerOnlyAccessControl {
    pub fn new(owner: Principal) -> Result<Self> {
        Self::with_sink(owner, Arc::new(TracingSink))
    }

    pub fn with_sink(owner: Principal, events: Arc<dyn EventSink>) -> Result<Self> {
        if owner.is_absent() {
            return Err(AuthzError::RoleOperationInvalid(
                "owner cannot be the absent principal".to_string(),
            ));
        }
        Ok(Self {
            owner: RwLock::new(owner),
            events,
        })
    }

    /// Hand ownership to `new_owner` in a single step. Owner only.
    pub fn transfer_ownership(&self, caller: &Principal, new_owner: &Principal) -> Result<()> {
        let mut owner = self.owner.write();
        if *caller != *owner {
            return Err(AuthzError::RoleOperationInvalid(format!(
                "only the owner can transfer ownership, {} is not the owner",
                caller
            )));
        }
        if new_owner.is_absent() || *new_owner == *owner {
            return Err(AuthzError::RoleOperationInvalid(format!(
                "cannot transfer ownership to {}",
                new_owner
            )));
        }
        let previous = std::mem::replace(&mut *owner, new_owner.clone());

        info!("Ownership transferred from {} to {}", previous, new_owner);
        self.events.emit(Event::OwnershipTransferred {
            previous,
            owner: new_owner.clone(),
        });
        Ok(())
    }
}

impl AccessControl for OwnerOnlyAccessControl {
    fn has_access(&self, account: &Principal, _resource: ResourceId, _permission: PermissionId) -> bool {
        *account == *self.owner.read()
    }

    fn has_role(&self, account: &Principal, role: RoleId) -> bool {
        role.is_owner() && *account == *self.owner.read()
    }

    fn owner(&self) -> Principal {
        self.owner.read().clone()
    }
}
