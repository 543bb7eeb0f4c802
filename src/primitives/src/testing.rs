//! Fixtures shared by the unit tests

use crate::permissions::Permission;
use agora_authz::{AccessDecision, MemorySink, ResourceScope, RoleBasedAccessControl};
use agora_core::{IdAllocator, Principal, ResourceId, RoleId};
use std::sync::Arc;

pub(crate) struct Platform {
    pub ids: IdAllocator,
    pub acl: Arc<RoleBasedAccessControl>,
    pub sink: Arc<MemorySink>,
    pub owner: Principal,
    pub alice: Principal,
    pub bob: Principal,
}

impl Platform {
    /// A fresh primitive id, in a namespace of its own
    pub fn next_primitive_id(&self) -> ResourceId {
        self.ids.generator().next_id().unwrap()
    }

    /// Grant `account` `permission` on every resource
    pub fn allow(&self, account: &Principal, permission: Permission) {
        let role = RoleId::from_name(&format!("{}:{}", account, permission));
        self.acl.grant_role(&self.owner, account, role).unwrap();
        self.acl
            .set_access(
                &self.owner,
                role,
                ResourceScope::Any,
                permission.id().into(),
                AccessDecision::Granted,
            )
            .unwrap();
    }
}

pub(crate) fn platform() -> Platform {
    let owner = Principal::new("account:owner");
    let sink = Arc::new(MemorySink::new());
    let acl = Arc::new(RoleBasedAccessControl::with_sink(owner.clone(), sink.clone()).unwrap());
    Platform {
        ids: IdAllocator::new(),
        acl,
        sink,
        owner,
        alice: Principal::new("account:alice"),
        bob: Principal::new("account:bob"),
    }
}
