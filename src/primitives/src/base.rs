//! State and operations every primitive shares
//!
//! Each primitive owns a [`PrimitiveBase`]: its identifier (the resource
//! scope of its permission checks), its access control, its event sink, its
//! dispatcher and its extra data. Rule slots live in the primitive's own
//! snapshot unit, but installing or clearing a module goes through here so the
//! `SetRules` check and the notifications are uniform.

use crate::permissions::Permission;
use agora_authz::rules::DispatchMetrics;
use agora_authz::{
    require_access, AccessControl, AuthzError, Event, EventSink, ExtraDataStore, Result, RuleDispatcher,
    RuleModule, RuleSlot, RuleTarget,
};
use agora_core::{DataKey, Principal, ResourceId};
use std::sync::Arc;
use tracing::{info, warn};

pub struct PrimitiveBase {
    kind: &'static str,
    id: ResourceId,
    access: Arc<dyn AccessControl>,
    events: Arc<dyn EventSink>,
    dispatcher: RuleDispatcher,
    extra: ExtraDataStore,
}

impl PrimitiveBase {
    pub fn new(
        kind: &'static str,
        id: ResourceId,
        access: Arc<dyn AccessControl>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        info!("{} {} created, owner={}", kind, id, access.owner());
        Self {
            kind,
            id,
            access,
            events,
            dispatcher: RuleDispatcher::new(),
            extra: ExtraDataStore::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn access(&self) -> &dyn AccessControl {
        self.access.as_ref()
    }

    pub fn dispatcher(&self) -> &RuleDispatcher {
        &self.dispatcher
    }

    /// Fail with `AccessDenied` unless `caller` holds `permission` on this primitive
    pub fn require(&self, caller: &Principal, permission: Permission) -> Result<()> {
        require_access(self.access(), caller, self.id, permission.id()).inspect_err(|_| {
            warn!("{} {}: {} lacks {}", self.kind, self.id, caller, permission);
        })
    }

    pub fn emit(&self, event: Event) {
        self.events.emit(event);
    }

    pub fn set_extra_data(&mut self, caller: &Principal, key: DataKey, value: Vec<u8>) -> Result<bool> {
        self.require(caller, Permission::SetExtraData)?;

        let updated = self.extra.set(key, value.clone());
        self.emit(if updated {
            Event::ExtraDataUpdated {
                source: self.id,
                key,
                value,
            }
        } else {
            Event::ExtraDataAdded {
                source: self.id,
                key,
                value,
            }
        });
        Ok(updated)
    }

    pub fn remove_extra_data(&mut self, caller: &Principal, key: DataKey) -> Result<()> {
        self.require(caller, Permission::SetExtraData)?;

        if self.extra.remove(&key).is_none() {
            return Err(AuthzError::NotFound(format!("no extra data under {}", key)));
        }
        self.emit(Event::ExtraDataRemoved { source: self.id, key });
        Ok(())
    }

    pub fn extra_data(&self, key: &DataKey) -> Option<&[u8]> {
        self.extra.get(key)
    }

    /// Install `module` in `slot`. Requires `SetRules`.
    pub fn set_rule<S: RuleTarget>(
        &self,
        slot: &mut RuleSlot<S>,
        caller: &Principal,
        module: Box<dyn RuleModule<S>>,
        config: &[u8],
    ) -> Result<()> {
        self.require(caller, Permission::SetRules)?;

        let rule = module.name().to_string();
        if let Some(previous) = slot.set(module, config)? {
            info!("{} {}: rule '{}' replaced by '{}'", self.kind, self.id, previous, rule);
        }
        self.emit(Event::RuleConfigured {
            source: self.id,
            target: None,
            rule,
        });
        Ok(())
    }

    /// Re-initialize the module in `slot`. Requires `SetRules`.
    pub fn configure_rule<S: RuleTarget>(&self, slot: &mut RuleSlot<S>, caller: &Principal, config: &[u8]) -> Result<()> {
        self.require(caller, Permission::SetRules)?;

        slot.configure(config)?;
        self.emit(Event::RuleConfigured {
            source: self.id,
            target: None,
            rule: slot.name().unwrap_or_default().to_string(),
        });
        Ok(())
    }

    /// Empty `slot`. Requires `SetRules`.
    pub fn clear_rule<S: RuleTarget>(&self, slot: &mut RuleSlot<S>, caller: &Principal) -> Result<()> {
        self.require(caller, Permission::SetRules)?;

        let rule = slot.clear().ok_or_else(|| {
            AuthzError::MissingExtensionModule(format!("{} {} has no rule to clear", self.kind, self.id))
        })?;
        self.emit(Event::RuleCleared {
            source: self.id,
            target: None,
            rule,
        });
        Ok(())
    }
}

impl std::fmt::Debug for PrimitiveBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveBase")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("extra_data", &self.extra.len())
            .finish()
    }
}

/// Operations common to every primitive
pub trait Primitive {
    fn base(&self) -> &PrimitiveBase;

    fn base_mut(&mut self) -> &mut PrimitiveBase;

    fn id(&self) -> ResourceId {
        self.base().id()
    }

    /// Store extra data. Returns true if a value was replaced.
    /// Requires `SetExtraData`.
    fn set_extra_data(&mut self, caller: &Principal, key: DataKey, value: Vec<u8>) -> Result<bool> {
        self.base_mut().set_extra_data(caller, key, value)
    }

    /// Requires `SetExtraData`; `NotFound` if nothing is stored under `key`
    fn remove_extra_data(&mut self, caller: &Principal, key: DataKey) -> Result<()> {
        self.base_mut().remove_extra_data(caller, key)
    }

    fn extra_data(&self, key: &DataKey) -> Option<&[u8]> {
        self.base().extra_data(key)
    }

    fn dispatch_metrics(&self) -> DispatchMetrics {
        self.base().dispatcher().metrics()
    }
}
