//! Groups: membership lists
//!
//! Membership changes run under the Gate discipline, so the group's rule
//! decides on the membership as it was before the change.

use crate::base::{Primitive, PrimitiveBase};
use crate::permissions::Permission;
use agora_authz::{
    require_self, AccessControl, AuthzError, Discipline, Event, EventSink, HookAction, HookCall, Result,
    RuleModule, RuleSlot, RuleTarget,
};
use agora_core::{Principal, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupState {
    members: BTreeSet<Principal>,
}

impl GroupState {
    pub fn is_member(&self, account: &Principal) -> bool {
        self.members.contains(account)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> impl Iterator<Item = &Principal> {
        self.members.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    Join { account: Principal },
    Leave { account: Principal },
    AddMember { account: Principal, by: Principal },
    RemoveMember { account: Principal, by: Principal },
}

impl GroupAction {
    /// Account whose membership changes
    pub fn account(&self) -> &Principal {
        match self {
            GroupAction::Join { account }
            | GroupAction::Leave { account }
            | GroupAction::AddMember { account, .. }
            | GroupAction::RemoveMember { account, .. } => account,
        }
    }

    pub fn is_admission(&self) -> bool {
        matches!(self, GroupAction::Join { .. } | GroupAction::AddMember { .. })
    }
}

impl HookAction for GroupAction {
    fn name(&self) -> &'static str {
        match self {
            GroupAction::Join { .. } => "group.join",
            GroupAction::Leave { .. } => "group.leave",
            GroupAction::AddMember { .. } => "group.add_member",
            GroupAction::RemoveMember { .. } => "group.remove_member",
        }
    }
}

impl RuleTarget for GroupState {
    type Action = GroupAction;
}

#[derive(Clone)]
struct GroupUnit {
    state: GroupState,
    rules: RuleSlot<GroupState>,
}

pub struct Group {
    base: PrimitiveBase,
    unit: GroupUnit,
}

impl Group {
    pub fn new(id: ResourceId, access: Arc<dyn AccessControl>, events: Arc<dyn EventSink>) -> Self {
        Self {
            base: PrimitiveBase::new("group", id, access, events),
            unit: GroupUnit {
                state: GroupState::default(),
                rules: RuleSlot::empty(),
            },
        }
    }

    pub fn state(&self) -> &GroupState {
        &self.unit.state
    }

    pub fn is_member(&self, account: &Principal) -> bool {
        self.unit.state.is_member(account)
    }

    /// Join as `account`. Only the account itself may join.
    pub fn join(&mut self, caller: &Principal, account: &Principal, rule_data: &[u8]) -> Result<()> {
        self.change_membership(
            caller,
            GroupAction::Join {
                account: account.clone(),
            },
            rule_data,
        )
    }

    /// Leave as `account`. Only the account itself may leave.
    pub fn leave(&mut self, caller: &Principal, account: &Principal, rule_data: &[u8]) -> Result<()> {
        self.change_membership(
            caller,
            GroupAction::Leave {
                account: account.clone(),
            },
            rule_data,
        )
    }

    /// Add `account` on its behalf. Requires `AddMember`.
    pub fn add_member(&mut self, caller: &Principal, account: &Principal, rule_data: &[u8]) -> Result<()> {
        self.change_membership(
            caller,
            GroupAction::AddMember {
                account: account.clone(),
                by: caller.clone(),
            },
            rule_data,
        )
    }

    /// Remove `account`. Requires `RemoveMember`.
    pub fn remove_member(&mut self, caller: &Principal, account: &Principal, rule_data: &[u8]) -> Result<()> {
        self.change_membership(
            caller,
            GroupAction::RemoveMember {
                account: account.clone(),
                by: caller.clone(),
            },
            rule_data,
        )
    }

    fn change_membership(&mut self, caller: &Principal, action: GroupAction, rule_data: &[u8]) -> Result<()> {
        let base = &self.base;
        let account = action.account();
        let admission = action.is_admission();

        base.dispatcher().execute(
            Discipline::Gate,
            action.name(),
            &mut self.unit,
            |unit| {
                match &action {
                    GroupAction::Join { .. } | GroupAction::Leave { .. } => require_self(caller, account)?,
                    GroupAction::AddMember { .. } => base.require(caller, Permission::AddMember)?,
                    GroupAction::RemoveMember { .. } => base.require(caller, Permission::RemoveMember)?,
                }
                match (admission, unit.state.is_member(account)) {
                    _ if account.is_absent() => Err(AuthzError::InvalidInput("absent account".to_string())),
                    (true, true) => Err(AuthzError::InvalidInput(format!("{} is already a member", account))),
                    (false, false) => Err(AuthzError::NotFound(format!("{} is not a member", account))),
                    _ => Ok(()),
                }
            },
            |_| Ok(()),
            |unit, _| {
                if admission {
                    unit.state.members.insert(account.clone());
                } else {
                    unit.state.members.remove(account);
                }
                Ok(())
            },
            |unit, _| {
                unit.rules.process(&HookCall {
                    actor: caller,
                    primitive: base.id(),
                    action: &action,
                    state: &unit.state,
                    access: base.access(),
                    data: rule_data,
                })
            },
        )?;

        info!("group {}: {} by {}", base.id(), action.name(), caller);
        let group = base.id();
        base.emit(match action {
            GroupAction::Join { account } => Event::MemberJoined { group, account },
            GroupAction::Leave { account } => Event::MemberLeft { group, account },
            GroupAction::AddMember { account, by } => Event::MemberAdded { group, account, by },
            GroupAction::RemoveMember { account, by } => Event::MemberRemoved { group, account, by },
        });
        Ok(())
    }

    pub fn set_rule(&mut self, caller: &Principal, module: Box<dyn RuleModule<GroupState>>, config: &[u8]) -> Result<()> {
        self.base.set_rule(&mut self.unit.rules, caller, module, config)
    }

    pub fn configure_rule(&mut self, caller: &Principal, config: &[u8]) -> Result<()> {
        self.base.configure_rule(&mut self.unit.rules, caller, config)
    }

    pub fn clear_rule(&mut self, caller: &Principal) -> Result<()> {
        self.base.clear_rule(&mut self.unit.rules, caller)
    }

    pub fn rule(&self) -> Option<&str> {
        self.unit.rules.name()
    }
}

impl Primitive for Group {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }
}
