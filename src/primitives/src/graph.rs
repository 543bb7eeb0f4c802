//! Follow graphs
//!
//! Follows run under the Gate discipline with two tiers of rules: the
//! graph-wide rule, then the rule the followed account installed for itself.
//! Either may veto. Swapping an account's follow rule is itself gated by the
//! graph-wide rule through a dedicated `FollowRulesChanged` action.

use crate::base::{Primitive, PrimitiveBase};
use agora_authz::{
    require_self, AccessControl, AuthzError, Discipline, Event, EventSink, HookAction, HookCall, Result,
    RuleModule, RuleSlot, RuleTarget,
};
use agora_core::{IdGenerator, Principal, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: ResourceId,
    pub follower: Principal,
    pub target: Principal,
}

#[derive(Debug, Clone, Default)]
pub struct GraphState {
    /// Keyed by (follower, target)
    follows: BTreeMap<(Principal, Principal), Follow>,
}

impl GraphState {
    pub fn follow(&self, follower: &Principal, target: &Principal) -> Option<&Follow> {
        self.follows.get(&(follower.clone(), target.clone()))
    }

    pub fn is_following(&self, follower: &Principal, target: &Principal) -> bool {
        self.follow(follower, target).is_some()
    }

    pub fn follower_count(&self, target: &Principal) -> usize {
        self.follows.values().filter(|f| f.target == *target).count()
    }

    pub fn following_count(&self, follower: &Principal) -> usize {
        self.follows.values().filter(|f| f.follower == *follower).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphAction {
    Follow {
        follow: ResourceId,
        follower: Principal,
        target: Principal,
    },
    Unfollow {
        follow: ResourceId,
        follower: Principal,
        target: Principal,
    },
    /// `account` is installing (`Some`) or clearing (`None`) its follow rule
    FollowRulesChanged { account: Principal, rule: Option<String> },
}

impl HookAction for GraphAction {
    fn name(&self) -> &'static str {
        match self {
            GraphAction::Follow { .. } => "graph.follow",
            GraphAction::Unfollow { .. } => "graph.unfollow",
            GraphAction::FollowRulesChanged { .. } => "graph.follow_rules_changed",
        }
    }
}

impl RuleTarget for GraphState {
    type Action = GraphAction;
}

#[derive(Clone)]
struct GraphUnit {
    state: GraphState,
    ids: IdGenerator,
    rules: RuleSlot<GraphState>,
    follow_rules: BTreeMap<Principal, RuleSlot<GraphState>>,
}

/// Graph-wide rule first, then the target's own
fn process_follow(
    rules: &mut RuleSlot<GraphState>,
    follow_rules: &mut BTreeMap<Principal, RuleSlot<GraphState>>,
    call: &HookCall<'_, GraphState>,
    target: &Principal,
) -> Result<()> {
    rules.process(call)?;
    if let Some(slot) = follow_rules.get_mut(target) {
        debug!("Running {}'s follow rule", target);
        slot.process(call)?;
    }
    Ok(())
}

pub struct Graph {
    base: PrimitiveBase,
    unit: GraphUnit,
}

impl Graph {
    pub fn new(id: ResourceId, ids: IdGenerator, access: Arc<dyn AccessControl>, events: Arc<dyn EventSink>) -> Self {
        Self {
            base: PrimitiveBase::new("graph", id, access, events),
            unit: GraphUnit {
                state: GraphState::default(),
                ids,
                rules: RuleSlot::empty(),
                follow_rules: BTreeMap::new(),
            },
        }
    }

    pub fn state(&self) -> &GraphState {
        &self.unit.state
    }

    pub fn is_following(&self, follower: &Principal, target: &Principal) -> bool {
        self.unit.state.is_following(follower, target)
    }

    /// Make `follower` follow `target`. Returns the follow's id.
    pub fn follow(
        &mut self,
        caller: &Principal,
        follower: &Principal,
        target: &Principal,
        rule_data: &[u8],
    ) -> Result<ResourceId> {
        let base = &self.base;

        let follow = base.dispatcher().execute(
            Discipline::Gate,
            "graph.follow",
            &mut self.unit,
            |unit| {
                require_self(caller, follower)?;
                if target.is_absent() || target == follower {
                    return Err(AuthzError::InvalidInput(format!("{} cannot follow {}", follower, target)));
                }
                if unit.state.is_following(follower, target) {
                    return Err(AuthzError::InvalidInput(format!("{} already follows {}", follower, target)));
                }
                Ok(())
            },
            |unit| Ok(unit.ids.next_id()?),
            |unit, id| {
                unit.state.follows.insert(
                    (follower.clone(), target.clone()),
                    Follow {
                        id: *id,
                        follower: follower.clone(),
                        target: target.clone(),
                    },
                );
                Ok(*id)
            },
            |unit, id| {
                let action = GraphAction::Follow {
                    follow: *id,
                    follower: follower.clone(),
                    target: target.clone(),
                };
                process_follow(
                    &mut unit.rules,
                    &mut unit.follow_rules,
                    &HookCall {
                        actor: caller,
                        primitive: base.id(),
                        action: &action,
                        state: &unit.state,
                        access: base.access(),
                        data: rule_data,
                    },
                    target,
                )
            },
        )?;

        info!("graph {}: {} follows {}", base.id(), follower, target);
        base.emit(Event::Followed {
            graph: base.id(),
            follow,
            follower: follower.clone(),
            target: target.clone(),
        });
        Ok(follow)
    }

    pub fn unfollow(&mut self, caller: &Principal, follower: &Principal, target: &Principal, rule_data: &[u8]) -> Result<()> {
        let base = &self.base;

        let follow = base.dispatcher().execute(
            Discipline::Gate,
            "graph.unfollow",
            &mut self.unit,
            |_| require_self(caller, follower),
            |unit| {
                unit.state
                    .follow(follower, target)
                    .map(|f| f.id)
                    .ok_or_else(|| AuthzError::NotFound(format!("{} does not follow {}", follower, target)))
            },
            |unit, id| {
                unit.state.follows.remove(&(follower.clone(), target.clone()));
                Ok(*id)
            },
            |unit, id| {
                let action = GraphAction::Unfollow {
                    follow: *id,
                    follower: follower.clone(),
                    target: target.clone(),
                };
                process_follow(
                    &mut unit.rules,
                    &mut unit.follow_rules,
                    &HookCall {
                        actor: caller,
                        primitive: base.id(),
                        action: &action,
                        state: &unit.state,
                        access: base.access(),
                        data: rule_data,
                    },
                    target,
                )
            },
        )?;

        info!("graph {}: {} unfollowed {}", base.id(), follower, target);
        base.emit(Event::Unfollowed {
            graph: base.id(),
            follow,
            follower: follower.clone(),
            target: target.clone(),
        });
        Ok(())
    }

    /// Install (`Some`) or clear (`None`) the rule applied to follows of
    /// `account`. Only the account itself may do so, and the graph-wide rule
    /// can veto the change.
    pub fn set_follow_rule(
        &mut self,
        caller: &Principal,
        account: &Principal,
        module: Option<Box<dyn RuleModule<GraphState>>>,
        config: &[u8],
        rule_data: &[u8],
    ) -> Result<()> {
        let base = &self.base;
        let rule = module.as_ref().map(|m| m.name().to_string());

        base.dispatcher().execute(
            Discipline::Gate,
            "graph.follow_rules_changed",
            &mut self.unit,
            |unit| {
                require_self(caller, account)?;
                let installed = unit.follow_rules.get(account).is_some_and(RuleSlot::is_set);
                if rule.is_none() && !installed {
                    return Err(AuthzError::MissingExtensionModule(format!(
                        "{} has no follow rule to clear",
                        account
                    )));
                }
                Ok(())
            },
            |_| Ok(()),
            |unit, _| match module {
                Some(module) => unit
                    .follow_rules
                    .entry(account.clone())
                    .or_default()
                    .set(module, config)
                    .map(|_| ()),
                None => {
                    unit.follow_rules.remove(account);
                    Ok(())
                }
            },
            |unit, _| {
                unit.rules.process(&HookCall {
                    actor: caller,
                    primitive: base.id(),
                    action: &GraphAction::FollowRulesChanged {
                        account: account.clone(),
                        rule: rule.clone(),
                    },
                    state: &unit.state,
                    access: base.access(),
                    data: rule_data,
                })
            },
        )?;

        base.emit(Event::FollowRuleChanged {
            graph: base.id(),
            account: account.clone(),
            rule,
        });
        Ok(())
    }

    /// Name of the follow rule `account` installed
    pub fn follow_rule(&self, account: &Principal) -> Option<&str> {
        self.unit.follow_rules.get(account).and_then(RuleSlot::name)
    }

    pub fn set_rule(&mut self, caller: &Principal, module: Box<dyn RuleModule<GraphState>>, config: &[u8]) -> Result<()> {
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

impl Primitive for Graph {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }
}
