//! Hook discipline tests across primitives
//!
//! A vetoed action must leave no trace: no state change, no id consumed, no
//! event emitted.

use agora_authz::{
    AccessControl, AccessDecision, AuthzError, Event, HookCall, MemorySink, PermissionScope, ResourceScope,
    RoleBasedAccessControl, RuleModule, RuleResult, RuleVeto,
};
use agora_core::{DataKey, IdAllocator, Principal, RoleId};
use agora_primitives::{
    App, AppResource, Feed, FeedAction, FeedState, Graph, GraphState, Group, GroupState, Permission, Primitive,
};
use proptest::prelude::*;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct World {
    ids: IdAllocator,
    acl: Arc<RoleBasedAccessControl>,
    sink: Arc<MemorySink>,
    owner: Principal,
    alice: Principal,
    bob: Principal,
}

fn world() -> World {
    init_tracing();
    let owner = Principal::new("account:owner");
    let sink = Arc::new(MemorySink::new());
    World {
        ids: IdAllocator::new(),
        acl: Arc::new(RoleBasedAccessControl::with_sink(owner.clone(), sink.clone()).unwrap()),
        sink,
        owner,
        alice: Principal::new("account:alice"),
        bob: Principal::new("account:bob"),
    }
}

impl World {
    fn feed(&self) -> Feed {
        Feed::new(self.ids.generator().next_id().unwrap(), self.ids.generator(), self.acl.clone(), self.sink.clone())
    }

    fn graph(&self) -> Graph {
        Graph::new(self.ids.generator().next_id().unwrap(), self.ids.generator(), self.acl.clone(), self.sink.clone())
    }

    fn group(&self) -> Group {
        Group::new(self.ids.generator().next_id().unwrap(), self.acl.clone(), self.sink.clone())
    }
}

/// Vetoes whenever the caller-supplied payload is `b"veto"`
#[derive(Clone)]
struct PayloadVeto;

macro_rules! payload_veto {
    ($state:ty) => {
        impl RuleModule<$state> for PayloadVeto {
            fn name(&self) -> &str {
                "payload-veto"
            }

            fn initialize(&mut self, _config: &[u8]) -> RuleResult {
                Ok(())
            }

            fn process(&mut self, call: &HookCall<'_, $state>) -> RuleResult {
                if call.data == b"veto" {
                    Err(RuleVeto::new("payload asked for a veto"))
                } else {
                    Ok(())
                }
            }

            fn clone_box(&self) -> Box<dyn RuleModule<$state>> {
                Box::new(self.clone())
            }
        }
    };
}

payload_veto!(FeedState);
payload_veto!(GraphState);
payload_veto!(GroupState);

// ============================================================================
// GATE DISCIPLINE
// ============================================================================

#[test]
fn test_gate_veto_leaves_no_follow() {
    let w = world();
    let mut graph = w.graph();
    graph.set_rule(&w.owner, Box::new(PayloadVeto), b"").unwrap();
    let before = w.sink.len();

    let err = graph.follow(&w.alice, &w.alice, &w.bob, b"veto").unwrap_err();
    assert!(matches!(err, AuthzError::RuleRejected { .. }));
    assert!(!graph.is_following(&w.alice, &w.bob));
    assert_eq!(graph.state().follower_count(&w.bob), 0);
    assert_eq!(w.sink.len(), before);

    // The id the vetoed follow would have taken is still free
    let follow = graph.follow(&w.alice, &w.alice, &w.bob, b"").unwrap();
    assert_eq!(follow.sequence(), 1);
}

#[test]
fn test_gate_veto_leaves_membership_unchanged() {
    let w = world();
    let mut group = w.group();
    group.join(&w.alice, &w.alice, b"").unwrap();
    group.set_rule(&w.owner, Box::new(PayloadVeto), b"").unwrap();

    assert!(group.leave(&w.alice, &w.alice, b"veto").is_err());
    assert!(group.is_member(&w.alice));
    assert!(group.join(&w.bob, &w.bob, b"veto").is_err());
    assert!(!group.is_member(&w.bob));
}

// ============================================================================
// NOTIFY DISCIPLINE
// ============================================================================

#[test]
fn test_notify_veto_undoes_committed_post() {
    let w = world();
    let mut feed = w.feed();
    let kept = feed.create_post(&w.alice, &w.alice, "ipfs://kept", b"").unwrap();
    feed.set_rule(&w.owner, Box::new(PayloadVeto), b"").unwrap();
    let before = feed.state().clone();
    let events = w.sink.len();

    assert!(feed.create_post(&w.alice, &w.alice, "ipfs://gone", b"veto").is_err());
    assert!(feed.edit_post(&w.alice, kept, "ipfs://changed", b"veto").is_err());
    assert!(feed.delete_post(&w.alice, kept, b"veto").is_err());

    assert_eq!(feed.state().len(), before.len());
    assert_eq!(feed.post(kept), before.post(kept));
    assert_eq!(w.sink.len(), events);
    assert_eq!(feed.dispatch_metrics().vetoed, 3);
}

#[test]
fn test_module_sees_post_state_under_notify() {
    #[derive(Clone)]
    struct SeesOwnPost;

    impl RuleModule<FeedState> for SeesOwnPost {
        fn name(&self) -> &str {
            "sees-own-post"
        }

        fn initialize(&mut self, _config: &[u8]) -> RuleResult {
            Ok(())
        }

        fn process(&mut self, call: &HookCall<'_, FeedState>) -> RuleResult {
            match call.action {
                FeedAction::CreatePost { post, .. } if call.state.post(*post).is_none() => {
                    Err(RuleVeto::new("post missing from state"))
                }
                FeedAction::DeletePost { post } if call.state.post(*post).is_some() => {
                    Err(RuleVeto::new("post still in state"))
                }
                _ => Ok(()),
            }
        }

        fn clone_box(&self) -> Box<dyn RuleModule<FeedState>> {
            Box::new(self.clone())
        }
    }

    let w = world();
    let mut feed = w.feed();
    feed.set_rule(&w.owner, Box::new(SeesOwnPost), b"").unwrap();

    let post = feed.create_post(&w.alice, &w.alice, "ipfs://x", b"").unwrap();
    feed.delete_post(&w.alice, post, b"").unwrap();
}

// ============================================================================
// SHARED OPERATIONS
// ============================================================================

#[test]
fn test_extra_data_requires_permission_and_reports_updates() {
    let w = world();
    let mut group = w.group();
    let key = DataKey::from_name("agora.meta.description");

    assert!(matches!(
        group.set_extra_data(&w.alice, key, b"hi".to_vec()),
        Err(AuthzError::AccessDenied(_))
    ));

    assert!(!group.set_extra_data(&w.owner, key, b"v1".to_vec()).unwrap());
    assert!(group.set_extra_data(&w.owner, key, b"v2".to_vec()).unwrap());
    assert_eq!(group.extra_data(&key), Some(&b"v2"[..]));

    group.remove_extra_data(&w.owner, key).unwrap();
    assert_eq!(group.extra_data(&key), None);
    assert!(matches!(
        group.remove_extra_data(&w.owner, key),
        Err(AuthzError::NotFound(_))
    ));

    let names: Vec<_> = w.sink.events().iter().map(Event::name).collect();
    assert!(names.ends_with(&["extra_data_added", "extra_data_updated", "extra_data_removed"]));
}

#[test]
fn test_permissions_are_scoped_to_the_primitive() {
    let w = world();
    let mut first = w.group();
    let mut second = w.group();
    let moderator = RoleId::from_name("agora.role.Moderator");

    w.acl.grant_role(&w.owner, &w.alice, moderator).unwrap();
    w.acl
        .set_access(
            &w.owner,
            moderator,
            first.id().into(),
            Permission::AddMember.id().into(),
            AccessDecision::Granted,
        )
        .unwrap();

    first.add_member(&w.alice, &w.bob, b"").unwrap();
    assert!(matches!(
        second.add_member(&w.alice, &w.bob, b""),
        Err(AuthzError::AccessDenied(_))
    ));
}

#[test]
fn test_end_to_end_app_with_moderated_feed() {
    let w = world();
    let mut app = App::new(w.ids.generator().next_id().unwrap(), w.acl.clone(), w.sink.clone());
    let mut feed = w.feed();
    let moderator = RoleId::from_name("agora.role.Moderator");

    // Moderators may do anything on any resource except manage rules
    w.acl.grant_role(&w.owner, &w.bob, moderator).unwrap();
    w.acl
        .set_access(&w.owner, moderator, ResourceScope::Any, PermissionScope::Any, AccessDecision::Granted)
        .unwrap();
    w.acl
        .set_access(
            &w.owner,
            moderator,
            ResourceScope::Any,
            Permission::SetRules.id().into(),
            AccessDecision::Denied,
        )
        .unwrap();

    app.set_default(&w.bob, AppResource::Feed, Some(feed.id())).unwrap();
    assert_eq!(app.current_default(AppResource::Feed), Some(feed.id()));

    let post = feed.create_post(&w.alice, &w.alice, "ipfs://spam", b"").unwrap();
    feed.delete_post(&w.bob, post, b"").unwrap();
    assert!(feed.set_rule(&w.bob, Box::new(PayloadVeto), b"").is_err());

    assert!(w.acl.has_access(&w.bob, feed.id(), Permission::DeletePost.id()));
    assert!(!w.acl.has_access(&w.bob, feed.id(), Permission::SetRules.id()));
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[derive(Debug, Clone)]
enum GroupOp {
    Join(bool, bool),
    Leave(bool, bool),
}

fn group_op() -> impl Strategy<Value = GroupOp> {
    prop_oneof![
        (any::<bool>(), any::<bool>()).prop_map(|(who, veto)| GroupOp::Join(who, veto)),
        (any::<bool>(), any::<bool>()).prop_map(|(who, veto)| GroupOp::Leave(who, veto)),
    ]
}

proptest! {
    /// A failed action never changes membership; a successful one changes
    /// exactly the targeted account
    #[test]
    fn prop_failed_membership_changes_leave_no_trace(ops in proptest::collection::vec(group_op(), 1..30)) {
        let w = world();
        let mut group = w.group();
        group.set_rule(&w.owner, Box::new(PayloadVeto), b"").unwrap();

        for op in ops {
            let (account, veto, joining) = match op {
                GroupOp::Join(who, veto) => (if who { &w.alice } else { &w.bob }, veto, true),
                GroupOp::Leave(who, veto) => (if who { &w.alice } else { &w.bob }, veto, false),
            };
            let data: &[u8] = if veto { b"veto" } else { b"" };
            let before = group.is_member(account);
            let others = group.state().member_count() - usize::from(before);

            let result = if joining {
                group.join(account, account, data)
            } else {
                group.leave(account, account, data)
            };

            match result {
                Ok(()) => prop_assert_eq!(group.is_member(account), joining),
                Err(_) => prop_assert_eq!(group.is_member(account), before),
            }
            prop_assert_eq!(group.state().member_count() - usize::from(group.is_member(account)), others);
        }
    }
}
