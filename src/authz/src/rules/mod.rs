//! Extension modules ("rules") and the hook dispatch discipline
//!
//! A primitive may carry a swappable [`RuleModule`] that can veto any of its
//! state-changing actions. Every action runs through the
//! [`RuleDispatcher`], which authorizes it, applies the mutation and invokes
//! the configured modules in one of two orders:
//!
//! ```text
//! Gate:    authorize → hooks(pre-state)  → mutate
//! Notify:  authorize → mutate → hooks(post-state)
//!                 └──────── any failure restores the snapshot ────────┘
//! ```
//!
//! Modules receive shared references only: the primitive's state, the access
//! control surface and the caller's payload. They cannot reach back into the
//! primitive mutably while an action is in flight.

pub mod dispatcher;
pub mod slot;

pub use dispatcher::{atomically, Discipline, DispatchMetrics, RuleDispatcher};
pub use slot::RuleSlot;

use crate::access::AccessControl;
use agora_core::{Principal, ResourceId};
use std::fmt;
use thiserror::Error;

/// A module's refusal of an action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RuleVeto {
    pub reason: String,
}

impl RuleVeto {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of a hook: `Ok` accepts, `Err` vetoes
pub type RuleResult = std::result::Result<(), RuleVeto>;

/// An action a module can be asked about
pub trait HookAction: fmt::Debug {
    /// Stable action name (e.g. "feed.create_post")
    fn name(&self) -> &'static str;
}

/// State of a primitive that modules may observe
pub trait RuleTarget: Clone {
    type Action: HookAction;
}

/// Everything a module sees when one of its hooks runs
pub struct HookCall<'a, S: RuleTarget> {
    /// Principal performing the action
    pub actor: &'a Principal,

    /// Primitive the action targets
    pub primitive: ResourceId,

    /// The action and its parameters
    pub action: &'a S::Action,

    /// Primitive state: before the mutation under Gate, after it under Notify
    pub state: &'a S,

    /// The primitive's access control, read-only
    pub access: &'a dyn AccessControl,

    /// Opaque payload supplied by the caller for this module
    pub data: &'a [u8],
}

impl<S: RuleTarget> fmt::Debug for HookCall<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCall")
            .field("actor", self.actor)
            .field("primitive", &self.primitive)
            .field("action", self.action)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Swappable extension logic for one kind of primitive.
///
/// Re-initialization guards are the module's own business. Any state a
/// module keeps is part of the primitive's rollback snapshot (through
/// [`clone_box`](Self::clone_box)), so a rejected action leaves it untouched
/// as well.
pub trait RuleModule<S: RuleTarget>: Send + Sync {
    /// Name used in logs, events and veto errors
    fn name(&self) -> &str;

    /// Configure the module. A failure keeps the module from being installed.
    fn initialize(&mut self, config: &[u8]) -> RuleResult;

    /// Accept or veto an action.
    ///
    /// Veto by returning `Err`. Rollback covers returned errors only, so a
    /// panic here can leave a Notify mutation applied.
    fn process(&mut self, call: &HookCall<'_, S>) -> RuleResult;

    fn clone_box(&self) -> Box<dyn RuleModule<S>>;
}

impl<S: RuleTarget> Clone for Box<dyn RuleModule<S>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
