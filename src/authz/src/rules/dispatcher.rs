//! Hook dispatch with all-or-nothing semantics
//!
//! Every state-changing primitive action runs through
//! [`RuleDispatcher::execute`]. The action's *unit* is everything it may
//! touch: primitive state, identifier generators and the rule modules
//! themselves. The unit is snapshotted before anything runs and restored if
//! any step fails, so no partial progress is ever observable.

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Order of mutation and hook invocation for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// Hooks see the pre-mutation state and may veto before anything changes
    Gate,
    /// Hooks see the post-mutation state; a veto unwinds the mutation
    Notify,
}

/// Run `op` against `unit`, restoring the unit if `op` fails
pub fn atomically<U, T>(unit: &mut U, op: impl FnOnce(&mut U) -> Result<T>) -> Result<T>
where
    U: Clone,
{
    let snapshot = unit.clone();
    op(unit).inspect_err(|_| {
        *unit = snapshot;
    })
}

/// Counters for dispatched actions. `denied` counts access refusals at the
/// gate only; other precondition failures land in `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchMetrics {
    pub committed: u64,
    pub denied: u64,
    pub vetoed: u64,
    pub failed: u64,
}

/// Executes actions under a [`Discipline`]
#[derive(Debug, Default)]
pub struct RuleDispatcher {
    committed: AtomicU64,
    denied: AtomicU64,
    vetoed: AtomicU64,
    failed: AtomicU64,
}

impl RuleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute one action.
    ///
    /// - `authorize` runs first against the untouched unit
    /// - `prepare` computes the action's parameters (allocating identifiers)
    /// - `mutate` applies the state change
    /// - `hooks` invokes the configured modules, primitive-wide first
    ///
    /// `Gate` runs `hooks` before `mutate`, `Notify` after. If any step
    /// fails the unit is restored to its state before the call.
    #[allow(clippy::too_many_arguments)]
    pub fn execute<U, P, T>(
        &self,
        discipline: Discipline,
        action: &str,
        unit: &mut U,
        authorize: impl FnOnce(&U) -> Result<()>,
        prepare: impl FnOnce(&mut U) -> Result<P>,
        mutate: impl FnOnce(&mut U, &P) -> Result<T>,
        hooks: impl FnOnce(&mut U, &P) -> Result<()>,
    ) -> Result<T>
    where
        U: Clone,
    {
        if let Err(e) = authorize(unit) {
            debug!("{} refused at the gate: {}", action, e);
            let counter = match &e {
                AuthzError::AccessDenied(_) => &self.denied,
                _ => &self.failed,
            };
            counter.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }

        let result = atomically(unit, |unit| {
            let params = prepare(unit)?;
            match discipline {
                Discipline::Gate => {
                    hooks(unit, &params)?;
                    mutate(unit, &params)
                }
                Discipline::Notify => {
                    let output = mutate(unit, &params)?;
                    hooks(unit, &params)?;
                    Ok(output)
                }
            }
        });

        match &result {
            Ok(_) => {
                debug!("{} committed under {:?}", action, discipline);
                self.committed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e @ AuthzError::RuleRejected { .. }) => {
                warn!("{} rolled back: {}", action, e);
                self.vetoed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                warn!("{} failed: {}", action, e);
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    pub fn metrics(&self) -> DispatchMetrics {
        DispatchMetrics {
            committed: self.committed.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            vetoed: self.vetoed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
