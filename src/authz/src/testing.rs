//! Fixtures shared by the unit tests

use crate::access::OwnerOnlyAccessControl;
use crate::rules::{HookAction, HookCall, RuleModule, RuleResult, RuleTarget, RuleVeto};
use agora_core::Principal;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub(crate) struct Counter {
    pub value: u64,
    pub history: Vec<u64>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CounterAction {
    Increment,
}

impl HookAction for CounterAction {
    fn name(&self) -> &'static str {
        match self {
            CounterAction::Increment => "counter.increment",
        }
    }
}

impl RuleTarget for Counter {
    type Action = CounterAction;
}

/// Accepts or vetoes every action, recording the counter value it saw.
/// `initialize` fails on the config `b"reject"`.
#[derive(Clone)]
pub(crate) struct Scripted {
    name: &'static str,
    accept: bool,
    seen: Arc<Mutex<Vec<u64>>>,
}

impl Scripted {
    pub fn accepting(name: &'static str) -> Self {
        Self {
            name,
            accept: true,
            seen: Arc::default(),
        }
    }

    pub fn vetoing(name: &'static str) -> Self {
        Self {
            accept: false,
            ..Self::accepting(name)
        }
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.seen)
    }
}

impl RuleModule<Counter> for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self, config: &[u8]) -> RuleResult {
        if config == b"reject" {
            return Err(RuleVeto::new("configuration refused"));
        }
        Ok(())
    }

    fn process(&mut self, call: &HookCall<'_, Counter>) -> RuleResult {
        self.seen.lock().push(call.state.value);
        if self.accept {
            Ok(())
        } else {
            Err(RuleVeto::new("closed"))
        }
    }

    fn clone_box(&self) -> Box<dyn RuleModule<Counter>> {
        Box::new(self.clone())
    }
}

/// Accepts a fixed number of actions, configured as a decimal string
#[derive(Clone)]
pub(crate) struct Quota {
    name: &'static str,
    limit: u64,
    used: u64,
}

impl Quota {
    pub fn new(name: &'static str) -> Self {
        Self { name, limit: 0, used: 0 }
    }
}

impl RuleModule<Counter> for Quota {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self, config: &[u8]) -> RuleResult {
        self.limit = std::str::from_utf8(config)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| RuleVeto::new("quota must be a decimal number"))?;
        self.used = 0;
        Ok(())
    }

    fn process(&mut self, _call: &HookCall<'_, Counter>) -> RuleResult {
        if self.used >= self.limit {
            return Err(RuleVeto::new("quota exhausted"));
        }
        self.used += 1;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn RuleModule<Counter>> {
        Box::new(self.clone())
    }
}

pub(crate) fn owner_only(owner: &str) -> OwnerOnlyAccessControl {
    OwnerOnlyAccessControl::new(Principal::new(owner)).unwrap()
}
