//! Holder for an optional rule module

use super::{HookAction, HookCall, RuleModule, RuleTarget};
use crate::error::{AuthzError, Result};
use tracing::{debug, warn};

/// An optional extension module. Empty means "no custom rule": only the base
/// authorization gate applies.
pub struct RuleSlot<S: RuleTarget> {
    module: Option<Box<dyn RuleModule<S>>>,
}

impl<S: RuleTarget> RuleSlot<S> {
    pub fn empty() -> Self {
        Self { module: None }
    }

    pub fn is_set(&self) -> bool {
        self.module.is_some()
    }

    /// Name of the installed module
    pub fn name(&self) -> Option<&str> {
        self.module.as_deref().map(|module| module.name())
    }

    /// Initialize `module` with `config` and install it, replacing any
    /// previous module. Returns the replaced module's name.
    ///
    /// If initialization fails the slot is left as it was.
    pub fn set(&mut self, mut module: Box<dyn RuleModule<S>>, config: &[u8]) -> Result<Option<String>> {
        let name = module.name().to_string();
        module.initialize(config).map_err(|veto| AuthzError::RuleRejected {
            rule: name.clone(),
            action: "initialize".to_string(),
            reason: veto.reason,
        })?;

        debug!("Installed rule module '{}'", name);
        Ok(self
            .module
            .replace(module)
            .map(|previous| previous.name().to_string()))
    }

    /// Remove the module, returning its name
    pub fn clear(&mut self) -> Option<String> {
        self.module.take().map(|module| module.name().to_string())
    }

    /// Re-initialize the installed module
    pub fn configure(&mut self, config: &[u8]) -> Result<()> {
        let module = self.module.as_deref_mut().ok_or_else(|| {
            AuthzError::MissingExtensionModule("no rule module is configured".to_string())
        })?;

        module.initialize(config).map_err(|veto| AuthzError::RuleRejected {
            rule: module.name().to_string(),
            action: "initialize".to_string(),
            reason: veto.reason,
        })
    }

    /// Run the module's hook for `call`. An empty slot accepts.
    pub fn process(&mut self, call: &HookCall<'_, S>) -> Result<()> {
        let Some(module) = self.module.as_deref_mut() else {
            return Ok(());
        };

        debug!("Rule '{}' processing {:?}", module.name(), call);
        module.process(call).map_err(|veto| {
            warn!(
                "Rule '{}' vetoed {} by {}: {}",
                module.name(),
                call.action.name(),
                call.actor,
                veto.reason
            );
            AuthzError::RuleRejected {
                rule: module.name().to_string(),
                action: call.action.name().to_string(),
                reason: veto.reason,
            }
        })
    }
}

impl<S: RuleTarget> Default for RuleSlot<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: RuleTarget> Clone for RuleSlot<S> {
    fn clone(&self) -> Self {
        Self {
            module: self.module.clone(),
        }
    }
}

impl<S: RuleTarget> std::fmt::Debug for RuleSlot<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSlot").field("module", &self.name()).finish()
    }
}
