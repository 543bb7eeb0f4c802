//! Configuration for access control instances
//!
//! An access control instance can be bootstrapped from JSON:
//!
//! ```json
//! {
//!   "owner": "account:root",
//!   "grants": [{ "account": "account:mod", "role": 42 }],
//!   "access": [
//!     { "role": 42, "permission": "agora.permission.DeletePost", "decision": "granted" },
//!     { "role": 42, "resource": { "namespace": 1, "sequence": 7 }, "decision": "denied" }
//!   ]
//! }
//! ```
//!
//! An absent `resource` means any resource and an absent `permission` means
//! any permission. Permissions are given by their stable name.

use crate::access::AccessDecision;
use crate::error::{AuthzError, Result};
use crate::scope::{AccessKey, PermissionScope, ResourceScope};
use agora_core::{PermissionId, Principal, ResourceId, RoleId};
use serde::{Deserialize, Serialize};

/// Permission resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// The reserved owner role resolves to granted for every query
    #[serde(default = "default_true")]
    pub owner_has_full_access: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            owner_has_full_access: true,
        }
    }
}

/// Initial role assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantConfig {
    pub account: Principal,
    pub role: RoleId,
}

/// Initial access entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntryConfig {
    pub role: RoleId,

    /// Specific resource; absent means any resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceId>,

    /// Stable permission name; absent means any permission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    pub decision: AccessDecision,
}

impl AccessEntryConfig {
    /// Table key this entry targets
    pub fn key(&self) -> AccessKey {
        AccessKey {
            role: self.role,
            resource: self.resource.map_or(ResourceScope::Any, ResourceScope::Resource),
            permission: self
                .permission
                .as_deref()
                .map_or(PermissionScope::Any, |name| {
                    PermissionScope::Permission(PermissionId::from_name(name))
                }),
        }
    }
}

/// Bootstrap configuration of a role-based access control instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlConfig {
    pub owner: Principal,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub grants: Vec<RoleGrantConfig>,

    #[serde(default)]
    pub access: Vec<AccessEntryConfig>,
}

impl AccessControlConfig {
    /// Configuration with only an owner
    pub fn new(owner: impl Into<Principal>) -> Self {
        Self {
            owner: owner.into(),
            resolver: ResolverConfig::default(),
            grants: Vec::new(),
            access: Vec::new(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AuthzError::InvalidConfig(format!("malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never be applied
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_absent() {
            return Err(AuthzError::InvalidConfig("owner is required".to_string()));
        }

        for grant in &self.grants {
            if grant.account.is_absent() {
                return Err(AuthzError::InvalidConfig(
                    "role grant with an absent account".to_string(),
                ));
            }
            if grant.role.is_owner() {
                return Err(AuthzError::InvalidConfig(format!(
                    "{} cannot be granted the owner role; set it as owner instead",
                    grant.account
                )));
            }
        }

        for entry in &self.access {
            if entry.role.is_owner() {
                return Err(AuthzError::InvalidConfig(
                    "access entries cannot target the owner role".to_string(),
                ));
            }
            if matches!(entry.permission.as_deref(), Some(name) if name.trim().is_empty()) {
                return Err(AuthzError::InvalidConfig(
                    "permission names cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
