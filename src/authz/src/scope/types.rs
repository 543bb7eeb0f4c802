//! Scope type definitions
//!
//! Explicit tagged wildcards for the two dimensions of an access entry.

use crate::error::{AuthzError, Result};
use agora_core::{PermissionId, ResourceId, RoleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The resource dimension of an access entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceScope {
    /// Any resource (stored keys only)
    Any,
    /// One specific resource
    Resource(ResourceId),
}

impl ResourceScope {
    /// Whether this is the wildcard
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// The concrete resource, or `InvalidQuery` for the wildcard
    pub fn concrete(&self) -> Result<ResourceId> {
        match self {
            Self::Resource(id) => Ok(*id),
            Self::Any => Err(AuthzError::InvalidQuery(
                "AnyResource cannot be used as a query argument".to_string(),
            )),
        }
    }
}

impl From<ResourceId> for ResourceScope {
    fn from(id: ResourceId) -> Self {
        Self::Resource(id)
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any-resource"),
            Self::Resource(id) => write!(f, "{}", id),
        }
    }
}

/// The permission dimension of an access entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Any permission (stored keys only)
    Any,
    /// One specific permission
    Permission(PermissionId),
}

impl PermissionScope {
    /// Whether this is the wildcard
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// The concrete permission, or `InvalidQuery` for the wildcard
    pub fn concrete(&self) -> Result<PermissionId> {
        match self {
            Self::Permission(id) => Ok(*id),
            Self::Any => Err(AuthzError::InvalidQuery(
                "AnyPermission cannot be used as a query argument".to_string(),
            )),
        }
    }
}

impl From<PermissionId> for PermissionScope {
    fn from(id: PermissionId) -> Self {
        Self::Permission(id)
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any-permission"),
            Self::Permission(id) => write!(f, "{}", id),
        }
    }
}

/// Full key of an access-table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessKey {
    pub role: RoleId,
    pub resource: ResourceScope,
    pub permission: PermissionScope,
}

impl AccessKey {
    pub fn new(
        role: RoleId,
        resource: impl Into<ResourceScope>,
        permission: impl Into<PermissionScope>,
    ) -> Self {
        Self {
            role,
            resource: resource.into(),
            permission: permission.into(),
        }
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.role, self.resource, self.permission)
    }
}
