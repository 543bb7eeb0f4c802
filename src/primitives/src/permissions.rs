//! Permissions checked by the primitives
//!
//! Identifiers are derived from `agora.permission.<Name>`, so every
//! deployment agrees on them.

use agora_core::PermissionId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Install, reconfigure or clear a primitive's rule module
    SetRules,
    /// Add, update or remove extra data
    SetExtraData,
    /// Delete another author's post
    DeletePost,
    /// Add another account to a group
    AddMember,
    /// Remove another account from a group
    RemoveMember,
    /// Manage an app's feeds and its default feed
    SetFeeds,
    /// Manage an app's graphs and its default graph
    SetGraphs,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::SetRules,
        Permission::SetExtraData,
        Permission::DeletePost,
        Permission::AddMember,
        Permission::RemoveMember,
        Permission::SetFeeds,
        Permission::SetGraphs,
    ];

    /// Stable name the identifier is derived from
    pub fn name(self) -> &'static str {
        match self {
            Permission::SetRules => "agora.permission.SetRules",
            Permission::SetExtraData => "agora.permission.SetExtraData",
            Permission::DeletePost => "agora.permission.DeletePost",
            Permission::AddMember => "agora.permission.AddMember",
            Permission::RemoveMember => "agora.permission.RemoveMember",
            Permission::SetFeeds => "agora.permission.SetFeeds",
            Permission::SetGraphs => "agora.permission.SetGraphs",
        }
    }

    pub fn id(self) -> PermissionId {
        PermissionId::from_name(self.name())
    }
}

impl From<Permission> for PermissionId {
    fn from(permission: Permission) -> Self {
        permission.id()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
