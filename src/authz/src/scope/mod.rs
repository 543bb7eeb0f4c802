//! Access-table key dimensions
//!
//! An access entry is keyed by a role, a resource scope and a permission
//! scope. Either scope may be the wildcard `Any`, which is only meaningful as
//! a stored key. Queries take concrete [`ResourceId`](agora_core::ResourceId)
//! and [`PermissionId`](agora_core::PermissionId) values, so a wildcard can
//! only reach a query through the runtime-checked path in
//! [`ResourceScope::concrete`] / [`PermissionScope::concrete`].
//!
//! # Examples
//!
//! ```
//! use agora_authz::scope::{PermissionScope, ResourceScope};
//! use agora_core::PermissionId;
//!
//! let create = PermissionScope::from(PermissionId::from_name("agora.permission.CreatePost"));
//! assert!(!create.is_any());
//! assert!(ResourceScope::Any.concrete().is_err());
//! ```

mod types;


pub use types::{AccessKey, PermissionScope, ResourceScope};
