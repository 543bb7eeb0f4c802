//! # Agora Core
//!
//! Shared identifiers for the Agora platform. Every primitive (feeds, graphs,
//! groups, apps) and the authorization core agree on these types, so they live
//! in their own crate with no dependency on either.

pub mod error;
pub mod id;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use id::{IdAllocator, IdGenerator};
pub use types::{DataKey, PermissionId, Principal, ResourceId, RoleId};
