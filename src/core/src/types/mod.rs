//! Shared identifier types for the Agora platform

pub mod digest;
pub mod principal;
pub mod resource;
pub mod role;

// Re-export commonly used types
pub use digest::{DataKey, PermissionId};
pub use principal::Principal;
pub use resource::ResourceId;
pub use role::RoleId;
