//! # Agora Primitives
//!
//! Feeds, follow graphs, groups and apps built on the authorization core.
//!
//! Every primitive owns its state and guards it in two layers: an
//! [`AccessControl`](agora_authz::AccessControl) check, then its optional rule
//! module. The hook discipline is fixed per action:
//!
//! | Primitive | Action | Discipline |
//! |---|---|---|
//! | [`Feed`] | create / edit / delete post | Notify |
//! | [`Graph`] | follow / unfollow | Gate (graph rule, then the target's rule) |
//! | [`Graph`] | set follow rule | Gate (graph rule) |
//! | [`Group`] | join / leave / add / remove | Gate |
//! | [`App`] | feeds, graphs and defaults | no rule module |
//!
//! ## Example
//!
//! ```rust
//! use agora_authz::{MemorySink, RoleBasedAccessControl};
//! use agora_core::{IdAllocator, Principal};
//! use agora_primitives::Feed;
//! use std::sync::Arc;
//!
//! # fn main() -> agora_authz::Result<()> {
//! let owner = Principal::new("account:owner");
//! let alice = Principal::new("account:alice");
//! let acl = Arc::new(RoleBasedAccessControl::new(owner)?);
//! let ids = IdAllocator::new();
//!
//! let mut feed = Feed::new(ids.generator().next_id()?, ids.generator(), acl, Arc::new(MemorySink::new()));
//! let post = feed.create_post(&alice, &alice, "ipfs://hello", b"")?;
//! assert_eq!(feed.post(post).map(|p| p.revision), Some(0));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod base;
pub mod feed;
pub mod graph;
pub mod group;
pub mod permissions;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, AppResource};
pub use base::{Primitive, PrimitiveBase};
pub use feed::{Feed, FeedAction, FeedState, Post};
pub use graph::{Follow, Graph, GraphAction, GraphState};
pub use group::{Group, GroupAction, GroupState};
pub use permissions::Permission;
