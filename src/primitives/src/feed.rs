//! Feeds: ordered collections of posts
//!
//! Every post action runs under the Notify discipline. The feed's rule sees
//! the post already created, edited or deleted and can still veto, in which
//! case the change and the id allocation are undone.

use crate::base::{Primitive, PrimitiveBase};
use crate::permissions::Permission;
use agora_authz::{
    require_self, AccessControl, AuthzError, Discipline, Event, EventSink, HookAction, HookCall, Result,
    RuleModule, RuleSlot, RuleTarget,
};
use agora_core::{IdGenerator, Principal, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: ResourceId,
    pub author: Principal,
    pub content_uri: String,
    /// Number of edits since creation
    pub revision: u32,
}

/// Posts of one feed, as rule modules see them. Serialized as a list of
/// posts in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Post>", from = "Vec<Post>")]
pub struct FeedState {
    posts: BTreeMap<ResourceId, Post>,
}

impl From<FeedState> for Vec<Post> {
    fn from(state: FeedState) -> Self {
        state.posts.into_values().collect()
    }
}

impl From<Vec<Post>> for FeedState {
    fn from(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into_iter().map(|post| (post.id, post)).collect(),
        }
    }
}

impl FeedState {
    pub fn post(&self, id: ResourceId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn posts_by<'a>(&'a self, author: &'a Principal) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts.values().filter(move |post| post.author == *author)
    }

    fn require_post(&self, id: ResourceId) -> Result<&Post> {
        self.post(id)
            .ok_or_else(|| AuthzError::NotFound(format!("post {}", id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    CreatePost { post: ResourceId, author: Principal },
    EditPost { post: ResourceId },
    DeletePost { post: ResourceId },
}

impl HookAction for FeedAction {
    fn name(&self) -> &'static str {
        match self {
            FeedAction::CreatePost { .. } => "feed.create_post",
            FeedAction::EditPost { .. } => "feed.edit_post",
            FeedAction::DeletePost { .. } => "feed.delete_post",
        }
    }
}

impl RuleTarget for FeedState {
    type Action = FeedAction;
}

#[derive(Clone)]
struct FeedUnit {
    state: FeedState,
    ids: IdGenerator,
    rules: RuleSlot<FeedState>,
}

pub struct Feed {
    base: PrimitiveBase,
    unit: FeedUnit,
}

impl Feed {
    pub fn new(id: ResourceId, ids: IdGenerator, access: Arc<dyn AccessControl>, events: Arc<dyn EventSink>) -> Self {
        Self {
            base: PrimitiveBase::new("feed", id, access, events),
            unit: FeedUnit {
                state: FeedState::default(),
                ids,
                rules: RuleSlot::empty(),
            },
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.unit.state
    }

    pub fn post(&self, id: ResourceId) -> Option<&Post> {
        self.unit.state.post(id)
    }

    /// Publish a post as `author`. Only the author may post for itself.
    pub fn create_post(
        &mut self,
        caller: &Principal,
        author: &Principal,
        content_uri: impl Into<String>,
        rule_data: &[u8],
    ) -> Result<ResourceId> {
        let content_uri = content_uri.into();
        let base = &self.base;

        let post = base.dispatcher().execute(
            Discipline::Notify,
            "feed.create_post",
            &mut self.unit,
            |_| require_self(caller, author),
            |unit| Ok(unit.ids.next_id()?),
            |unit, id| {
                unit.state.posts.insert(
                    *id,
                    Post {
                        id: *id,
                        author: author.clone(),
                        content_uri,
                        revision: 0,
                    },
                );
                Ok(*id)
            },
            |unit, id| {
                unit.rules.process(&HookCall {
                    actor: caller,
                    primitive: base.id(),
                    action: &FeedAction::CreatePost {
                        post: *id,
                        author: author.clone(),
                    },
                    state: &unit.state,
                    access: base.access(),
                    data: rule_data,
                })
            },
        )?;

        info!("feed {}: {} created post {}", base.id(), author, post);
        base.emit(Event::PostCreated {
            feed: base.id(),
            post,
            author: author.clone(),
        });
        Ok(post)
    }

    /// Replace a post's content. Only its author may edit it.
    pub fn edit_post(
        &mut self,
        caller: &Principal,
        post: ResourceId,
        content_uri: impl Into<String>,
        rule_data: &[u8],
    ) -> Result<()> {
        let content_uri = content_uri.into();
        let base = &self.base;

        base.dispatcher().execute(
            Discipline::Notify,
            "feed.edit_post",
            &mut self.unit,
            |unit| require_self(caller, &unit.state.require_post(post)?.author),
            |_| Ok(()),
            |unit, _| {
                let entry = unit
                    .state
                    .posts
                    .get_mut(&post)
                    .ok_or_else(|| AuthzError::NotFound(format!("post {}", post)))?;
                entry.content_uri = content_uri;
                entry.revision += 1;
                Ok(())
            },
            |unit, _| {
                unit.rules.process(&HookCall {
                    actor: caller,
                    primitive: base.id(),
                    action: &FeedAction::EditPost { post },
                    state: &unit.state,
                    access: base.access(),
                    data: rule_data,
                })
            },
        )?;

        base.emit(Event::PostEdited {
            feed: base.id(),
            post,
            author: caller.clone(),
        });
        Ok(())
    }

    /// Delete a post. Its author may always delete it; anyone else needs
    /// `DeletePost` on the feed.
    pub fn delete_post(&mut self, caller: &Principal, post: ResourceId, rule_data: &[u8]) -> Result<()> {
        let base = &self.base;

        base.dispatcher().execute(
            Discipline::Notify,
            "feed.delete_post",
            &mut self.unit,
            |unit| {
                if unit.state.require_post(post)?.author == *caller {
                    Ok(())
                } else {
                    base.require(caller, Permission::DeletePost)
                }
            },
            |_| Ok(()),
            |unit, _| {
                unit.state.posts.remove(&post);
                Ok(())
            },
            |unit, _| {
                unit.rules.process(&HookCall {
                    actor: caller,
                    primitive: base.id(),
                    action: &FeedAction::DeletePost { post },
                    state: &unit.state,
                    access: base.access(),
                    data: rule_data,
                })
            },
        )?;

        info!("feed {}: post {} deleted by {}", base.id(), post, caller);
        base.emit(Event::PostDeleted {
            feed: base.id(),
            post,
            by: caller.clone(),
        });
        Ok(())
    }

    pub fn set_rule(&mut self, caller: &Principal, module: Box<dyn RuleModule<FeedState>>, config: &[u8]) -> Result<()> {
        self.base.set_rule(&mut self.unit.rules, caller, module, config)
    }

    pub fn configure_rule(&mut self, caller: &Principal, config: &[u8]) -> Result<()> {
        self.base.configure_rule(&mut self.unit.rules, caller, config)
    }

    pub fn clear_rule(&mut self, caller: &Principal) -> Result<()> {
        self.base.clear_rule(&mut self.unit.rules, caller)
    }

    pub fn rule(&self) -> Option<&str> {
        self.unit.rules.name()
    }
}

impl Primitive for Feed {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{platform, Platform};
    use agora_authz::{Event, RuleResult, RuleVeto};

    /// Vetoes posts once the author already has `limit` of them
    #[derive(Clone)]
    struct PostLimit {
        limit: usize,
    }

    impl RuleModule<FeedState> for PostLimit {
        fn name(&self) -> &str {
            "post-limit"
        }

        fn initialize(&mut self, config: &[u8]) -> RuleResult {
            self.limit = config.first().copied().map(usize::from).unwrap_or(1);
            Ok(())
        }

        fn process(&mut self, call: &HookCall<'_, FeedState>) -> RuleResult {
            match call.action {
                FeedAction::CreatePost { author, .. } if call.state.posts_by(author).count() > self.limit => {
                    Err(RuleVeto::new("too many posts"))
                }
                _ => Ok(()),
            }
        }

        fn clone_box(&self) -> Box<dyn RuleModule<FeedState>> {
            Box::new(self.clone())
        }
    }

    fn feed(p: &Platform) -> Feed {
        Feed::new(p.next_primitive_id(), p.ids.generator(), p.acl.clone(), p.sink.clone())
    }

    #[test]
    fn test_create_edit_delete() {
        let p = platform();
        let mut feed = feed(&p);

        let post = feed.create_post(&p.alice, &p.alice, "ipfs://one", b"").unwrap();
        feed.edit_post(&p.alice, post, "ipfs://two", b"").unwrap();
        assert_eq!(feed.post(post).unwrap().content_uri, "ipfs://two");
        assert_eq!(feed.post(post).unwrap().revision, 1);

        assert!(matches!(
            feed.edit_post(&p.bob, post, "ipfs://evil", b""),
            Err(AuthzError::AccessDenied(_))
        ));
        feed.delete_post(&p.alice, post, b"").unwrap();
        assert!(feed.state().is_empty());

        let names: Vec<_> = p.sink.events().iter().map(Event::name).collect();
        assert!(names.ends_with(&["post_created", "post_edited", "post_deleted"]));
    }

    #[test]
    fn test_cannot_post_for_someone_else() {
        let p = platform();
        let mut feed = feed(&p);
        assert!(feed.create_post(&p.bob, &p.alice, "ipfs://x", b"").is_err());
        assert_eq!(feed.dispatch_metrics().denied, 1);
    }

    #[test]
    fn test_moderator_may_delete_with_permission() {
        let p = platform();
        let mut feed = feed(&p);
        let post = feed.create_post(&p.alice, &p.alice, "ipfs://x", b"").unwrap();

        assert!(feed.delete_post(&p.bob, post, b"").is_err());
        p.allow(&p.bob, Permission::DeletePost);
        feed.delete_post(&p.bob, post, b"").unwrap();
        assert!(feed.post(post).is_none());
    }

    #[test]
    fn test_notify_veto_undoes_post_and_id() {
        let p = platform();
        let mut feed = feed(&p);
        feed.set_rule(&p.owner, Box::new(PostLimit { limit: 0 }), &[1]).unwrap();

        let first = feed.create_post(&p.alice, &p.alice, "ipfs://1", b"").unwrap();
        let err = feed.create_post(&p.alice, &p.alice, "ipfs://2", b"").unwrap_err();
        assert!(matches!(err, AuthzError::RuleRejected { ref rule, .. } if rule == "post-limit"));
        assert_eq!(feed.state().len(), 1);

        // The rolled-back allocation is handed out again
        feed.clear_rule(&p.owner).unwrap();
        let second = feed.create_post(&p.alice, &p.alice, "ipfs://2", b"").unwrap();
        assert_eq!(second.sequence(), first.sequence() + 1);
    }

    #[test]
    fn test_rule_management_requires_set_rules() {
        let p = platform();
        let mut feed = feed(&p);

        assert!(matches!(
            feed.set_rule(&p.alice, Box::new(PostLimit { limit: 1 }), b""),
            Err(AuthzError::AccessDenied(_))
        ));
        assert!(matches!(
            feed.clear_rule(&p.owner),
            Err(AuthzError::MissingExtensionModule(_))
        ));

        p.allow(&p.alice, Permission::SetRules);
        feed.set_rule(&p.alice, Box::new(PostLimit { limit: 1 }), b"").unwrap();
        feed.configure_rule(&p.alice, &[3]).unwrap();
        assert_eq!(feed.rule(), Some("post-limit"));
    }

    #[test]
    fn test_state_serializes_as_post_list() {
        let p = platform();
        let mut feed = feed(&p);
        let first = feed.create_post(&p.alice, &p.alice, "ipfs://one", b"").unwrap();
        feed.create_post(&p.bob, &p.bob, "ipfs://two", b"").unwrap();
        feed.edit_post(&p.alice, first, "ipfs://three", b"").unwrap();

        let json = serde_json::to_value(feed.state()).unwrap();
        let posts = json.as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["content_uri"], "ipfs://three");
        assert_eq!(posts[0]["revision"], 1);

        let restored: FeedState = serde_json::from_value(json).unwrap();
        assert_eq!(&restored, feed.state());
    }
}
