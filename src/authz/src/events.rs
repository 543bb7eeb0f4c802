//! Change notifications for external observers (indexers, audit logs)
//!
//! Operations emit only after they commit, so an observer never sees an event
//! for an action that was rejected or rolled back.

use crate::scope::{PermissionScope, ResourceScope};
use agora_core::{DataKey, Principal, ResourceId, RoleId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Every change notification the platform emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Access control
    RoleGranted {
        account: Principal,
        role: RoleId,
    },
    RoleRevoked {
        account: Principal,
        role: RoleId,
    },
    AccessAdded {
        role: RoleId,
        resource: ResourceScope,
        permission: PermissionScope,
        granted: bool,
    },
    AccessUpdated {
        role: RoleId,
        resource: ResourceScope,
        permission: PermissionScope,
        granted: bool,
    },
    AccessRemoved {
        role: RoleId,
        resource: ResourceScope,
        permission: PermissionScope,
    },
    OwnershipTransferred {
        previous: Principal,
        owner: Principal,
    },

    // Extra data
    ExtraDataAdded {
        source: ResourceId,
        key: DataKey,
        value: Vec<u8>,
    },
    ExtraDataUpdated {
        source: ResourceId,
        key: DataKey,
        value: Vec<u8>,
    },
    ExtraDataRemoved {
        source: ResourceId,
        key: DataKey,
    },

    // Default slots
    DefaultAdded {
        source: ResourceId,
        kind: String,
        resource: ResourceId,
    },
    DefaultUpdated {
        source: ResourceId,
        kind: String,
        previous: ResourceId,
        resource: ResourceId,
    },
    DefaultRemoved {
        source: ResourceId,
        kind: String,
        previous: ResourceId,
    },

    // Rule modules
    RuleConfigured {
        source: ResourceId,
        target: Option<Principal>,
        rule: String,
    },
    RuleCleared {
        source: ResourceId,
        target: Option<Principal>,
        rule: String,
    },

    // Feeds
    PostCreated {
        feed: ResourceId,
        post: ResourceId,
        author: Principal,
    },
    PostEdited {
        feed: ResourceId,
        post: ResourceId,
        author: Principal,
    },
    PostDeleted {
        feed: ResourceId,
        post: ResourceId,
        by: Principal,
    },

    // Graphs
    Followed {
        graph: ResourceId,
        follow: ResourceId,
        follower: Principal,
        target: Principal,
    },
    Unfollowed {
        graph: ResourceId,
        follow: ResourceId,
        follower: Principal,
        target: Principal,
    },
    FollowRuleChanged {
        graph: ResourceId,
        account: Principal,
        rule: Option<String>,
    },

    // Groups
    MemberJoined {
        group: ResourceId,
        account: Principal,
    },
    MemberLeft {
        group: ResourceId,
        account: Principal,
    },
    MemberAdded {
        group: ResourceId,
        account: Principal,
        by: Principal,
    },
    MemberRemoved {
        group: ResourceId,
        account: Principal,
        by: Principal,
    },

    // Apps
    AppResourceAdded {
        app: ResourceId,
        kind: String,
        resource: ResourceId,
    },
    AppResourceRemoved {
        app: ResourceId,
        kind: String,
        resource: ResourceId,
    },
}

impl Event {
    /// Snake-case name of the event, as used in the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            Event::RoleGranted { .. } => "role_granted",
            Event::RoleRevoked { .. } => "role_revoked",
            Event::AccessAdded { .. } => "access_added",
            Event::AccessUpdated { .. } => "access_updated",
            Event::AccessRemoved { .. } => "access_removed",
            Event::OwnershipTransferred { .. } => "ownership_transferred",
            Event::ExtraDataAdded { .. } => "extra_data_added",
            Event::ExtraDataUpdated { .. } => "extra_data_updated",
            Event::ExtraDataRemoved { .. } => "extra_data_removed",
            Event::DefaultAdded { .. } => "default_added",
            Event::DefaultUpdated { .. } => "default_updated",
            Event::DefaultRemoved { .. } => "default_removed",
            Event::RuleConfigured { .. } => "rule_configured",
            Event::RuleCleared { .. } => "rule_cleared",
            Event::PostCreated { .. } => "post_created",
            Event::PostEdited { .. } => "post_edited",
            Event::PostDeleted { .. } => "post_deleted",
            Event::Followed { .. } => "followed",
            Event::Unfollowed { .. } => "unfollowed",
            Event::FollowRuleChanged { .. } => "follow_rule_changed",
            Event::MemberJoined { .. } => "member_joined",
            Event::MemberLeft { .. } => "member_left",
            Event::MemberAdded { .. } => "member_added",
            Event::MemberRemoved { .. } => "member_removed",
            Event::AppResourceAdded { .. } => "app_resource_added",
            Event::AppResourceRemoved { .. } => "app_resource_removed",
        }
    }
}

/// Receiver of change notifications.
///
/// Emitters may hold their own lock while calling `emit`, so a sink must not
/// call back into the component that emitted the event.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(event = event.name(), "{}", json),
            Err(_) => info!(event = event.name(), "{:?}", event),
        }
    }
}

/// An emitted event with its position and emission time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub emitted_at: DateTime<Utc>,
    pub event: Event,
}

/// In-memory, sequence-numbered event log
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<MemoryLog>,
}

#[derive(Debug, Default)]
struct MemoryLog {
    next_sequence: u64,
    records: Vec<EventRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all retained records
    pub fn records(&self) -> Vec<EventRecord> {
        self.inner.lock().records.clone()
    }

    /// Retained events without their envelopes
    pub fn events(&self) -> Vec<Event> {
        self.inner
            .lock()
            .records
            .iter()
            .map(|record| record.event.clone())
            .collect()
    }

    /// Take all retained records; sequence numbers keep counting
    pub fn drain(&self) -> Vec<EventRecord> {
        std::mem::take(&mut self.inner.lock().records)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        let mut log = self.inner.lock();
        let sequence = log.next_sequence;
        log.next_sequence += 1;
        log.records.push(EventRecord {
            sequence,
            emitted_at: Utc::now(),
            event,
        });
    }
}
