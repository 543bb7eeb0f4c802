//! Apps: bundles of feeds and graphs with one default of each
//!
//! App actions have no rule module; they are gated by `SetFeeds` /
//! `SetGraphs` only.

use crate::base::{Primitive, PrimitiveBase};
use crate::permissions::Permission;
use agora_authz::{AccessControl, AuthzError, DefaultSlot, Event, EventSink, Result};
use agora_core::{Principal, ResourceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Kind of resource an app registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppResource {
    Feed,
    Graph,
}

impl AppResource {
    pub fn name(self) -> &'static str {
        match self {
            AppResource::Feed => "feed",
            AppResource::Graph => "graph",
        }
    }

    /// Permission needed to change this kind's registrations
    pub fn permission(self) -> Permission {
        match self {
            AppResource::Feed => Permission::SetFeeds,
            AppResource::Graph => Permission::SetGraphs,
        }
    }
}

impl fmt::Display for AppResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct App {
    base: PrimitiveBase,
    feeds: DefaultSlot<ResourceId>,
    graphs: DefaultSlot<ResourceId>,
}

impl App {
    pub fn new(id: ResourceId, access: Arc<dyn AccessControl>, events: Arc<dyn EventSink>) -> Self {
        Self {
            base: PrimitiveBase::new("app", id, access, events),
            feeds: DefaultSlot::new(),
            graphs: DefaultSlot::new(),
        }
    }

    fn slot(&self, kind: AppResource) -> &DefaultSlot<ResourceId> {
        match kind {
            AppResource::Feed => &self.feeds,
            AppResource::Graph => &self.graphs,
        }
    }

    /// Register a resource. Returns false if it was already registered.
    pub fn add(&mut self, caller: &Principal, kind: AppResource, resource: ResourceId) -> Result<bool> {
        self.base.require(caller, kind.permission())?;

        let slot = match kind {
            AppResource::Feed => &mut self.feeds,
            AppResource::Graph => &mut self.graphs,
        };
        let added = slot.register(resource);
        if added {
            info!("app {}: registered {} {}", self.base.id(), kind, resource);
            self.base.emit(Event::AppResourceAdded {
                app: self.base.id(),
                kind: kind.name().to_string(),
                resource,
            });
        }
        Ok(added)
    }

    /// Unregister a resource, clearing the default if it was the default
    pub fn remove(&mut self, caller: &Principal, kind: AppResource, resource: ResourceId) -> Result<()> {
        self.base.require(caller, kind.permission())?;

        let slot = match kind {
            AppResource::Feed => &mut self.feeds,
            AppResource::Graph => &mut self.graphs,
        };
        let was_default = slot.current_default() == Some(resource);
        if !slot.remove(resource) {
            return Err(AuthzError::NotFound(format!("{} {} is not registered", kind, resource)));
        }

        let app = self.base.id();
        if was_default {
            self.base.emit(Event::DefaultRemoved {
                source: app,
                kind: kind.name().to_string(),
                previous: resource,
            });
        }
        self.base.emit(Event::AppResourceRemoved {
            app,
            kind: kind.name().to_string(),
            resource,
        });
        Ok(())
    }

    /// Set or clear the default. A new default is registered if needed and
    /// replaces the previous one in the registered set.
    pub fn set_default(&mut self, caller: &Principal, kind: AppResource, resource: Option<ResourceId>) -> Result<()> {
        self.base.require(caller, kind.permission())?;

        let slot = match kind {
            AppResource::Feed => &mut self.feeds,
            AppResource::Graph => &mut self.graphs,
        };
        let registering = resource.filter(|r| !slot.is_registered(*r));
        let previous = slot.set_default(resource)?;

        let app = self.base.id();
        let name = kind.name().to_string();
        if let Some(resource) = registering {
            self.base.emit(Event::AppResourceAdded {
                app,
                kind: name.clone(),
                resource,
            });
        }
        match (previous, resource) {
            (None, Some(resource)) => self.base.emit(Event::DefaultAdded {
                source: app,
                kind: name,
                resource,
            }),
            (Some(previous), Some(resource)) => {
                if previous != resource {
                    self.base.emit(Event::AppResourceRemoved {
                        app,
                        kind: name.clone(),
                        resource: previous,
                    });
                }
                self.base.emit(Event::DefaultUpdated {
                    source: app,
                    kind: name,
                    previous,
                    resource,
                });
            }
            (Some(previous), None) => self.base.emit(Event::DefaultRemoved {
                source: app,
                kind: name,
                previous,
            }),
            (None, None) => {}
        }

        info!("app {}: default {} is now {:?}", app, kind, resource);
        Ok(())
    }

    pub fn current_default(&self, kind: AppResource) -> Option<ResourceId> {
        self.slot(kind).current_default()
    }

    pub fn registered(&self, kind: AppResource) -> Vec<ResourceId> {
        self.slot(kind).registered()
    }

    pub fn is_registered(&self, kind: AppResource, resource: ResourceId) -> bool {
        self.slot(kind).is_registered(resource)
    }
}

impl Primitive for App {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }
}
