//! Per-method trust policy.
//!
//! Every bridge method declares a [`SecurityLevel`]. Before the handler runs,
//! the dispatcher asks an [`Authorizer`] whether the verified caller may use
//! that level right now. [`ContextPolicy`] is the bundled authorizer: it
//! tracks which application is running and what kind of application it is.

use crate::bridge::events::{EventDispatcher, names};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Trust requirement a bridge method places on its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityLevel {
    /// Any application, running or not.
    AnyApp,
    /// The currently running application.
    RunningAppOnly,
    /// The running application, while it is broadcast-related.
    BroadcastAppOnly,
    /// The running application, while broadcast-related or transitioning to it.
    BroadcastOrTransitioningAppOnly,
    /// The running application, when it is trusted.
    TrustedAppOnly,
}

impl SecurityLevel {
    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnyApp => "any_app",
            Self::RunningAppOnly => "running_app_only",
            Self::BroadcastAppOnly => "broadcast_app_only",
            Self::BroadcastOrTransitioningAppOnly => "broadcast_or_transitioning_app_only",
            Self::TrustedAppOnly => "trusted_app_only",
        }
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether an authenticated caller may use a security level.
///
/// Consulted on every request; implementations must be side-effect free.
pub trait Authorizer: Send + Sync {
    fn is_allowed(&self, app_id: u32, uri: &str, level: SecurityLevel) -> bool;
}

/// What the application manager knows about one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    pub uri: String,
    pub broadcast_related: bool,
    pub transitioning: bool,
    pub trusted: bool,
}

/// Authorizer driven by the application lifecycle.
///
/// At most one application runs at a time; launching another replaces it.
#[derive(Debug, Default)]
pub struct ContextPolicy {
    apps: DashMap<u32, AppContext>,
    running: RwLock<Option<u32>>,
    events: Option<EventDispatcher>,
}

impl ContextPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce transitions to broadcast-related through `events`.
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = Some(events);
        self
    }

    /// Register (or replace) an application's context.
    pub fn register(&self, app_id: u32, context: AppContext) {
        debug!(app_id, uri = %context.uri, "Application context registered");
        self.apps.insert(app_id, context);
    }

    /// Make `app_id` the running application.
    ///
    /// Returns `false` if the application was never registered.
    pub fn launch(&self, app_id: u32) -> bool {
        if !self.apps.contains_key(&app_id) {
            return false;
        }
        let previous = self.running.write().replace(app_id);
        info!(app_id, previous = ?previous, "Application launched");
        true
    }

    /// Stop `app_id` if it is the running application.
    pub fn stop(&self, app_id: u32) {
        let mut running = self.running.write();
        if *running == Some(app_id) {
            *running = None;
            info!(app_id, "Application stopped");
        }
    }

    /// Mark the running application broadcast-related or broadcast-independent.
    ///
    /// Either way the application is no longer transitioning. Returns the
    /// application whose context changed, if one was running.
    pub fn set_broadcast_related(&self, related: bool) -> Option<u32> {
        let app_id = self.running()?;
        let became_related = {
            let mut ctx = self.apps.get_mut(&app_id)?;
            let was_related = ctx.broadcast_related;
            ctx.broadcast_related = related;
            ctx.transitioning = false;
            related && !was_related
        };
        debug!(app_id, related, "Broadcast relation updated");
        if became_related && let Some(events) = &self.events {
            events.dispatch_json(
                names::TRANSITIONED_TO_BROADCAST_RELATED,
                serde_json::json!({ "appId": app_id }),
            );
        }
        Some(app_id)
    }

    /// Currently running application, if any.
    pub fn running(&self) -> Option<u32> {
        *self.running.read()
    }
}

impl Authorizer for ContextPolicy {
    fn is_allowed(&self, app_id: u32, uri: &str, level: SecurityLevel) -> bool {
        if level == SecurityLevel::AnyApp {
            return true;
        }
        if self.running() != Some(app_id) {
            return false;
        }
        let Some(ctx) = self.apps.get(&app_id) else {
            return false;
        };
        if ctx.uri != uri {
            return false;
        }
        match level {
            SecurityLevel::AnyApp | SecurityLevel::RunningAppOnly => true,
            SecurityLevel::BroadcastAppOnly => ctx.broadcast_related,
            SecurityLevel::BroadcastOrTransitioningAppOnly => {
                ctx.broadcast_related || ctx.transitioning
            }
            SecurityLevel::TrustedAppOnly => ctx.trusted,
        }
    }
}
