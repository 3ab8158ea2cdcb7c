//! Method registration table.
//!
//! Built once at startup from the per-group `register` functions in
//! [`super::methods`]; immutable afterwards.

use super::methods;
use super::params::Params;
use crate::error::BridgeError;
use crate::security::{SecurityLevel, TokenClaims};
use crate::terminal::Collaborators;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Everything a handler sees for one call.
pub struct Invocation<'a> {
    /// Verified identity of the caller.
    pub caller: &'a TokenClaims,
    pub params: Params<'a>,
    pub terminal: &'a Collaborators,
}

pub type Handler = Box<dyn Fn(&Invocation<'_>) -> Result<Value, BridgeError> + Send + Sync>;

pub struct MethodEntry {
    pub level: SecurityLevel,
    pub(super) handler: Handler,
}

/// Registry of bridge methods keyed by `Group.method`.
#[derive(Default)]
pub struct MethodTable {
    methods: HashMap<&'static str, MethodEntry>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full catalogue. `Debug.*` is only present with `test_reports`.
    pub fn catalogue(test_reports: bool) -> Self {
        let mut table = Self::new();
        methods::broadcast::register(&mut table);
        methods::programme::register(&mut table);
        methods::parental::register(&mut table);
        methods::configuration::register(&mut table);
        methods::media_sync::register(&mut table);
        methods::drm::register(&mut table);
        methods::manager::register(&mut table);
        if test_reports {
            methods::debug::register(&mut table);
        }
        table
    }

    /// Register a handler. Later registrations replace earlier ones.
    pub fn register<F>(&mut self, name: &'static str, level: SecurityLevel, handler: F)
    where
        F: Fn(&Invocation<'_>) -> Result<Value, BridgeError> + Send + Sync + 'static,
    {
        let previous = self.methods.insert(
            name,
            MethodEntry {
                level,
                handler: Box::new(handler),
            },
        );
        debug_assert!(previous.is_none(), "method {name} registered twice");
    }

    /// Entry plus its interned name.
    pub fn lookup(&self, name: &str) -> Option<(&'static str, &MethodEntry)> {
        self.methods.get_key_value(name).map(|(k, v)| (*k, v))
    }

    pub fn level(&self, name: &str) -> Option<SecurityLevel> {
        self.methods.get(name).map(|e| e.level)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Wrap a handler's return value.
pub fn result<T: Serialize>(value: T) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(value)?)
}

/// Result of a void handler.
pub fn void() -> Result<Value, BridgeError> {
    Ok(Value::Null)
}
