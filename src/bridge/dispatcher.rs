//! Request dispatch.
//!
//! A request passes four gates in a fixed order, and the first failure
//! short-circuits the rest:
//!
//! 1. **Lookup**: the method must be in the [`MethodTable`].
//! 2. **Authentication**: the token must verify against this process's
//!    [`TokenAuthority`].
//! 3. **Authorization**: the [`Authorizer`] must allow the verified caller
//!    at the method's [`SecurityLevel`](crate::security::SecurityLevel).
//! 4. **Decode and invoke**: the handler pulls its parameters and calls
//!    exactly one collaborator.
//!
//! Failures at 1 and 2 produce the same wire error, so an unauthenticated
//! caller cannot discover which methods exist. No failure crosses the
//! dispatcher boundary as an `Err`; [`BridgeDispatcher::request`] always
//! returns a [`BridgeResponse`].

use super::registry::{Invocation, MethodTable};
use super::params::Params;
use crate::error::BridgeError;
use crate::security::{Authorizer, CapabilityToken, TokenAuthority};
use crate::telemetry::{RequestTimer, spans};
use crate::terminal::Collaborators;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Metric label for requests that never matched a method.
const UNMATCHED_METHOD: &str = "unmatched";

/// `{"result": value}` xor `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeResponse {
    Result(Value),
    Error(String),
}

pub struct BridgeDispatcher {
    methods: MethodTable,
    tokens: Arc<TokenAuthority>,
    authorizer: Arc<dyn Authorizer>,
    terminal: Collaborators,
}

impl BridgeDispatcher {
    pub fn new(
        methods: MethodTable,
        tokens: Arc<TokenAuthority>,
        authorizer: Arc<dyn Authorizer>,
        terminal: Collaborators,
    ) -> Self {
        Self {
            methods,
            tokens,
            authorizer,
            terminal,
        }
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Process one request.
    pub fn request(
        &self,
        method: &str,
        token: &CapabilityToken,
        params: &Map<String, Value>,
    ) -> BridgeResponse {
        match self.process(method, token, params) {
            Ok(value) => BridgeResponse::Result(value),
            Err(e) => {
                let label = self
                    .methods
                    .lookup(method)
                    .map_or(UNMATCHED_METHOD, |(name, _)| name);
                crate::metrics::record_request_error(label, e.error_code());
                debug!(method, error = %e, "Bridge request failed");
                BridgeResponse::Error(e.response_message())
            }
        }
    }

    fn process(
        &self,
        method: &str,
        token: &CapabilityToken,
        params: &Map<String, Value>,
    ) -> Result<Value, BridgeError> {
        let (name, entry) = self
            .methods
            .lookup(method)
            .ok_or_else(|| BridgeError::UnknownMethod(method.to_string()))?;

        let caller = self.tokens.verify(token)?;

        let span = spans::request(name, Some(caller.app_id));
        let _enter = span.enter();
        let _timer = RequestTimer::new(name);

        if !self
            .authorizer
            .is_allowed(caller.app_id, &caller.uri, entry.level)
        {
            debug!(level = %entry.level, "Caller context does not satisfy method level");
            return Err(BridgeError::Authorization(name.to_string()));
        }

        let invocation = Invocation {
            caller: &caller,
            params: Params::new(params),
            terminal: &self.terminal,
        };
        (entry.handler)(&invocation)
    }

    /// Forward an event to the registered sink.
    pub fn dispatch_event(&self, event: &str, properties: Map<String, Value>) {
        self.terminal.events.dispatch(event, properties);
    }
}
