//! JSON-lines frames exchanged with gateway clients.
//!
//! Every frame is one JSON object per line, discriminated by `"type"`.

use crate::bridge::{BridgeEvent, BridgeResponse};
use crate::security::CapabilityToken;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Frames sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Make `app` the running application and obtain its token.
    Launch { app: u32 },
    /// Stop `app` if it is running.
    Stop { app: u32 },
    /// Invoke a bridge method.
    Request {
        id: u64,
        method: String,
        token: CapabilityToken,
        #[serde(default)]
        params: Map<String, Value>,
    },
}

/// Frames sent by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Launched {
        #[serde(rename = "appId")]
        app_id: u32,
        token: CapabilityToken,
    },
    Stopped {
        #[serde(rename = "appId")]
        app_id: u32,
    },
    Response {
        id: u64,
        response: BridgeResponse,
    },
    Event(BridgeEvent),
    Error {
        message: String,
    },
}

impl ServerFrame {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize as a single line, without the terminator.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
