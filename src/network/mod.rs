//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-client Connection handler
//! and the JSON-lines frame types.

mod connection;
mod frame;
mod gateway;

pub use connection::Connection;
pub use gateway::{BroadcastEventSink, Gateway, Session};
