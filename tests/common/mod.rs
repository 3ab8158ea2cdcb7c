//! Integration test common infrastructure.
//!
//! Provides utilities for spawning a bridge daemon and driving it with a
//! JSON-lines client.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
