//! Security module for the bridge.
//!
//! Provides the two checks every bridge request passes through:
//! - **Tokens**: HMAC-SHA256 capability tokens proving who is asking
//! - **Policy**: per-method security levels checked against the caller's
//!   current application context
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Security Module                    │
//! ├─────────────────────────┬───────────────────────────┤
//! │     TokenAuthority      │       ContextPolicy       │
//! │  HMAC-SHA256 + base64   │  running app + app kind   │
//! │  per-process secret     │  SecurityLevel checks     │
//! └─────────────────────────┴───────────────────────────┘
//! ```

pub mod policy;
pub mod token;

pub use policy::{AppContext, Authorizer, ContextPolicy, SecurityLevel};
pub use token::{AuthenticationFailure, CapabilityToken, TokenAuthority, TokenClaims};
