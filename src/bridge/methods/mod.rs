//! Method catalogue, one module per functional group.
//!
//! Each module exposes `register(&mut MethodTable)`; handlers decode their
//! parameters with [`Params`](super::params::Params) and call exactly one
//! collaborator method.

pub mod broadcast;
pub mod configuration;
pub mod debug;
pub mod drm;
pub mod manager;
pub mod media_sync;
pub mod parental;
pub mod programme;
