//! The application bridge.
//!
//! - [`dispatcher`]: request gatekeeping and the response shape
//! - [`registry`]: the method table and handler signature
//! - [`methods`]: the catalogue, one module per functional group
//! - [`params`]: typed parameter decoding
//! - [`events`]: the outward event channel

pub mod dispatcher;
pub mod events;
pub mod methods;
pub mod params;
pub mod registry;

pub use dispatcher::{BridgeDispatcher, BridgeResponse};
pub use events::{BridgeEvent, EventDispatcher, EventSink};
pub use registry::MethodTable;
