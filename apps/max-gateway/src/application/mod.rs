//! Application layer - wiring between the domain and the channel adapters.

pub mod context;

pub use context::{ConfigMap, GatewayContext};
