//! Ports layer.
//!
//! - Inbound (Driving) port: the API the runtime drives
//! - Outbound (Driven) ports: cache, durable store, sink, clock

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
