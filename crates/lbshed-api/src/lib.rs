// lbshed-api: Async Rust client for the load-balancer device management API

pub mod client;
pub mod error;
pub mod failover;
pub mod nodes;
pub mod partitions;
pub mod routing;
pub mod transport;
pub mod types;

pub use client::DeviceClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{Capability, FailoverState, FailoverStatus, RouteDomain, SessionState};
