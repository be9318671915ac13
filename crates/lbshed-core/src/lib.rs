// lbshed-core: Node state management and device discovery between
// lbshed-api and consumers (CLI).

pub mod address;
pub mod device;
pub mod environment;
pub mod error;
pub mod nodes;
pub mod partition;

// ── Primary re-exports ──────────────────────────────────────────────
pub use address::{AddressResolver, NameService, NodeAddress, SuffixPolicy, SystemNameService};
pub use device::{DeviceConnection, DeviceSettings};
pub use environment::{CredentialStore, Environment, EnvironmentSettings, FailoverProbe};
pub use error::CoreError;
pub use nodes::{NodeAssistant, NodeStatusRecord};
pub use partition::PartitionScope;

// Re-export the wire types consumers see in public signatures.
pub use lbshed_api::{
    Capability, FailoverState, RouteDomain, SessionState, TlsMode, TransportConfig,
};
