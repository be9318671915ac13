// Wire types for the device management API.
//
// Request/response bodies are kept 1:1 with the JSON the device speaks;
// `lbshed-core` owns the richer domain types built on top of these.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Capability groups ───────────────────────────────────────────────

/// An operation family activated for a management session.
///
/// The device rejects calls into families the session did not request,
/// so callers declare up front which surfaces they intend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "ltm.nodes")]
    LtmNodes,
    #[serde(rename = "ltm.pools")]
    LtmPools,
    #[serde(rename = "ltm.pool-members")]
    LtmPoolMembers,
    #[serde(rename = "ltm.virtual-addresses")]
    LtmVirtualAddresses,
    #[serde(rename = "ltm.virtual-servers")]
    LtmVirtualServers,
    #[serde(rename = "management.partitions")]
    ManagementPartitions,
    #[serde(rename = "net.route-domains")]
    NetRouteDomains,
    #[serde(rename = "system.failover")]
    SystemFailover,
}

impl Capability {
    /// The full set of capability groups, the default for new sessions.
    pub const ALL: &'static [Capability] = &[
        Capability::LtmNodes,
        Capability::LtmPools,
        Capability::LtmPoolMembers,
        Capability::LtmVirtualAddresses,
        Capability::LtmVirtualServers,
        Capability::ManagementPartitions,
        Capability::NetRouteDomains,
        Capability::SystemFailover,
    ];
}

// ── Node session state ──────────────────────────────────────────────

/// Whether a node accepts new sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Enabled,
    Disabled,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("enabled"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

// ── Failover ────────────────────────────────────────────────────────

/// A device's self-reported role in its redundant pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailoverState {
    Active,
    Standby,
    ForcedOffline,
    Offline,
    #[serde(other)]
    Unknown,
}

impl FailoverState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for FailoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Standby => f.write_str("standby"),
            Self::ForcedOffline => f.write_str("forced-offline"),
            Self::Offline => f.write_str("offline"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Response of `GET /mgmt/sys/failover`.
#[derive(Debug, Clone, Deserialize)]
pub struct FailoverStatus {
    pub state: FailoverState,
    /// Peer device hostname, when the device reports one.
    #[serde(default)]
    pub peer: Option<String>,
}

// ── Route domains ───────────────────────────────────────────────────

/// A routing domain configured on the device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteDomain {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
}

// ── Envelope fragments ──────────────────────────────────────────────

/// Generic `{"items": [...]}` collection wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Items<T> {
    pub items: Vec<T>,
}

/// `{"name": "..."}` -- partitions are referenced by bare name.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PartitionRef {
    pub name: String,
}

/// Fault body the device attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiFault {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Session establishment ───────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct SessionRequest<'a> {
    pub capabilities: &'a [Capability],
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub token: String,
}

// ── Node session-state bodies ───────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct SessionStateSet<'a> {
    pub addresses: &'a [String],
    pub state: SessionState,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionStateQuery<'a> {
    pub addresses: &'a [String],
}

/// `{"states": [...]}` -- order-aligned with the request's `addresses`.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionStates {
    pub states: Vec<SessionState>,
}
