// Node enable/disable/status over one device connection.
//
// Every operation is all-or-nothing per batch: each hostname resolves
// before the device sees a single address (no partially-resolved bulk
// submission), and one bulk control-plane call covers the whole list.

use serde::Serialize;
use tracing::info;

use lbshed_api::SessionState;

use crate::address::NodeAddress;
use crate::device::DeviceConnection;
use crate::error::CoreError;
use crate::partition::PartitionScope;

/// Per-node result of a status (or enable/disable) call.
///
/// Order always matches the input node list, duplicates included.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatusRecord {
    /// Resolved node address, as sent to the device.
    pub node: NodeAddress,
    /// Reverse-resolved hostname (bare IP when no PTR record exists).
    pub fqdn: String,
    /// Session state as reported by the device.
    pub status: SessionState,
}

/// Enable/disable/status operations over a device's nodes.
///
/// Borrowed from a [`DeviceConnection`] via
/// [`DeviceConnection::nodes`]; all operations accept an optional
/// partition and run inside a [`PartitionScope`] when one is given.
pub struct NodeAssistant<'c> {
    conn: &'c mut DeviceConnection,
}

impl<'c> NodeAssistant<'c> {
    pub(crate) fn new(conn: &'c mut DeviceConnection) -> Self {
        Self { conn }
    }

    /// Enable every node in `nodes`, returning their post-change status.
    pub async fn enable(
        &mut self,
        nodes: &[String],
        partition: Option<&str>,
    ) -> Result<Vec<NodeStatusRecord>, CoreError> {
        self.transition(nodes, SessionState::Enabled, partition).await
    }

    /// Disable every node in `nodes`, returning their post-change status.
    pub async fn disable(
        &mut self,
        nodes: &[String],
        partition: Option<&str>,
    ) -> Result<Vec<NodeStatusRecord>, CoreError> {
        self.transition(nodes, SessionState::Disabled, partition).await
    }

    /// Report the session state of every node in `nodes`, in input order.
    pub async fn status(
        &mut self,
        nodes: &[String],
        partition: Option<&str>,
    ) -> Result<Vec<NodeStatusRecord>, CoreError> {
        check_nonempty(nodes)?;
        let scope = PartitionScope::enter(self.conn, partition).await?;
        let outcome = status_inner(self.conn, nodes).await;
        scope.finish(self.conn, outcome).await
    }

    async fn transition(
        &mut self,
        nodes: &[String],
        state: SessionState,
        partition: Option<&str>,
    ) -> Result<Vec<NodeStatusRecord>, CoreError> {
        check_nonempty(nodes)?;
        let scope = PartitionScope::enter(self.conn, partition).await?;
        let outcome = transition_inner(self.conn, nodes, state).await;
        scope.finish(self.conn, outcome).await
    }
}

fn check_nonempty(nodes: &[String]) -> Result<(), CoreError> {
    if nodes.is_empty() {
        return Err(CoreError::Validation {
            message: "node list must not be empty".into(),
        });
    }
    Ok(())
}

async fn transition_inner(
    conn: &DeviceConnection,
    nodes: &[String],
    state: SessionState,
) -> Result<Vec<NodeStatusRecord>, CoreError> {
    let addresses = resolve_all(conn, nodes).await?;
    let wire = wire_form(&addresses);

    // The set response carries the resulting states, so the post-change
    // status costs no extra round trip.
    let states = conn.client().set_session_state(&wire, state).await?;
    info!(count = nodes.len(), %state, "node session state updated");
    records(conn, addresses, states).await
}

async fn status_inner(
    conn: &DeviceConnection,
    nodes: &[String],
) -> Result<Vec<NodeStatusRecord>, CoreError> {
    let addresses = resolve_all(conn, nodes).await?;
    let wire = wire_form(&addresses);

    let states = conn.client().session_state(&wire).await?;
    records(conn, addresses, states).await
}

/// Resolve every node up front; any failure aborts the batch before the
/// device sees a single address.
async fn resolve_all(
    conn: &DeviceConnection,
    nodes: &[String],
) -> Result<Vec<NodeAddress>, CoreError> {
    let resolver = conn.resolver();
    let mut addresses = Vec::with_capacity(nodes.len());
    for node in nodes {
        addresses.push(resolver.resolve(node).await?);
    }
    Ok(addresses)
}

fn wire_form(addresses: &[NodeAddress]) -> Vec<String> {
    addresses.iter().map(ToString::to_string).collect()
}

async fn records(
    conn: &DeviceConnection,
    addresses: Vec<NodeAddress>,
    states: Vec<SessionState>,
) -> Result<Vec<NodeStatusRecord>, CoreError> {
    if states.len() != addresses.len() {
        return Err(CoreError::ControlPlane {
            message: format!(
                "device returned {} states for {} addresses",
                states.len(),
                addresses.len()
            ),
            code: None,
            status: None,
        });
    }

    let resolver = conn.resolver();
    let mut out = Vec::with_capacity(addresses.len());
    for (node, status) in addresses.into_iter().zip(states) {
        let fqdn = resolver.reverse(&node).await;
        out.push(NodeStatusRecord { node, fqdn, status });
    }
    Ok(out)
}
