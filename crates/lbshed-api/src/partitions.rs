// Partition endpoints
//
// The active partition scopes every other operation on the session, so
// get/set here are the primitives the core's scoped-switch helper is
// built on.

use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::types::{Items, PartitionRef};

impl DeviceClient {
    /// Name of the partition currently active on this session.
    ///
    /// `GET /mgmt/partitions/active`
    pub async fn active_partition(&self) -> Result<String, Error> {
        let url = self.mgmt_url("mgmt/partitions/active")?;
        let partition: PartitionRef = self.get(url).await?;
        Ok(partition.name)
    }

    /// Switch the session's active partition.
    ///
    /// `PUT /mgmt/partitions/active` with `{"name": "..."}`
    pub async fn set_active_partition(&self, name: &str) -> Result<(), Error> {
        let url = self.mgmt_url("mgmt/partitions/active")?;
        debug!(partition = name, "switching active partition");
        let _: PartitionRef = self.put(url, &PartitionRef { name: name.to_owned() }).await?;
        Ok(())
    }

    /// List all partitions visible to this session.
    ///
    /// `GET /mgmt/partitions`
    pub async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        let url = self.mgmt_url("mgmt/partitions")?;
        let items: Items<PartitionRef> = self.get(url).await?;
        Ok(items.items.into_iter().map(|p| p.name).collect())
    }
}
