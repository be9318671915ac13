// Route-domain endpoints

use crate::client::DeviceClient;
use crate::error::Error;
use crate::types::{Items, RouteDomain};

impl DeviceClient {
    /// List the routing domains configured in the active partition.
    ///
    /// `GET /mgmt/net/route-domains`
    pub async fn route_domains(&self) -> Result<Vec<RouteDomain>, Error> {
        let url = self.mgmt_url("mgmt/net/route-domains")?;
        let items: Items<RouteDomain> = self.get(url).await?;
        Ok(items.items)
    }
}
