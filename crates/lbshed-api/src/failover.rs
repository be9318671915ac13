// Failover endpoint

use crate::client::DeviceClient;
use crate::error::Error;
use crate::types::FailoverStatus;

impl DeviceClient {
    /// The device's current failover role.
    ///
    /// `GET /mgmt/sys/failover`
    pub async fn failover_status(&self) -> Result<FailoverStatus, Error> {
        let url = self.mgmt_url("mgmt/sys/failover")?;
        self.get(url).await
    }
}
