// Node session-state endpoints
//
// Both calls are bulk by design: one request covers the whole address
// list, and the returned `states` array is order-aligned with it.

use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::types::{SessionState, SessionStateQuery, SessionStateSet, SessionStates};

impl DeviceClient {
    /// Set the session-enabled state for every address in `addresses`.
    ///
    /// `POST /mgmt/ltm/nodes/session-state`
    pub async fn set_session_state(
        &self,
        addresses: &[String],
        state: SessionState,
    ) -> Result<Vec<SessionState>, Error> {
        let url = self.mgmt_url("mgmt/ltm/nodes/session-state")?;
        debug!(count = addresses.len(), %state, "setting node session state");
        let resp: SessionStates = self.post(url, &SessionStateSet { addresses, state }).await?;
        Ok(resp.states)
    }

    /// Query the session-enabled state for every address in `addresses`.
    ///
    /// `POST /mgmt/ltm/nodes/session-state/query`
    pub async fn session_state(&self, addresses: &[String]) -> Result<Vec<SessionState>, Error> {
        let url = self.mgmt_url("mgmt/ltm/nodes/session-state/query")?;
        debug!(count = addresses.len(), "querying node session state");
        let resp: SessionStates = self.post(url, &SessionStateQuery { addresses }).await?;
        Ok(resp.states)
    }
}
