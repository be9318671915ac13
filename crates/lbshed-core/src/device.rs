// One authenticated management session to one device.
//
// `DeviceConnection` owns the api client plus two pieces of cached
// device state: the active partition and the routing-domain list. Both
// are primed at connect time and updated only by `set_active_partition`
// (switching partitions changes which route domains are visible) or an
// explicit `refresh()` -- if the device's configuration changes out of
// band, the caches go stale and that is the caller's problem.

use std::sync::Arc;

use secrecy::SecretString;
use url::Url;

use lbshed_api::{Capability, DeviceClient, FailoverState, RouteDomain, TransportConfig};

use crate::address::{AddressResolver, NameService, SuffixPolicy};
use crate::error::CoreError;
use crate::nodes::NodeAssistant;

/// Everything needed to open a session on one device.
#[derive(Clone)]
pub struct DeviceSettings {
    /// Hostname, `host:port`, or full URL of the device's management
    /// interface. Bare hosts get `https://`.
    pub host: String,
    pub username: String,
    pub password: SecretString,
    /// Capability groups to activate for the session.
    pub capabilities: Vec<Capability>,
    pub transport: TransportConfig,
    pub suffix_policy: SuffixPolicy,
}

fn base_url_for(host: &str) -> Result<Url, CoreError> {
    let raw = if host.contains("://") {
        host.to_owned()
    } else {
        format!("https://{host}/")
    };
    Url::parse(&raw).map_err(|e| CoreError::Config {
        message: format!("invalid device host '{host}': {e}"),
    })
}

/// A live session to a single device, with cached partition and
/// routing-domain state.
///
/// Not shareable across concurrent operations: every state-touching
/// method takes `&mut self`, so unsynchronized sharing does not
/// compile. Create one connection per worker if you need parallelism.
pub struct DeviceConnection {
    host: String,
    client: DeviceClient,
    suffix_policy: SuffixPolicy,
    names: Arc<dyn NameService>,
    active_partition: String,
    route_domains: Vec<RouteDomain>,
}

impl std::fmt::Debug for DeviceConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConnection")
            .field("host", &self.host)
            .field("client", &self.client)
            .field("suffix_policy", &self.suffix_policy)
            .field("names", &"<dyn NameService>")
            .field("active_partition", &self.active_partition)
            .field("route_domains", &self.route_domains)
            .finish()
    }
}

impl DeviceConnection {
    /// Open a session and prime the partition / routing-domain caches.
    ///
    /// Any failure here -- transport, credentials, or the priming reads --
    /// is a connection-establishment failure for this attempt. There is
    /// no retry at this layer.
    pub async fn connect(
        settings: DeviceSettings,
        names: Arc<dyn NameService>,
    ) -> Result<Self, CoreError> {
        let base_url = base_url_for(&settings.host)?;
        let connect_err = |e: lbshed_api::Error| CoreError::Connection {
            host: settings.host.clone(),
            reason: e.to_string(),
        };

        let client = DeviceClient::connect(
            base_url,
            &settings.username,
            &settings.password,
            &settings.capabilities,
            &settings.transport,
        )
        .await
        .map_err(connect_err)?;

        let active_partition = client.active_partition().await.map_err(connect_err)?;
        let route_domains = client.route_domains().await.map_err(connect_err)?;

        Ok(Self {
            host: settings.host,
            client,
            suffix_policy: settings.suffix_policy,
            names,
            active_partition,
            route_domains,
        })
    }

    /// The host this connection was opened against.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The cached active partition.
    pub fn active_partition(&self) -> &str {
        &self.active_partition
    }

    /// The cached routing-domain list, as visible in the active partition.
    pub fn route_domains(&self) -> &[RouteDomain] {
        &self.route_domains
    }

    /// Switch the session's active partition and update both caches --
    /// the visible routing domains follow the partition.
    pub async fn set_active_partition(&mut self, name: &str) -> Result<(), CoreError> {
        self.client.set_active_partition(name).await?;
        self.active_partition = name.to_owned();
        self.route_domains = self.client.route_domains().await?;
        Ok(())
    }

    /// Re-read the active partition and routing-domain list from the
    /// device, replacing both caches.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        self.active_partition = self.client.active_partition().await?;
        self.route_domains = self.client.route_domains().await?;
        Ok(())
    }

    /// Address resolver bound to this connection's cached state.
    pub fn resolver(&self) -> AddressResolver<'_> {
        AddressResolver::new(&self.route_domains, self.suffix_policy, self.names.as_ref())
    }

    /// Node operations on this connection.
    pub fn nodes(&mut self) -> NodeAssistant<'_> {
        NodeAssistant::new(self)
    }

    /// The device's current failover role.
    pub async fn failover_state(&self) -> Result<FailoverState, CoreError> {
        Ok(self.client.failover_status().await?.state)
    }

    /// Partitions visible to this session.
    pub async fn list_partitions(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.client.list_partitions().await?)
    }

    pub(crate) fn client(&self) -> &DeviceClient {
        &self.client
    }
}
