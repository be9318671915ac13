// A named group of redundant devices and the discovery scan that picks
// the one currently holding the active role.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use lbshed_api::{Capability, FailoverState, TransportConfig};

use crate::address::{NameService, SuffixPolicy};
use crate::device::{DeviceConnection, DeviceSettings};
use crate::error::CoreError;

/// Password lookup for an environment's management user.
///
/// Implementations decide where secrets live (keyring, env vars,
/// config files); the core only asks at connect time, so credentials
/// are resolved lazily and never held in environment state.
pub trait CredentialStore: Send + Sync {
    fn password(&self, environment: &str, username: &str) -> Result<SecretString, CoreError>;
}

/// Static configuration of one environment.
#[derive(Clone)]
pub struct EnvironmentSettings {
    pub name: String,
    /// Candidate device hosts, probed in this order.
    pub hosts: Vec<String>,
    pub username: String,
    pub capabilities: Vec<Capability>,
    pub transport: TransportConfig,
    pub suffix_policy: SuffixPolicy,
}

/// Outcome of probing one candidate device's failover state.
pub struct FailoverProbe {
    pub host: String,
    pub outcome: Result<FailoverState, CoreError>,
}

/// A named group of redundant devices sharing credentials.
///
/// Stateless beyond its configuration: discovery re-polls every call
/// and nothing about the last-found active device is remembered.
pub struct Environment {
    settings: EnvironmentSettings,
    credentials: Arc<dyn CredentialStore>,
    names: Arc<dyn NameService>,
}

impl Environment {
    pub fn new(
        settings: EnvironmentSettings,
        credentials: Arc<dyn CredentialStore>,
        names: Arc<dyn NameService>,
    ) -> Self {
        Self {
            settings,
            credentials,
            names,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn hosts(&self) -> &[String] {
        &self.settings.hosts
    }

    pub fn username(&self) -> &str {
        &self.settings.username
    }

    /// Open a session to one specific host in this environment.
    pub async fn connect_to(&self, host: &str) -> Result<DeviceConnection, CoreError> {
        let password = self
            .credentials
            .password(&self.settings.name, &self.settings.username)?;

        DeviceConnection::connect(
            DeviceSettings {
                host: host.to_owned(),
                username: self.settings.username.clone(),
                password,
                capabilities: self.settings.capabilities.clone(),
                transport: self.settings.transport.clone(),
                suffix_policy: self.settings.suffix_policy,
            },
            Arc::clone(&self.names),
        )
        .await
    }

    /// Find the device currently holding the active failover role.
    ///
    /// Linear first-match scan in configured host order. A candidate
    /// that fails to connect or probe is logged and skipped -- an
    /// unreachable standby must not mask a reachable active peer. Each
    /// probe is bounded by the transport timeout. Exhausting the list
    /// yields [`CoreError::NoActiveDevice`] with one outcome line per
    /// candidate.
    pub async fn find_active_device(&self) -> Result<DeviceConnection, CoreError> {
        let mut attempts = Vec::with_capacity(self.settings.hosts.len());

        for host in &self.settings.hosts {
            match self.probe(host).await {
                Ok((conn, state)) if state.is_active() => {
                    info!(host, environment = %self.settings.name, "found active device");
                    return Ok(conn);
                }
                Ok((_, state)) => {
                    attempts.push(format!("{host}: {state}"));
                }
                Err(e) => {
                    warn!(host, error = %e, "device probe failed, trying next candidate");
                    attempts.push(format!("{host}: {e}"));
                }
            }
        }

        Err(CoreError::NoActiveDevice {
            environment: self.settings.name.clone(),
            attempts,
        })
    }

    /// Probe every candidate and report each one's failover state.
    ///
    /// Unlike [`find_active_device`](Self::find_active_device) this
    /// never short-circuits; it exists for operator-facing overviews.
    pub async fn failover_report(&self) -> Vec<FailoverProbe> {
        let mut report = Vec::with_capacity(self.settings.hosts.len());
        for host in &self.settings.hosts {
            let outcome = self.probe(host).await.map(|(_, state)| state);
            report.push(FailoverProbe {
                host: host.clone(),
                outcome,
            });
        }
        report
    }

    async fn probe(&self, host: &str) -> Result<(DeviceConnection, FailoverState), CoreError> {
        let conn = self.connect_to(host).await?;
        let state = conn.failover_state().await?;
        Ok((conn, state))
    }
}
