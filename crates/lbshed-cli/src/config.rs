//! CLI-owned configuration glue: environment selection and translation
//! of profiles + flags into a ready `lbshed_core::Environment`.
//!
//! Core never sees these types -- it receives finished settings plus a
//! credential store.

use std::sync::Arc;
use std::time::Duration;

use lbshed_config::{ChainCredentialStore, Config, profile_to_settings};
use lbshed_core::{
    Capability, Environment, EnvironmentSettings, SuffixPolicy, SystemNameService, TlsMode,
    TransportConfig,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Pick the environment name: `--environment` flag, then the config's
/// `default_environment`, then a lone configured environment.
pub fn active_environment_name(global: &GlobalOpts, cfg: &Config) -> Option<String> {
    if let Some(ref name) = global.environment {
        return Some(name.clone());
    }
    if let Some(ref name) = cfg.default_environment {
        return Some(name.clone());
    }
    if cfg.environments.len() == 1 {
        return cfg.environments.keys().next().cloned();
    }
    None
}

/// Build a ready-to-use `Environment` from the config file, selected
/// profile, and CLI flag overrides.
pub fn build_environment(global: &GlobalOpts) -> Result<Environment, CliError> {
    let cfg = lbshed_config::load_config_or_default();

    // With a configured profile, flags override individual fields.
    if let Some(name) = active_environment_name(global, &cfg) {
        let Some(profile) = cfg.environments.get(&name) else {
            let mut available: Vec<_> = cfg.environments.keys().cloned().collect();
            available.sort();
            return Err(CliError::EnvironmentNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        };

        let mut settings = profile_to_settings(profile, &name, &cfg.defaults)?;
        apply_overrides(&mut settings, global);

        return Ok(Environment::new(
            settings,
            Arc::new(ChainCredentialStore::for_profile(profile)),
            Arc::new(SystemNameService),
        ));
    }

    // No profile -- flags and env vars alone must describe the devices.
    let (Some(hosts), Some(username)) = (global.hosts.as_deref(), global.username.clone()) else {
        return Err(CliError::NoEnvironment);
    };

    let mut settings = EnvironmentSettings {
        name: "ad-hoc".into(),
        hosts: split_hosts(hosts),
        username,
        capabilities: Capability::ALL.to_vec(),
        transport: TransportConfig {
            tls: TlsMode::System,
            timeout: Duration::from_secs(cfg.defaults.timeout),
        },
        suffix_policy: SuffixPolicy::SingleNonzero,
    };
    apply_overrides(&mut settings, global);

    Ok(Environment::new(
        settings,
        // Password must come from LBSHED_PASSWORD or the keyring.
        Arc::new(ChainCredentialStore::ad_hoc()),
        Arc::new(SystemNameService),
    ))
}

fn apply_overrides(settings: &mut EnvironmentSettings, global: &GlobalOpts) {
    if let Some(ref hosts) = global.hosts {
        settings.hosts = split_hosts(hosts);
    }
    if let Some(ref username) = global.username {
        settings.username = username.clone();
    }
    if global.insecure {
        settings.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        settings.transport.timeout = Duration::from_secs(timeout);
    }
}

/// Split a `--hosts` flag value the same way the config file does.
fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|host| host.trim().to_owned())
        .filter(|host| !host.is_empty())
        .collect()
}
