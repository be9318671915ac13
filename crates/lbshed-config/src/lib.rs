//! Shared configuration for lbshed tools.
//!
//! TOML environment profiles, credential resolution (keyring + env +
//! plaintext), and translation to `lbshed_core::EnvironmentSettings`.
//! The CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use lbshed_core::{
    Capability, CoreError, CredentialStore, EnvironmentSettings, SuffixPolicy, TlsMode,
    TransportConfig,
};

/// Keyring service name; entries are keyed `{environment}/{username}`.
const KEYRING_SERVICE: &str = "lbshed";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for environment '{environment}'")]
    NoCredentials { environment: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Environment used when `--environment` is not specified.
    pub default_environment: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device-group environments.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_environment: None,
            defaults: Defaults::default(),
            environments: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named environment: the redundant device pair/group one set of
/// credentials manages.
#[derive(Debug, Deserialize, Serialize)]
pub struct EnvironmentProfile {
    /// Candidate device hosts, probed in listed order. Accepts a TOML
    /// list or a single comma-separated string.
    #[serde(deserialize_with = "hosts_list")]
    pub hosts: Vec<String>,

    /// Management username.
    pub username: String,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Routing-domain suffix policy: "auto" (default), "never", or a
    /// fixed numeric domain id.
    pub route_domain_suffix: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Anything else the operator sticks in the section rides along
    /// untouched; unknown keys are not an error.
    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

/// Accept `hosts = ["a", "b"]` as well as `hosts = "a, b"`.
fn hosts_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        CommaSeparated(String),
    }

    let hosts = match Raw::deserialize(deserializer)? {
        Raw::List(hosts) => hosts,
        Raw::CommaSeparated(joined) => joined
            .split(',')
            .map(|host| host.trim().to_owned())
            .filter(|host| !host.is_empty())
            .collect(),
    };
    Ok(hosts)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "lbshed", "lbshed").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lbshed");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LBSHED_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Walk the credential chain: the named env var, then
/// `LBSHED_PASSWORD`, then the system keyring, then plaintext.
fn chain_lookup(
    password_env: Option<&str>,
    plaintext: Option<&str>,
    environment: &str,
    username: &str,
) -> Option<SecretString> {
    if let Some(env_name) = password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("LBSHED_PASSWORD") {
        return Some(SecretString::from(val));
    }

    if let Ok(entry) = keyring_entry(environment, username) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    plaintext.map(SecretString::from)
}

/// Resolve an environment's password from the credential chain.
pub fn resolve_password(
    profile: &EnvironmentProfile,
    environment: &str,
) -> Result<SecretString, ConfigError> {
    chain_lookup(
        profile.password_env.as_deref(),
        profile.password.as_deref(),
        environment,
        &profile.username,
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        environment: environment.into(),
    })
}

fn keyring_entry(environment: &str, username: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{environment}/{username}"))
}

/// Store a password in the system keyring for `{environment}/{username}`.
pub fn store_password(
    environment: &str,
    username: &str,
    password: &str,
) -> Result<(), ConfigError> {
    keyring_entry(environment, username)?.set_password(password)?;
    Ok(())
}

/// `CredentialStore` over the config-file credential chain, handed to
/// `lbshed_core::Environment` so passwords resolve lazily at connect
/// time.
pub struct ChainCredentialStore {
    profile_password: Option<String>,
    password_env: Option<String>,
}

impl ChainCredentialStore {
    pub fn for_profile(profile: &EnvironmentProfile) -> Self {
        Self {
            profile_password: profile.password.clone(),
            password_env: profile.password_env.clone(),
        }
    }

    /// Store with no config-file fallbacks: env vars and keyring only.
    pub fn ad_hoc() -> Self {
        Self {
            profile_password: None,
            password_env: None,
        }
    }
}

impl CredentialStore for ChainCredentialStore {
    fn password(&self, environment: &str, username: &str) -> Result<SecretString, CoreError> {
        chain_lookup(
            self.password_env.as_deref(),
            self.profile_password.as_deref(),
            environment,
            username,
        )
        .ok_or_else(|| CoreError::Credential {
            environment: environment.into(),
            username: username.into(),
            reason: "no entry in env, keyring, or config".into(),
        })
    }
}

// ── Profile -> core settings ─────────────────────────────────────────

/// Parse the `route_domain_suffix` field into a `SuffixPolicy`.
pub fn parse_suffix_policy(raw: Option<&str>) -> Result<SuffixPolicy, ConfigError> {
    match raw {
        None | Some("auto") => Ok(SuffixPolicy::SingleNonzero),
        Some("never") => Ok(SuffixPolicy::Never),
        Some(other) => other.parse().map(SuffixPolicy::Fixed).map_err(|_| {
            ConfigError::Validation {
                field: "route_domain_suffix".into(),
                reason: format!("expected 'auto', 'never', or a domain id, got '{other}'"),
            }
        }),
    }
}

/// Build `EnvironmentSettings` from a profile -- no CLI flag overrides.
pub fn profile_to_settings(
    profile: &EnvironmentProfile,
    name: &str,
    defaults: &Defaults,
) -> Result<EnvironmentSettings, ConfigError> {
    if profile.hosts.is_empty() {
        return Err(ConfigError::Validation {
            field: "hosts".into(),
            reason: format!("environment '{name}' lists no hosts"),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(EnvironmentSettings {
        name: name.into(),
        hosts: profile.hosts.clone(),
        username: profile.username.clone(),
        capabilities: Capability::ALL.to_vec(),
        transport: TransportConfig { tls, timeout },
        suffix_policy: parse_suffix_policy(profile.route_domain_suffix.as_deref())?,
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile_from_toml(raw: &str) -> EnvironmentProfile {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn hosts_comma_separated_string_splits_and_trims() {
        let profile = profile_from_toml(
            r#"
            hosts = "lb1.example.com, lb2.example.com ,lb3.example.com"
            username = "admin"
            "#,
        );
        assert_eq!(
            profile.hosts,
            vec!["lb1.example.com", "lb2.example.com", "lb3.example.com"]
        );
    }

    #[test]
    fn hosts_list_form_parses_identically() {
        let string_form = profile_from_toml(
            r#"
            hosts = "lb1.example.com, lb2.example.com"
            username = "admin"
            "#,
        );
        let list_form = profile_from_toml(
            r#"
            hosts = ["lb1.example.com", "lb2.example.com"]
            username = "admin"
            "#,
        );
        assert_eq!(string_form.hosts, list_form.hosts);
    }

    #[test]
    fn extra_keys_are_preserved() {
        let profile = profile_from_toml(
            r#"
            hosts = "lb1"
            username = "admin"
            datacenter = "ams2"
            tier = 3
            "#,
        );
        assert_eq!(
            profile.extra.get("datacenter").and_then(|v| v.as_str()),
            Some("ams2")
        );
        assert_eq!(profile.extra.get("tier").and_then(toml::Value::as_integer), Some(3));
    }

    #[test]
    fn suffix_policy_parsing() {
        assert_eq!(
            parse_suffix_policy(None).unwrap(),
            SuffixPolicy::SingleNonzero
        );
        assert_eq!(
            parse_suffix_policy(Some("auto")).unwrap(),
            SuffixPolicy::SingleNonzero
        );
        assert_eq!(parse_suffix_policy(Some("never")).unwrap(), SuffixPolicy::Never);
        assert_eq!(
            parse_suffix_policy(Some("2220")).unwrap(),
            SuffixPolicy::Fixed(2220)
        );
        assert!(parse_suffix_policy(Some("sometimes")).is_err());
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = profile_from_toml(
            r#"
            hosts = "lb1"
            username = "admin"
            password = "from-config"
            "#,
        );
        // No env vars or keyring entries exist for this made-up name.
        let secret = resolve_password(&profile, "test-env-lbshed-unit").unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(secret.expose_secret(), "from-config");
    }

    #[test]
    fn missing_credentials_error_names_the_environment() {
        let profile = profile_from_toml(
            r#"
            hosts = "lb1"
            username = "admin"
            "#,
        );
        let err = resolve_password(&profile, "test-env-lbshed-unit").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NoCredentials { environment } if environment == "test-env-lbshed-unit"
        ));
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LBSHED_TEST_PW_VAR", "from-env");

            let profile = profile_from_toml(
                r#"
                hosts = "lb1"
                username = "admin"
                password = "from-config"
                password_env = "LBSHED_TEST_PW_VAR"
                "#,
            );
            let secret = resolve_password(&profile, "test-env-lbshed-unit").unwrap();

            use secrecy::ExposeSecret;
            assert_eq!(secret.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn profile_to_settings_applies_overrides() {
        let profile = profile_from_toml(
            r#"
            hosts = "lb1, lb2"
            username = "admin"
            insecure = true
            timeout = 5
            route_domain_suffix = "never"
            "#,
        );
        let settings = profile_to_settings(&profile, "prod", &Defaults::default()).unwrap();
        assert_eq!(settings.name, "prod");
        assert_eq!(settings.hosts, vec!["lb1", "lb2"]);
        assert_eq!(settings.suffix_policy, SuffixPolicy::Never);
        assert_eq!(settings.transport.timeout, Duration::from_secs(5));
        assert!(matches!(settings.transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn profile_without_hosts_is_rejected() {
        let profile = profile_from_toml(
            r#"
            hosts = ""
            username = "admin"
            "#,
        );
        assert!(profile.hosts.is_empty());
        assert!(profile_to_settings(&profile, "prod", &Defaults::default()).is_err());
    }
}
