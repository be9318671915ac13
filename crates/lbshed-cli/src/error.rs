//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text, and maps each error to a process exit code so scripts can
//! tell "device unreachable" from "no active device" from "bad hostname".

use miette::Diagnostic;
use thiserror::Error;

use lbshed_config::ConfigError;
use lbshed_core::CoreError;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const RESOLUTION: i32 = 4;
    pub const CONNECTION: i32 = 5;
    pub const CONTROL_PLANE: i32 = 6;
    pub const NO_ACTIVE: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Name resolution ──────────────────────────────────────────────

    #[error("Could not resolve node '{host}'")]
    #[diagnostic(
        code(lbshed::resolution_failed),
        help("Check the hostname and your resolver configuration.\nReason: {reason}")
    )]
    ResolutionFailed { host: String, reason: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to device at {host}")]
    #[diagnostic(
        code(lbshed::connection_failed),
        help(
            "Check that the device's management interface is reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { host: String, reason: String },

    #[error("Device request timed out")]
    #[diagnostic(
        code(lbshed::timeout),
        help("Increase --timeout or check device responsiveness.")
    )]
    Timeout,

    // ── Credentials ──────────────────────────────────────────────────

    #[error("No credentials for '{username}' in environment '{environment}'")]
    #[diagnostic(
        code(lbshed::no_credentials),
        help(
            "Store one with: lbshed config set-password -e {environment}\n\
             Or set the LBSHED_PASSWORD environment variable."
        )
    )]
    NoCredentials {
        environment: String,
        username: String,
    },

    // ── Remote operations ────────────────────────────────────────────

    #[error("Device rejected the operation: {message}")]
    #[diagnostic(code(lbshed::control_plane))]
    ControlPlane {
        message: String,
        code: Option<String>,
    },

    #[error("Active partition '{partition}' was NOT restored after a scoped operation")]
    #[diagnostic(
        code(lbshed::partition_not_restored),
        severity(Error),
        help(
            "The connection's partition state is now unreliable.\n\
             Verify the device's active partition before issuing further commands.\n\
             Scoped operation outcome: {operation}"
        )
    )]
    PartitionNotRestored {
        partition: String,
        operation: String,
        #[source]
        source: Box<CoreError>,
    },

    // ── Discovery ────────────────────────────────────────────────────

    #[error("No active device found in environment '{environment}'")]
    #[diagnostic(
        code(lbshed::no_active_device),
        help("Candidates probed:\n{attempts}")
    )]
    NoActiveDevice {
        environment: String,
        attempts: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Environment '{name}' not found in configuration")]
    #[diagnostic(
        code(lbshed::environment_not_found),
        help(
            "Available environments: {available}\n\
             Create one with: lbshed config init"
        )
    )]
    EnvironmentNotFound { name: String, available: String },

    #[error("No environment selected and no default configured")]
    #[diagnostic(
        code(lbshed::no_environment),
        help(
            "Pass --environment (-e), set default_environment in the config,\n\
             or create a config with: lbshed config init"
        )
    )]
    NoEnvironment,

    #[error(transparent)]
    #[diagnostic(code(lbshed::config))]
    Config(#[from] ConfigError),

    // ── Validation / interaction ─────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lbshed::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(lbshed::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ResolutionFailed { .. } => exit_code::RESOLUTION,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ControlPlane { .. } | Self::PartitionNotRestored { .. } => {
                exit_code::CONTROL_PLANE
            }
            Self::NoActiveDevice { .. } => exit_code::NO_ACTIVE,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError -> CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Resolution { host, reason } => CliError::ResolutionFailed { host, reason },

            CoreError::Connection { host, reason } => CliError::ConnectionFailed { host, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Credential {
                environment,
                username,
                reason: _,
            } => CliError::NoCredentials {
                environment,
                username,
            },

            CoreError::ControlPlane { message, code, .. } => {
                CliError::ControlPlane { message, code }
            }

            CoreError::PartitionRestore {
                partition,
                source,
                operation,
            } => CliError::PartitionNotRestored {
                partition,
                operation: operation
                    .map_or_else(|| "succeeded".into(), |e| format!("failed: {e}")),
                source,
            },

            CoreError::NoActiveDevice {
                environment,
                attempts,
            } => CliError::NoActiveDevice {
                environment,
                attempts: attempts.join("\n"),
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
