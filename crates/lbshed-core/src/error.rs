// ── Core error types ──
//
// User-facing errors from lbshed-core. Each variant identifies which
// stage failed -- resolution, connection, credentials, partition
// restore, remote call, or discovery -- so tooling on top can tell
// "device unreachable" from "no active device" from "bad hostname".
// The `From<lbshed_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Name resolution ──────────────────────────────────────────────
    #[error("Cannot resolve host '{host}': {reason}")]
    Resolution { host: String, reason: String },

    // ── Session establishment ────────────────────────────────────────
    #[error("Cannot connect to device at {host}: {reason}")]
    Connection { host: String, reason: String },

    #[error("Device request timed out")]
    Timeout,

    // ── Credentials ──────────────────────────────────────────────────
    #[error("No usable credentials for '{username}' in environment '{environment}': {reason}")]
    Credential {
        environment: String,
        username: String,
        reason: String,
    },

    // ── Remote calls ─────────────────────────────────────────────────
    #[error("Control-plane call failed: {message}")]
    ControlPlane {
        message: String,
        /// Device fault code (e.g. "mgmt.partition.unknown").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Partition scope ──────────────────────────────────────────────
    /// The restoring leg of a partition-scoped operation failed.
    ///
    /// After this the connection's cached partition state can no longer
    /// be trusted; the connection should be discarded. Carries the
    /// scoped operation's own error too, when there was one -- the
    /// restore failure wins as the outer error but swallows nothing.
    #[error("Failed to restore active partition '{partition}' after a scoped operation")]
    PartitionRestore {
        partition: String,
        #[source]
        source: Box<CoreError>,
        operation: Option<Box<CoreError>>,
    },

    // ── Discovery ────────────────────────────────────────────────────
    #[error(
        "No active device in environment '{environment}' after trying {} candidate(s)",
        attempts.len()
    )]
    NoActiveDevice {
        environment: String,
        /// One "host: outcome" line per candidate probed.
        attempts: Vec<String>,
    },

    // ── Input / configuration ────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lbshed_api::Error> for CoreError {
    fn from(err: lbshed_api::Error) -> Self {
        match err {
            lbshed_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::ControlPlane {
                message,
                code,
                status: Some(status),
            },

            lbshed_api::Error::Deserialization { message, body: _ } => CoreError::ControlPlane {
                message: format!("unexpected response shape: {message}"),
                code: None,
                status: None,
            },

            lbshed_api::Error::Transport(ref e) if e.is_timeout() => CoreError::Timeout,

            // Auth problems mid-session mean the device invalidated the
            // token under us; from the caller's view the remote call failed.
            other => CoreError::ControlPlane {
                message: other.to_string(),
                code: None,
                status: None,
            },
        }
    }
}
