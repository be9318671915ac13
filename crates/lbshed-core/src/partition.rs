// Scoped partition switching.
//
// Operations that take an optional partition run bracketed between
// `enter` and `finish`: enter switches the connection's active
// partition, finish restores it no matter how the inner operation went.
// The restore leg failing is the one fault this crate treats as
// connection-fatal -- the cached partition state can no longer be
// trusted, and every later call on the connection would silently land
// in the wrong partition.

use tracing::debug;

use crate::device::DeviceConnection;
use crate::error::CoreError;

/// Open partition scope. Must be closed with [`PartitionScope::finish`]
/// so the connection's active partition is restored.
#[must_use = "call finish() to restore the active partition"]
pub struct PartitionScope {
    original: Option<String>,
}

impl PartitionScope {
    /// Switch `conn` to `partition`, remembering what to restore.
    ///
    /// `None` opens an empty scope: nothing is switched, nothing will
    /// be restored, the operation runs in whatever partition is active.
    pub async fn enter(
        conn: &mut DeviceConnection,
        partition: Option<&str>,
    ) -> Result<Self, CoreError> {
        let Some(target) = partition else {
            return Ok(Self { original: None });
        };

        let original = conn.active_partition().to_owned();
        debug!(from = %original, to = target, "entering partition scope");
        conn.set_active_partition(target).await?;
        Ok(Self {
            original: Some(original),
        })
    }

    /// Restore the original partition, then merge `outcome` with the
    /// restore result.
    ///
    /// On restore failure the returned error is
    /// [`CoreError::PartitionRestore`], carrying the restore cause and --
    /// when the scoped operation itself also failed -- that error too.
    pub async fn finish<T>(
        self,
        conn: &mut DeviceConnection,
        outcome: Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let Some(original) = self.original else {
            return outcome;
        };

        debug!(to = %original, "restoring active partition");
        match conn.set_active_partition(&original).await {
            Ok(()) => outcome,
            Err(restore) => Err(CoreError::PartitionRestore {
                partition: original,
                source: Box::new(restore),
                operation: outcome.err().map(Box::new),
            }),
        }
    }
}
