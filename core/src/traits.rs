//! Collaborator traits used by the worker loop
//!
//! These are defined in core so the encoding crate and the binary can plug
//! their own sinks and limiters into a worker without circular dependencies.

use async_trait::async_trait;

use crate::error::{ExportError, WaitError};
use crate::model::LogsData;

// ============================================================================
// Export Sink
// ============================================================================

/// Accepts completed batches from workers
///
/// Workers call `export` synchronously from their point of view: the next
/// tick does not start until the returned future resolves. Any error is
/// fatal to the calling worker. One sink is shared by all workers of a run,
/// so implementations use interior mutability where they need state.
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Hand one batch to the sink
    async fn export(&self, batch: LogsData) -> Result<(), ExportError>;
}

// ============================================================================
// Rate Limiter
// ============================================================================

/// Blocking permit source
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until the next permit is available
    async fn wait(&self) -> Result<(), WaitError>;
}
