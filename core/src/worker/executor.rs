//! Worker emission loop

use std::sync::Arc;

use crate::batch::LogsBatchBuilder;
use crate::error::WorkerError;
use crate::model::{KeyValue, Resource};
use crate::traits::{ExportSink, RateLimiter};

use super::completion::{CompletionLatch, StopFlag};
use super::stats::WorkerStats;

/// Worker runs one loop: build -> export -> wait -> count -> repeat
///
/// Workers are tokio tasks spawned by the Generator. They share the stop
/// flag, the completion latch and the export sink; everything else is owned.
pub struct Worker {
    /// Worker index, used for diagnostics only
    id: usize,

    /// Shared cooperative stop signal
    stop: StopFlag,

    /// Shared completion latch
    completion: CompletionLatch,

    /// Batches to produce before stopping; 0 means unbounded
    target_count: u64,

    /// Fixed record fields and timestamp clamp
    batch_builder: LogsBatchBuilder,

    /// Permit source (per-worker)
    rate_limiter: Arc<dyn RateLimiter>,
}

impl Worker {
    /// Create a new worker
    ///
    /// Use `WorkerBuilder` for a more ergonomic construction.
    pub fn new(
        id: usize,
        stop: StopFlag,
        completion: CompletionLatch,
        target_count: u64,
        batch_builder: LogsBatchBuilder,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            id,
            stop,
            completion,
            target_count,
            batch_builder,
            rate_limiter,
        }
    }

    /// Run the worker loop
    ///
    /// Returns when the target count is reached, the stop flag is observed,
    /// or the sink or rate limiter fails. In every case the completion latch
    /// is counted down exactly once before the future resolves.
    ///
    /// A target count of 0 with a stop flag that is never set loops forever;
    /// the worker does not validate that combination itself.
    pub async fn run(
        mut self,
        resource: Arc<Resource>,
        sink: Arc<dyn ExportSink>,
        extra_attributes: Arc<[KeyValue]>,
    ) -> Result<WorkerStats, WorkerError> {
        let _done = self.completion.guard();
        let mut stats = WorkerStats::new(self.id);
        stats.start();

        tracing::debug!(
            worker_id = self.id,
            target = self.target_count,
            "Worker started"
        );

        while !self.stop.is_stopped() {
            let batch = self.batch_builder.build(&resource, &extra_attributes);

            if let Err(source) = sink.export(batch).await {
                tracing::error!(
                    worker_id = self.id,
                    logs = stats.generated,
                    error = %source,
                    "exporter failed"
                );
                return Err(WorkerError::Export {
                    generated: stats.generated,
                    source,
                });
            }

            if let Err(source) = self.rate_limiter.wait().await {
                tracing::error!(
                    worker_id = self.id,
                    logs = stats.generated,
                    error = %source,
                    "limiter wait failed"
                );
                return Err(WorkerError::Wait {
                    generated: stats.generated,
                    source,
                });
            }

            stats.record_generated();
            if self.target_count != 0 && stats.generated >= self.target_count {
                break;
            }

            // Sink and limiter may both complete without suspending; the
            // duration timer and Ctrl+C tasks need a turn on the runtime.
            tokio::task::yield_now().await;
        }

        stats.stop();
        tracing::info!(
            worker_id = self.id,
            logs = stats.generated,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            rps = stats.records_per_second(),
            "logs generated"
        );

        Ok(stats)
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn target_count(&self) -> u64 {
        self.target_count
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("target_count", &self.target_count)
            .field("batch_builder", &self.batch_builder)
            .field("stopped", &self.stop.is_stopped())
            .finish()
    }
}
