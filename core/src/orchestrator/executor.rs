//! Generator execution logic

use std::sync::Arc;
use std::time::Instant;

use crate::config::GeneratorConfig;
use crate::error::{GenError, GenResult};
use crate::model::KeyValue;
use crate::traits::ExportSink;
use crate::worker::{CompletionLatch, StopFlag, WorkerBuilder, WorkerStats};

use super::aggregator::aggregate_worker_stats;

/// Generator manages the run lifecycle
///
/// Responsible for spawning workers, stopping them when the duration budget
/// runs out, and collecting results. A generator drives exactly one run:
/// `run` consumes it, so the stop flag never outlives its run.
pub struct Generator {
    /// Run configuration
    pub(crate) config: GeneratorConfig,

    /// Export sink (shared across workers)
    pub(crate) sink: Arc<dyn ExportSink>,

    /// Stop flag shared by all workers of the run
    pub(crate) stop: StopFlag,
}

impl Generator {
    /// Create a new generator
    ///
    /// Use `GeneratorBuilder` for validated construction.
    pub fn new(config: GeneratorConfig, sink: Arc<dyn ExportSink>) -> Self {
        Self {
            config,
            sink,
            stop: StopFlag::new(),
        }
    }

    /// Handle to the run's stop flag
    ///
    /// Setting it asks all workers to stop after their current tick.
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Get the run configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the load generation
    ///
    /// Spawns worker tasks, waits for every one of them to signal completion,
    /// and returns their stats. If any worker fails, the stop flag is set so
    /// the others wind down, and the first failure is returned.
    pub async fn run(self) -> GenResult<Vec<WorkerStats>> {
        let start = Instant::now();
        let workers = self.config.workers;
        let resource = Arc::new(self.config.resource());
        let attributes: Arc<[KeyValue]> = Arc::from(self.config.telemetry_attributes.clone());
        let latch = CompletionLatch::new(workers);

        tracing::info!(
            workers,
            num_logs = self.config.effective_num_logs(),
            duration = ?self.config.duration,
            rate = self.config.rate,
            "Starting load generation"
        );

        let built = (0..workers)
            .map(|id| {
                WorkerBuilder::new(id)
                    .stop_flag(self.stop.clone())
                    .completion(latch.clone())
                    .target_count(self.config.effective_num_logs())
                    .rate_limit(self.config.rate_limit())
                    .body(self.config.body.clone())
                    .severity(
                        self.config.severity_number,
                        self.config.severity_text.clone(),
                    )
                    .build()
            })
            .collect::<GenResult<Vec<_>>>()?;

        // Duration-bounded runs end by flipping the shared flag, so all
        // workers stop within one tick of each other
        let timer = (!self.config.duration.is_zero()).then(|| {
            let stop = self.stop.clone();
            let duration = self.config.duration;
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                tracing::info!(?duration, "Duration elapsed, stopping workers");
                stop.stop();
            })
        });

        let mut handles = Vec::with_capacity(workers);
        for worker in built {
            let resource = Arc::clone(&resource);
            let sink = Arc::clone(&self.sink);
            let attributes = Arc::clone(&attributes);
            let stop = self.stop.clone();
            handles.push(tokio::spawn(async move {
                let result = worker.run(resource, sink, attributes).await;
                if result.is_err() {
                    stop.stop();
                }
                result
            }));
        }

        latch.wait().await;
        if let Some(timer) = timer {
            timer.abort();
        }

        let mut results = Vec::with_capacity(handles.len());
        let mut first_failure = None;
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(stats)) => results.push(stats),
                Ok(Err(e)) => {
                    tracing::debug!(worker_id = idx, "Worker failed");
                    first_failure.get_or_insert_with(|| GenError::worker(idx, &e));
                }
                Err(e) => {
                    tracing::error!(worker_id = idx, error = %e, "Worker task panicked");
                    first_failure.get_or_insert_with(|| {
                        GenError::orchestration(format!("worker {idx} panicked: {e}"))
                    });
                }
            }
        }

        if let Some(err) = first_failure {
            return Err(err);
        }

        let aggregated = aggregate_worker_stats(&results);
        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            total_generated = aggregated.total_generated,
            rps = aggregated.records_per_second,
            "Load generation completed"
        );

        Ok(results)
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C sets the stop flag; workers finish their current tick and exit.
    pub async fn run_with_signal_handling(self) -> GenResult<Vec<WorkerStats>> {
        let stop = self.stop.clone();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, stopping workers...");
                    stop.stop();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;

        signal_handle.abort();

        result
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("stopped", &self.stop.is_stopped())
            .finish()
    }
}
