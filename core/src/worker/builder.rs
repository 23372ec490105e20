//! Builder pattern for Worker construction

use std::sync::Arc;

use crate::batch::LogsBatchBuilder;
use crate::error::{GenError, GenResult};
use crate::model::SeverityNumber;
use crate::traits::RateLimiter;

use super::completion::{CompletionLatch, StopFlag};
use super::executor::Worker;
use super::rate_limiter::PermitLimiter;

/// Default record body
pub const DEFAULT_BODY: &str = "the message";

/// Default severity label
pub const DEFAULT_SEVERITY_TEXT: &str = "Info";

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .stop_flag(stop.clone())
///     .completion(latch.clone())
///     .target_count(100)
///     .rate_limit(Some(10.0))
///     .body("hello")
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    stop: Option<StopFlag>,
    completion: Option<CompletionLatch>,
    target_count: u64,
    rate_limit: Option<f64>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    body: String,
    severity_number: SeverityNumber,
    severity_text: String,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            stop: None,
            completion: None,
            target_count: 0,
            rate_limit: None,
            rate_limiter: None,
            body: DEFAULT_BODY.to_string(),
            severity_number: SeverityNumber::INFO,
            severity_text: DEFAULT_SEVERITY_TEXT.to_string(),
        }
    }

    /// Set the shared stop flag
    pub fn stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set the shared completion latch
    pub fn completion(mut self, latch: CompletionLatch) -> Self {
        self.completion = Some(latch);
        self
    }

    /// Set how many batches to produce (0 = until stopped)
    pub fn target_count(mut self, count: u64) -> Self {
        self.target_count = count;
        self
    }

    /// Set the rate limit (permits per second)
    pub fn rate_limit(mut self, rps: Option<f64>) -> Self {
        self.rate_limit = rps;
        self
    }

    /// Use a custom permit source instead of building one from `rate_limit`
    pub fn rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn severity(mut self, number: SeverityNumber, text: impl Into<String>) -> Self {
        self.severity_number = number;
        self.severity_text = text.into();
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if the stop flag or completion latch is missing.
    pub fn build(self) -> GenResult<Worker> {
        let stop = self.stop.ok_or_else(|| GenError::missing_config("stop_flag"))?;
        let completion = self
            .completion
            .ok_or_else(|| GenError::missing_config("completion"))?;

        let rate_limiter: Arc<dyn RateLimiter> = match self.rate_limiter {
            Some(limiter) => limiter,
            None => Arc::new(PermitLimiter::new(self.rate_limit)),
        };

        let batch_builder =
            LogsBatchBuilder::new(self.body, self.severity_number, self.severity_text);

        Ok(Worker::new(
            self.id,
            stop,
            completion,
            self.target_count,
            batch_builder,
            rate_limiter,
        ))
    }
}
