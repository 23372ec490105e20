//! Builder pattern for Generator construction

use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::error::{GenError, GenResult};
use crate::traits::ExportSink;

use super::executor::Generator;

/// Builder for creating a Generator with validated configuration
///
/// # Example
///
/// ```ignore
/// let generator = GeneratorBuilder::new()
///     .workers(4)
///     .num_logs(1000)
///     .rate(100.0)
///     .sink(sink)
///     .build()?;
/// ```
pub struct GeneratorBuilder {
    config: GeneratorConfig,
    sink: Option<Arc<dyn ExportSink>>,
}

impl GeneratorBuilder {
    /// Create a new generator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            sink: None,
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn num_logs(mut self, num_logs: u64) -> Self {
        self.config.num_logs = num_logs;
        self
    }

    pub fn duration(mut self, duration: std::time::Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Set the per-worker rate (permits per second)
    pub fn rate(mut self, rate: f64) -> Self {
        self.config.rate = rate;
        self
    }

    /// Set the export sink
    pub fn sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the generator
    ///
    /// # Errors
    ///
    /// Returns an error if no sink is set or the configuration is invalid.
    pub fn build(self) -> GenResult<Generator> {
        let sink = self.sink.ok_or_else(|| GenError::missing_config("sink"))?;

        self.config
            .validate()
            .map_err(|e| GenError::config(e.to_string()))?;

        Ok(Generator::new(self.config, sink))
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
