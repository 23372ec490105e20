//! Generator configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{KeyValue, Resource, SeverityNumber};
use crate::worker::{permit_period, DEFAULT_BODY, DEFAULT_SEVERITY_TEXT, MAX_PERMIT_PERIOD};

/// Default `service.name` resource attribute
pub const DEFAULT_SERVICE_NAME: &str = "loadgen";

/// Load generation run configuration
///
/// Defines how many workers run, how long or how many records each one
/// produces, how fast, and what the generated records look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of concurrent workers
    pub workers: usize,

    /// Records per worker; ignored when `duration` is non-zero
    pub num_logs: u64,

    /// Total run time; zero means governed by `num_logs`
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    /// Permits per second per worker; zero means unlimited
    pub rate: f64,

    /// Record body
    pub body: String,

    /// Severity label
    pub severity_text: String,

    /// Severity ordinal
    pub severity_number: SeverityNumber,

    /// Value of the `service.name` resource attribute
    pub service_name: String,

    /// Additional resource attributes
    pub resource_attributes: Vec<KeyValue>,

    /// Attributes stamped on every generated record
    pub telemetry_attributes: Vec<KeyValue>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            num_logs: 0,
            duration: Duration::ZERO,
            rate: 0.0,
            body: DEFAULT_BODY.to_string(),
            severity_text: DEFAULT_SEVERITY_TEXT.to_string(),
            severity_number: SeverityNumber::INFO,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            resource_attributes: Vec::new(),
            telemetry_attributes: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with the given worker count
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    pub fn with_num_logs(mut self, num_logs: u64) -> Self {
        self.num_logs = num_logs;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_severity(mut self, number: SeverityNumber, text: impl Into<String>) -> Self {
        self.severity_number = number;
        self.severity_text = text.into();
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_resource_attribute(mut self, key: &str, value: &str) -> Self {
        self.resource_attributes.push(KeyValue::new(key, value));
        self
    }

    pub fn with_telemetry_attribute(mut self, key: &str, value: &str) -> Self {
        self.telemetry_attributes.push(KeyValue::new(key, value));
        self
    }

    /// Per-worker target count: a duration-bounded run ignores `num_logs`
    pub fn effective_num_logs(&self) -> u64 {
        if self.duration.is_zero() {
            self.num_logs
        } else {
            0
        }
    }

    /// Rate handed to each worker's limiter, `None` when unlimited
    pub fn rate_limit(&self) -> Option<f64> {
        (self.rate > 0.0).then_some(self.rate)
    }

    /// Resource shared by every worker: `service.name` plus the extra
    /// resource attributes (which may override it)
    pub fn resource(&self) -> Resource {
        Resource::from_attributes(
            std::iter::once(KeyValue::new("service.name", self.service_name.as_str()))
                .chain(self.resource_attributes.iter().cloned()),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers(
                "workers must be at least 1".into(),
            ));
        }

        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(ConfigError::InvalidRate(format!(
                "rate must be a non-negative number, got {}",
                self.rate
            )));
        }

        if self.rate > 0.0 && permit_period(self.rate).is_none() {
            return Err(ConfigError::InvalidRate(format!(
                "rate {} is too small, permits would be more than {:?} apart",
                self.rate, MAX_PERMIT_PERIOD
            )));
        }

        if self.num_logs == 0 && self.duration.is_zero() {
            return Err(ConfigError::Unbounded(
                "either num_logs or duration must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid workers: {0}")]
    InvalidWorkers(String),

    /// Invalid rate
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Neither a count nor a duration bounds the run
    #[error("Unbounded run: {0}")]
    Unbounded(String),
}
