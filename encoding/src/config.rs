//! Exporter configuration and marshaler resolution

use serde::{Deserialize, Serialize};

use crate::error::UnrecognizedEncoding;
use crate::marshaler::{LogsMarshaler, MetricsMarshaler, TracesMarshaler};
use crate::registry::{logs_registry, metrics_registry, traces_registry, OTLP_PROTO};

/// Default destination topic
pub const DEFAULT_TOPIC: &str = "otlp_logs";

/// Which encoding to use and where its messages go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Encoding name, looked up in the signal's registry
    pub encoding: String,

    /// Destination topic for every message
    pub topic: String,

    /// Split trace batches by trace id
    pub partition_traces_by_id: bool,

    /// Split metric batches by resource attributes
    pub partition_metrics_by_resource_attributes: bool,

    /// Split log batches by resource attributes
    pub partition_logs_by_resource_attributes: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            encoding: OTLP_PROTO.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            partition_traces_by_id: false,
            partition_metrics_by_resource_attributes: false,
            partition_logs_by_resource_attributes: false,
        }
    }
}

impl ExporterConfig {
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            ..Default::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_partition_traces_by_id(mut self, enabled: bool) -> Self {
        self.partition_traces_by_id = enabled;
        self
    }

    pub fn with_partition_metrics_by_resource_attributes(mut self, enabled: bool) -> Self {
        self.partition_metrics_by_resource_attributes = enabled;
        self
    }

    pub fn with_partition_logs_by_resource_attributes(mut self, enabled: bool) -> Self {
        self.partition_logs_by_resource_attributes = enabled;
        self
    }
}

/// Resolve the traces marshaler named by `config.encoding`
///
/// # Errors
/// Returns [`UnrecognizedEncoding`] if the traces catalog has no such name.
pub fn create_traces_marshaler(
    config: &ExporterConfig,
) -> Result<Box<dyn TracesMarshaler>, UnrecognizedEncoding> {
    traces_registry().resolve(&config.encoding, config.partition_traces_by_id)
}

/// Resolve the metrics marshaler named by `config.encoding`
///
/// # Errors
/// Returns [`UnrecognizedEncoding`] if the metrics catalog has no such name.
pub fn create_metrics_marshaler(
    config: &ExporterConfig,
) -> Result<Box<dyn MetricsMarshaler>, UnrecognizedEncoding> {
    metrics_registry().resolve(
        &config.encoding,
        config.partition_metrics_by_resource_attributes,
    )
}

/// Resolve the logs marshaler named by `config.encoding`
///
/// # Errors
/// Returns [`UnrecognizedEncoding`] if the logs catalog has no such name.
pub fn create_logs_marshaler(
    config: &ExporterConfig,
) -> Result<Box<dyn LogsMarshaler>, UnrecognizedEncoding> {
    logs_registry().resolve(&config.encoding, config.partition_logs_by_resource_attributes)
}
