//! Marshalers that write a whole batch envelope per message
//!
//! Used by every encoding that keeps the OTLP batch structure (native OTLP
//! and zipkin). Without partitioning, one batch becomes one unkeyed message.
//! With partitioning, the batch is split by key first and each group
//! becomes one message carrying that key.

use loadgen_core::model::{LogsData, MetricsData, TracesData};

use crate::error::EncodingError;
use crate::marshaler::{
    LogsEncoder, LogsMarshaler, MetricsEncoder, MetricsMarshaler, TracesEncoder, TracesMarshaler,
};
use crate::message::WireMessage;
use crate::partition::{group_logs_by_resource, group_metrics_by_resource, split_traces_by_trace_id};

/// Traces marshaler optionally partitioning by trace id
pub struct BatchTracesMarshaler {
    encoder: Box<dyn TracesEncoder>,
    encoding: &'static str,
    partition_by_trace_id: bool,
}

impl BatchTracesMarshaler {
    pub fn new(
        encoder: impl TracesEncoder + 'static,
        encoding: &'static str,
        partition_by_trace_id: bool,
    ) -> Self {
        Self {
            encoder: Box::new(encoder),
            encoding,
            partition_by_trace_id,
        }
    }
}

impl TracesMarshaler for BatchTracesMarshaler {
    fn marshal(&self, traces: &TracesData, topic: &str) -> Result<Vec<WireMessage>, EncodingError> {
        if !self.partition_by_trace_id {
            let payload = self.encoder.encode_traces(traces)?;
            return Ok(vec![WireMessage::new(topic, payload)]);
        }

        split_traces_by_trace_id(traces)
            .into_iter()
            .map(|(trace_id, group)| {
                let payload = self.encoder.encode_traces(&group)?;
                Ok(WireMessage::new(topic, payload).with_key(trace_id))
            })
            .collect()
    }

    fn encoding(&self) -> &str {
        self.encoding
    }
}

/// Metrics marshaler optionally partitioning by resource attributes
pub struct BatchMetricsMarshaler {
    encoder: Box<dyn MetricsEncoder>,
    encoding: &'static str,
    partition_by_resource: bool,
}

impl BatchMetricsMarshaler {
    pub fn new(
        encoder: impl MetricsEncoder + 'static,
        encoding: &'static str,
        partition_by_resource: bool,
    ) -> Self {
        Self {
            encoder: Box::new(encoder),
            encoding,
            partition_by_resource,
        }
    }
}

impl MetricsMarshaler for BatchMetricsMarshaler {
    fn marshal(
        &self,
        metrics: &MetricsData,
        topic: &str,
    ) -> Result<Vec<WireMessage>, EncodingError> {
        if !self.partition_by_resource {
            let payload = self.encoder.encode_metrics(metrics)?;
            return Ok(vec![WireMessage::new(topic, payload)]);
        }

        group_metrics_by_resource(metrics)
            .into_iter()
            .map(|(key, group)| {
                let payload = self.encoder.encode_metrics(&group)?;
                Ok(WireMessage::new(topic, payload).with_key(key))
            })
            .collect()
    }

    fn encoding(&self) -> &str {
        self.encoding
    }
}

/// Logs marshaler optionally partitioning by resource attributes
pub struct BatchLogsMarshaler {
    encoder: Box<dyn LogsEncoder>,
    encoding: &'static str,
    partition_by_resource: bool,
}

impl BatchLogsMarshaler {
    pub fn new(
        encoder: impl LogsEncoder + 'static,
        encoding: &'static str,
        partition_by_resource: bool,
    ) -> Self {
        Self {
            encoder: Box::new(encoder),
            encoding,
            partition_by_resource,
        }
    }
}

impl LogsMarshaler for BatchLogsMarshaler {
    fn marshal(&self, logs: &LogsData, topic: &str) -> Result<Vec<WireMessage>, EncodingError> {
        if !self.partition_by_resource {
            let payload = self.encoder.encode_logs(logs)?;
            return Ok(vec![WireMessage::new(topic, payload)]);
        }

        group_logs_by_resource(logs)
            .into_iter()
            .map(|(key, group)| {
                let payload = self.encoder.encode_logs(&group)?;
                Ok(WireMessage::new(topic, payload).with_key(key))
            })
            .collect()
    }

    fn encoding(&self) -> &str {
        self.encoding
    }
}
