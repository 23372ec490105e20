//! Native OTLP encoders: protobuf and JSON

use loadgen_core::model::{LogsData, MetricsData, TracesData};
use prost::Message;

use crate::error::EncodingError;
use crate::marshaler::{LogsEncoder, MetricsEncoder, TracesEncoder};

/// Binary OTLP (protobuf)
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoEncoder;

/// OTLP JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl TracesEncoder for ProtoEncoder {
    fn encode_traces(&self, traces: &TracesData) -> Result<Vec<u8>, EncodingError> {
        Ok(traces.encode_to_vec())
    }
}

impl MetricsEncoder for ProtoEncoder {
    fn encode_metrics(&self, metrics: &MetricsData) -> Result<Vec<u8>, EncodingError> {
        Ok(metrics.encode_to_vec())
    }
}

impl LogsEncoder for ProtoEncoder {
    fn encode_logs(&self, logs: &LogsData) -> Result<Vec<u8>, EncodingError> {
        Ok(logs.encode_to_vec())
    }
}

impl TracesEncoder for JsonEncoder {
    fn encode_traces(&self, traces: &TracesData) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(traces)?)
    }
}

impl MetricsEncoder for JsonEncoder {
    fn encode_metrics(&self, metrics: &MetricsData) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(metrics)?)
    }
}

impl LogsEncoder for JsonEncoder {
    fn encode_logs(&self, logs: &LogsData) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(logs)?)
    }
}
