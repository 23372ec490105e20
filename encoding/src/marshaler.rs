//! Marshaler and encoder capability traits
//!
//! A marshaler turns one in-memory batch plus a topic into wire messages and
//! owns the partitioning policy. An encoder only turns a batch into bytes;
//! marshalers are built on top of one.

use loadgen_core::model::{LogsData, MetricsData, TracesData};

use crate::error::EncodingError;
use crate::message::WireMessage;

// ============================================================================
// Marshalers
// ============================================================================

/// Marshals traces into wire messages
pub trait TracesMarshaler: Send + Sync {
    /// Serialize spans into messages for `topic`
    fn marshal(&self, traces: &TracesData, topic: &str) -> Result<Vec<WireMessage>, EncodingError>;

    /// Encoding name this marshaler was registered under
    fn encoding(&self) -> &str;
}

/// Marshals metrics into wire messages
pub trait MetricsMarshaler: Send + Sync {
    /// Serialize metrics into messages for `topic`
    fn marshal(&self, metrics: &MetricsData, topic: &str)
        -> Result<Vec<WireMessage>, EncodingError>;

    /// Encoding name this marshaler was registered under
    fn encoding(&self) -> &str;
}

/// Marshals logs into wire messages
pub trait LogsMarshaler: Send + Sync {
    /// Serialize log records into messages for `topic`
    fn marshal(&self, logs: &LogsData, topic: &str) -> Result<Vec<WireMessage>, EncodingError>;

    /// Encoding name this marshaler was registered under
    fn encoding(&self) -> &str;
}

// ============================================================================
// Encoders
// ============================================================================

pub trait TracesEncoder: Send + Sync {
    fn encode_traces(&self, traces: &TracesData) -> Result<Vec<u8>, EncodingError>;
}

pub trait MetricsEncoder: Send + Sync {
    fn encode_metrics(&self, metrics: &MetricsData) -> Result<Vec<u8>, EncodingError>;
}

pub trait LogsEncoder: Send + Sync {
    fn encode_logs(&self, logs: &LogsData) -> Result<Vec<u8>, EncodingError>;
}
