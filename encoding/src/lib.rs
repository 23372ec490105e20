//! Wire-format marshalers for traces, metrics and logs
//!
//! Each telemetry signal has its own catalog of encodings:
//!
//! - traces: `otlp_proto`, `otlp_json`, `zipkin_proto`, `zipkin_json`,
//!   `jaeger_proto`, `jaeger_json`
//! - metrics: `otlp_proto`, `otlp_json`
//! - logs: `otlp_proto`, `otlp_json`, `raw`
//!
//! [`ExporterConfig`] names the encoding; the `create_*_marshaler`
//! functions resolve it against the signal's registry. [`MarshalingSink`]
//! plugs a resolved logs marshaler into the generator as an export sink.

#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod error;
pub mod jaeger;
pub mod marshaler;
pub mod message;
pub mod otlp;
pub mod partition;
pub mod raw;
pub mod registry;
pub mod sink;
pub mod zipkin;

pub use config::{
    create_logs_marshaler, create_metrics_marshaler, create_traces_marshaler, ExporterConfig,
    DEFAULT_TOPIC,
};
pub use error::{EncodingError, TransportError, UnrecognizedEncoding};
pub use marshaler::{LogsMarshaler, MetricsMarshaler, TracesMarshaler};
pub use message::WireMessage;
pub use registry::{
    logs_registry, metrics_registry, traces_registry, LogsRegistry, MarshalerRegistry,
    MetricsRegistry, SignalKind, TracesRegistry,
};
pub use sink::{DiscardTransport, MarshalingSink, MemoryTransport, StdoutTransport, Transport};
