//! OTLP-shaped telemetry messages
//!
//! Every message derives both `prost::Message` and serde, so the same value
//! can be written as protobuf or as JSON. The shapes follow the OpenTelemetry
//! protocol closely enough for the marshalers, without carrying every field
//! of the upstream definitions.

mod common;
mod logs;
mod metrics;
mod traces;

pub use common::{hex_id, AttributeMap, InstrumentationScope, KeyValue, Resource};
pub use logs::{LogRecord, LogsData, ResourceLogs, ScopeLogs, SeverityNumber};
pub use metrics::{Metric, MetricsData, NumberDataPoint, ResourceMetrics, ScopeMetrics};
pub use traces::{ResourceSpans, ScopeSpans, Span, SpanKind, TracesData};
