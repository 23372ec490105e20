//! Encoding catalogs, one per telemetry signal
//!
//! Each registry maps an encoding name to a factory that builds the
//! marshaler. Registries are assembled once and then only read; resolving an
//! unknown name fails without constructing anything.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::batch::{BatchLogsMarshaler, BatchMetricsMarshaler, BatchTracesMarshaler};
use crate::error::UnrecognizedEncoding;
use crate::jaeger::{JaegerFormat, JaegerMarshaler};
use crate::marshaler::{LogsMarshaler, MetricsMarshaler, TracesMarshaler};
use crate::otlp::{JsonEncoder, ProtoEncoder};
use crate::raw::RawLogsMarshaler;
use crate::zipkin::{ZipkinJsonEncoder, ZipkinProtoEncoder};

pub const OTLP_PROTO: &str = "otlp_proto";
pub const OTLP_JSON: &str = "otlp_json";
pub const ZIPKIN_PROTO: &str = "zipkin_proto";
pub const ZIPKIN_JSON: &str = "zipkin_json";
pub const JAEGER_PROTO: &str = "jaeger_proto";
pub const JAEGER_JSON: &str = "jaeger_json";
pub const RAW: &str = "raw";

/// Telemetry signal a registry serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Traces,
    Metrics,
    Logs,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traces => "traces",
            Self::Metrics => "metrics",
            Self::Logs => "logs",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a marshaler; the flag is the partitioning switch
type Factory<M> = fn(bool) -> Box<M>;

struct Entry<M: ?Sized> {
    name: &'static str,
    partitionable: bool,
    build: Factory<M>,
}

/// Encoding name to marshaler factory, for one signal
pub struct MarshalerRegistry<M: ?Sized> {
    kind: SignalKind,
    entries: Vec<Entry<M>>,
}

impl<M: ?Sized> MarshalerRegistry<M> {
    fn new(kind: SignalKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    fn register(mut self, name: &'static str, partitionable: bool, build: Factory<M>) -> Self {
        self.entries.push(Entry {
            name,
            partitionable,
            build,
        });
        self
    }

    fn entry(&self, encoding: &str) -> Option<&Entry<M>> {
        self.entries.iter().find(|entry| entry.name == encoding)
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Build the marshaler registered under `encoding`
    ///
    /// `partition` is ignored by encodings that have no partitioning option.
    ///
    /// # Errors
    /// Returns [`UnrecognizedEncoding`] when the name is not in the catalog.
    pub fn resolve(&self, encoding: &str, partition: bool) -> Result<Box<M>, UnrecognizedEncoding> {
        let entry = self.entry(encoding).ok_or_else(|| UnrecognizedEncoding {
            kind: self.kind,
            encoding: encoding.to_string(),
        })?;
        tracing::debug!(kind = %self.kind, encoding, partition, "resolved marshaler");
        Ok((entry.build)(partition && entry.partitionable))
    }

    /// Catalog names in registration order
    pub fn encodings(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn contains(&self, encoding: &str) -> bool {
        self.entry(encoding).is_some()
    }

    /// Whether `encoding` accepts a partitioning option
    ///
    /// Unknown names report `false`.
    pub fn supports_partitioning(&self, encoding: &str) -> bool {
        self.entry(encoding).is_some_and(|entry| entry.partitionable)
    }
}

impl<M: ?Sized> fmt::Debug for MarshalerRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshalerRegistry")
            .field("kind", &self.kind)
            .field("encodings", &self.encodings().collect::<Vec<_>>())
            .finish()
    }
}

pub type TracesRegistry = MarshalerRegistry<dyn TracesMarshaler>;
pub type MetricsRegistry = MarshalerRegistry<dyn MetricsMarshaler>;
pub type LogsRegistry = MarshalerRegistry<dyn LogsMarshaler>;

impl TracesRegistry {
    pub fn traces() -> Self {
        Self::new(SignalKind::Traces)
            .register(OTLP_PROTO, true, |partition| {
                Box::new(BatchTracesMarshaler::new(ProtoEncoder, OTLP_PROTO, partition))
            })
            .register(OTLP_JSON, true, |partition| {
                Box::new(BatchTracesMarshaler::new(JsonEncoder, OTLP_JSON, partition))
            })
            .register(ZIPKIN_PROTO, true, |partition| {
                Box::new(BatchTracesMarshaler::new(ZipkinProtoEncoder, ZIPKIN_PROTO, partition))
            })
            .register(ZIPKIN_JSON, true, |partition| {
                Box::new(BatchTracesMarshaler::new(ZipkinJsonEncoder, ZIPKIN_JSON, partition))
            })
            .register(JAEGER_PROTO, false, |_| {
                Box::new(JaegerMarshaler::new(JaegerFormat::Proto, JAEGER_PROTO))
            })
            .register(JAEGER_JSON, false, |_| {
                Box::new(JaegerMarshaler::new(JaegerFormat::Json, JAEGER_JSON))
            })
    }
}

impl MetricsRegistry {
    pub fn metrics() -> Self {
        Self::new(SignalKind::Metrics)
            .register(OTLP_PROTO, true, |partition| {
                Box::new(BatchMetricsMarshaler::new(ProtoEncoder, OTLP_PROTO, partition))
            })
            .register(OTLP_JSON, true, |partition| {
                Box::new(BatchMetricsMarshaler::new(JsonEncoder, OTLP_JSON, partition))
            })
    }
}

impl LogsRegistry {
    pub fn logs() -> Self {
        Self::new(SignalKind::Logs)
            .register(OTLP_PROTO, true, |partition| {
                Box::new(BatchLogsMarshaler::new(ProtoEncoder, OTLP_PROTO, partition))
            })
            .register(OTLP_JSON, true, |partition| {
                Box::new(BatchLogsMarshaler::new(JsonEncoder, OTLP_JSON, partition))
            })
            .register(RAW, false, |_| Box::new(RawLogsMarshaler))
    }
}

pub fn traces_registry() -> &'static TracesRegistry {
    static REGISTRY: OnceLock<TracesRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TracesRegistry::traces)
}

pub fn metrics_registry() -> &'static MetricsRegistry {
    static REGISTRY: OnceLock<MetricsRegistry> = OnceLock::new();
    REGISTRY.get_or_init(MetricsRegistry::metrics)
}

pub fn logs_registry() -> &'static LogsRegistry {
    static REGISTRY: OnceLock<LogsRegistry> = OnceLock::new();
    REGISTRY.get_or_init(LogsRegistry::logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traces_catalog_resolves_by_name() {
        let registry = traces_registry();
        for name in [OTLP_PROTO, OTLP_JSON, ZIPKIN_PROTO, ZIPKIN_JSON, JAEGER_PROTO, JAEGER_JSON] {
            let marshaler = registry.resolve(name, false).unwrap();
            assert_eq!(marshaler.encoding(), name);
            let partitioned = registry.resolve(name, true).unwrap();
            assert_eq!(partitioned.encoding(), name);
        }
        assert_eq!(registry.encodings().count(), 6);
    }

    #[test]
    fn test_metrics_catalog_resolves_by_name() {
        let registry = metrics_registry();
        for name in [OTLP_PROTO, OTLP_JSON] {
            assert_eq!(registry.resolve(name, true).unwrap().encoding(), name);
        }
        assert_eq!(
            registry.encodings().collect::<Vec<_>>(),
            vec![OTLP_PROTO, OTLP_JSON]
        );
    }

    #[test]
    fn test_logs_catalog_resolves_by_name() {
        let registry = logs_registry();
        for name in [OTLP_PROTO, OTLP_JSON, RAW] {
            assert_eq!(registry.resolve(name, false).unwrap().encoding(), name);
        }
    }

    #[test]
    fn test_unknown_encoding_per_kind() {
        let err = traces_registry().resolve("avro", false).err().unwrap();
        assert_eq!(err.kind, SignalKind::Traces);
        assert_eq!(err.encoding, "avro");

        // kind-specific names do not leak into other catalogs
        let err = metrics_registry().resolve(ZIPKIN_JSON, false).err().unwrap();
        assert_eq!(err.kind, SignalKind::Metrics);
        let err = metrics_registry().resolve(RAW, false).err().unwrap();
        assert_eq!(err.to_string(), "unrecognized encoding \"raw\" for metrics");

        let err = logs_registry().resolve(JAEGER_PROTO, false).err().unwrap();
        assert_eq!(err.kind, SignalKind::Logs);
        assert!(!logs_registry().contains(JAEGER_PROTO));
        assert!(logs_registry().resolve("", false).is_err());
    }

    #[test]
    fn test_encoding_names_are_case_sensitive() {
        assert!(traces_registry().resolve("OTLP_PROTO", false).is_err());
    }

    #[test]
    fn test_partitioning_support() {
        let traces = traces_registry();
        assert!(traces.supports_partitioning(OTLP_PROTO));
        assert!(traces.supports_partitioning(ZIPKIN_JSON));
        assert!(!traces.supports_partitioning(JAEGER_PROTO));
        assert!(!traces.supports_partitioning(JAEGER_JSON));

        let logs = logs_registry();
        assert!(logs.supports_partitioning(OTLP_JSON));
        assert!(!logs.supports_partitioning(RAW));
        assert!(!logs.supports_partitioning("nope"));
    }

    #[test]
    fn test_registry_is_shared() {
        assert!(std::ptr::eq(logs_registry(), logs_registry()));
        assert_eq!(traces_registry().kind(), SignalKind::Traces);
    }

    #[test]
    fn test_debug_lists_encodings() {
        let debug = format!("{:?}", logs_registry());
        assert!(debug.contains("Logs"));
        assert!(debug.contains("raw"));
    }
}
