//! Zipkin v2 span encoders
//!
//! OTLP spans are flattened into zipkin's model: one span list per batch,
//! timestamps in microseconds, the resource's `service.name` as the local
//! endpoint and span attributes as tags.

use std::collections::BTreeMap;

use loadgen_core::model::{hex_id, Resource, Span, SpanKind, TracesData};
use prost::Message;
use serde::Serialize;

use crate::error::EncodingError;
use crate::marshaler::TracesEncoder;

const NANOS_PER_MICRO: u64 = 1_000;

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct ZipkinEndpoint {
    #[prost(string, tag = "1")]
    #[serde(rename = "serviceName", skip_serializing_if = "String::is_empty")]
    pub service_name: String,
}

/// Span in zipkin's v2 shape
#[derive(Clone, PartialEq, Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipkinSpan {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "hex_id")]
    pub trace_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "hex_id", skip_serializing_if = "Vec::is_empty")]
    pub parent_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(with = "hex_id")]
    pub id: Vec<u8>,
    #[prost(enumeration = "ZipkinKind", tag = "4")]
    #[serde(serialize_with = "kind_name", skip_serializing_if = "is_unspecified")]
    pub kind: i32,
    #[prost(string, tag = "5")]
    pub name: String,
    #[prost(fixed64, tag = "6")]
    pub timestamp: u64,
    #[prost(uint64, tag = "7")]
    pub duration: u64,
    #[prost(message, optional, tag = "8")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_endpoint: Option<ZipkinEndpoint>,
    #[prost(btree_map = "string, string", tag = "11")]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ListOfSpans {
    #[prost(message, repeated, tag = "1")]
    pub spans: Vec<ZipkinSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum ZipkinKind {
    Unspecified = 0,
    Client = 1,
    Server = 2,
    Producer = 3,
    Consumer = 4,
}

impl ZipkinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Client => "CLIENT",
            Self::Server => "SERVER",
            Self::Producer => "PRODUCER",
            Self::Consumer => "CONSUMER",
        }
    }
}

impl From<SpanKind> for ZipkinKind {
    fn from(kind: SpanKind) -> Self {
        match kind {
            SpanKind::Client => Self::Client,
            SpanKind::Server => Self::Server,
            SpanKind::Producer => Self::Producer,
            SpanKind::Consumer => Self::Consumer,
            SpanKind::Unspecified | SpanKind::Internal => Self::Unspecified,
        }
    }
}

fn kind_name<S: serde::Serializer>(kind: &i32, serializer: S) -> Result<S::Ok, S::Error> {
    let kind = ZipkinKind::try_from(*kind).unwrap_or(ZipkinKind::Unspecified);
    serializer.serialize_str(kind.as_str())
}

fn is_unspecified(kind: &i32) -> bool {
    *kind == ZipkinKind::Unspecified as i32
}

impl ZipkinSpan {
    pub fn from_otlp(resource: Option<&Resource>, span: &Span) -> Self {
        let service_name = resource
            .and_then(Resource::service_name)
            .unwrap_or_default()
            .to_string();

        Self {
            trace_id: span.trace_id.clone(),
            parent_id: span.parent_span_id.clone(),
            id: span.span_id.clone(),
            kind: ZipkinKind::from(span.span_kind()) as i32,
            name: span.name.clone(),
            timestamp: span.start_time_unix_nano / NANOS_PER_MICRO,
            duration: span.duration_nanos() / NANOS_PER_MICRO,
            local_endpoint: Some(ZipkinEndpoint { service_name }),
            tags: span
                .attributes
                .iter()
                .map(|kv| (kv.key.clone(), kv.value.clone()))
                .collect(),
        }
    }
}

/// Every span of a batch, converted in order
pub fn to_zipkin_spans(traces: &TracesData) -> Vec<ZipkinSpan> {
    traces
        .spans_with_resource()
        .map(|(resource, span)| ZipkinSpan::from_otlp(resource, span))
        .collect()
}

/// Zipkin protobuf (`ListOfSpans`)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipkinProtoEncoder;

/// Zipkin v2 JSON (array of spans)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipkinJsonEncoder;

impl TracesEncoder for ZipkinProtoEncoder {
    fn encode_traces(&self, traces: &TracesData) -> Result<Vec<u8>, EncodingError> {
        let list = ListOfSpans {
            spans: to_zipkin_spans(traces),
        };
        Ok(list.encode_to_vec())
    }
}

impl TracesEncoder for ZipkinJsonEncoder {
    fn encode_traces(&self, traces: &TracesData) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(&to_zipkin_spans(traces))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgen_core::model::{KeyValue, ResourceSpans, ScopeSpans};
    use serde_json::Value;

    fn traces() -> TracesData {
        TracesData {
            resource_spans: vec![ResourceSpans {
                resource: Some(Resource::from_attributes([KeyValue::new(
                    "service.name",
                    "checkout",
                )])),
                scope_spans: vec![ScopeSpans {
                    scope: None,
                    spans: vec![Span {
                        trace_id: vec![0xab; 16],
                        span_id: vec![0x01; 8],
                        name: "GET /cart".into(),
                        kind: SpanKind::Server as i32,
                        start_time_unix_nano: 5_000_000,
                        end_time_unix_nano: 7_500_000,
                        attributes: vec![KeyValue::new("http.status_code", "200")],
                        ..Default::default()
                    }],
                }],
            }],
        }
    }

    #[test]
    fn test_json_shape() {
        let bytes = ZipkinJsonEncoder.encode_traces(&traces()).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let span = &json[0];

        assert_eq!(span["traceId"], "ab".repeat(16));
        assert_eq!(span["id"], "0101010101010101");
        assert_eq!(span["kind"], "SERVER");
        assert_eq!(span["timestamp"], 5_000);
        assert_eq!(span["duration"], 2_500);
        assert_eq!(span["localEndpoint"]["serviceName"], "checkout");
        assert_eq!(span["tags"]["http.status_code"], "200");
        assert!(span.get("parentId").is_none());
    }

    #[test]
    fn test_internal_kind_omitted() {
        let mut data = traces();
        data.resource_spans[0].scope_spans[0].spans[0].kind = SpanKind::Internal as i32;
        let bytes = ZipkinJsonEncoder.encode_traces(&data).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json[0].get("kind").is_none());
    }

    #[test]
    fn test_proto_decodes() {
        let bytes = ZipkinProtoEncoder.encode_traces(&traces()).unwrap();
        let list = ListOfSpans::decode(bytes.as_slice()).unwrap();

        assert_eq!(list.spans.len(), 1);
        assert_eq!(list.spans[0].kind, ZipkinKind::Server as i32);
        assert_eq!(list.spans[0].name, "GET /cart");
        assert_eq!(list.spans[0].tags.get("http.status_code").map(String::as_str), Some("200"));
    }
}
