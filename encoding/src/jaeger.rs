//! Jaeger span marshaler
//!
//! Jaeger messages carry a single span each, so there is nothing to
//! partition: every span becomes its own message keyed by its trace id.

use loadgen_core::model::{hex_id, KeyValue, Resource, Span, TracesData};
use prost::Message;
use serde::Serialize;

use crate::error::EncodingError;
use crate::marshaler::TracesMarshaler;
use crate::message::WireMessage;

const NANOS_PER_MICRO: u64 = 1_000;

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct JaegerTag {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    #[serde(rename = "vStr")]
    pub v_str: String,
}

#[derive(Clone, PartialEq, Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JaegerProcess {
    #[prost(string, tag = "1")]
    pub service_name: String,
    #[prost(message, repeated, tag = "2")]
    pub tags: Vec<JaegerTag>,
}

#[derive(Clone, PartialEq, Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JaegerSpanRef {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "hex_id")]
    pub trace_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "hex_id")]
    pub span_id: Vec<u8>,
}

/// One span with its process, in jaeger's model
#[derive(Clone, PartialEq, Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JaegerSpan {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "hex_id")]
    pub trace_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "hex_id")]
    pub span_id: Vec<u8>,
    #[prost(string, tag = "3")]
    pub operation_name: String,
    #[prost(message, repeated, tag = "4")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<JaegerSpanRef>,
    /// Start time in microseconds
    #[prost(uint64, tag = "6")]
    pub start_time: u64,
    /// Duration in microseconds
    #[prost(uint64, tag = "7")]
    pub duration: u64,
    #[prost(message, repeated, tag = "8")]
    pub tags: Vec<JaegerTag>,
    #[prost(message, optional, tag = "10")]
    pub process: Option<JaegerProcess>,
}

fn tags<'a>(attributes: impl IntoIterator<Item = &'a KeyValue>) -> Vec<JaegerTag> {
    attributes
        .into_iter()
        .map(|kv| JaegerTag {
            key: kv.key.clone(),
            v_str: kv.value.clone(),
        })
        .collect()
}

impl JaegerSpan {
    pub fn from_otlp(resource: Option<&Resource>, span: &Span) -> Self {
        let process = resource.map(|r| JaegerProcess {
            service_name: r.service_name().unwrap_or_default().to_string(),
            tags: tags(r.attributes.iter().filter(|kv| kv.key != "service.name")),
        });

        let references = if span.parent_span_id.is_empty() {
            Vec::new()
        } else {
            vec![JaegerSpanRef {
                trace_id: span.trace_id.clone(),
                span_id: span.parent_span_id.clone(),
            }]
        };

        Self {
            trace_id: span.trace_id.clone(),
            span_id: span.span_id.clone(),
            operation_name: span.name.clone(),
            references,
            start_time: span.start_time_unix_nano / NANOS_PER_MICRO,
            duration: span.duration_nanos() / NANOS_PER_MICRO,
            tags: tags(&span.attributes),
            process,
        }
    }
}

/// Wire format of a single jaeger span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JaegerFormat {
    Proto,
    Json,
}

pub struct JaegerMarshaler {
    format: JaegerFormat,
    encoding: &'static str,
}

impl JaegerMarshaler {
    pub fn new(format: JaegerFormat, encoding: &'static str) -> Self {
        Self { format, encoding }
    }

    fn encode_span(&self, span: &JaegerSpan) -> Result<Vec<u8>, EncodingError> {
        match self.format {
            JaegerFormat::Proto => Ok(span.encode_to_vec()),
            JaegerFormat::Json => Ok(serde_json::to_vec(span)?),
        }
    }
}

impl TracesMarshaler for JaegerMarshaler {
    fn marshal(&self, traces: &TracesData, topic: &str) -> Result<Vec<WireMessage>, EncodingError> {
        traces
            .spans_with_resource()
            .map(|(resource, span)| {
                let payload = self.encode_span(&JaegerSpan::from_otlp(resource, span))?;
                Ok(WireMessage::new(topic, payload).with_key(span.trace_id.clone()))
            })
            .collect()
    }

    fn encoding(&self) -> &str {
        self.encoding
    }
}
