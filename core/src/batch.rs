//! One-record log batches
//!
//! Every emission tick produces a fresh [`LogsData`] holding exactly one
//! resource, one scope and one record. Batches are handed to the sink and
//! never touched again.

use chrono::Utc;

use crate::model::{
    AttributeMap, InstrumentationScope, KeyValue, LogRecord, LogsData, Resource, ResourceLogs,
    ScopeLogs, SeverityNumber,
};

/// Marker attribute stamped on every generated record
pub const MARKER_ATTRIBUTE: (&str, &str) = ("app", "server");

/// Static placeholder, not a computed drop count
pub const DROPPED_ATTRIBUTES_COUNT: u32 = 1;

const SCOPE_NAME: &str = "loadgen";

/// Build a one-record batch stamped with `time_unix_nano`
///
/// Record attributes are merged in order: resource attributes, the
/// [`MARKER_ATTRIBUTE`], then `extra_attributes`; later writes win.
/// The resource attributes are also copied onto the batch resource.
pub fn build_logs(
    resource: &Resource,
    body: &str,
    severity_number: SeverityNumber,
    severity_text: &str,
    extra_attributes: &[KeyValue],
    time_unix_nano: u64,
) -> LogsData {
    let mut batch_resource = Resource::default();
    batch_resource.attributes.put_all(&resource.attributes);

    let mut attributes = Vec::with_capacity(resource.attributes.len() + extra_attributes.len() + 1);
    attributes.put_all(&resource.attributes);
    attributes.put_str(MARKER_ATTRIBUTE.0, MARKER_ATTRIBUTE.1);
    attributes.put_all(extra_attributes);

    let record = LogRecord {
        time_unix_nano,
        severity_number: severity_number.get(),
        severity_text: severity_text.to_string(),
        body: body.to_string(),
        attributes,
        dropped_attributes_count: DROPPED_ATTRIBUTES_COUNT,
    };

    LogsData {
        resource_logs: vec![ResourceLogs {
            resource: Some(batch_resource),
            scope_logs: vec![ScopeLogs {
                scope: Some(InstrumentationScope {
                    name: SCOPE_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }),
                log_records: vec![record],
            }],
        }],
    }
}

/// Per-worker batch factory
///
/// Holds the fixed record fields and keeps timestamps non-decreasing across
/// the batches one worker produces, even if the wall clock steps back.
#[derive(Debug, Clone)]
pub struct LogsBatchBuilder {
    body: String,
    severity_number: SeverityNumber,
    severity_text: String,
    last_timestamp: u64,
}

impl LogsBatchBuilder {
    pub fn new(
        body: impl Into<String>,
        severity_number: SeverityNumber,
        severity_text: impl Into<String>,
    ) -> Self {
        Self {
            body: body.into(),
            severity_number,
            severity_text: severity_text.into(),
            last_timestamp: 0,
        }
    }

    /// Build the next batch stamped with the current time
    pub fn build(&mut self, resource: &Resource, extra_attributes: &[KeyValue]) -> LogsData {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or_default();
        self.last_timestamp = self.last_timestamp.max(now);

        build_logs(
            resource,
            &self.body,
            self.severity_number,
            &self.severity_text,
            extra_attributes,
            self.last_timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(batch: &LogsData) -> &LogRecord {
        batch.log_records().next().expect("one record")
    }

    #[test]
    fn test_build_logs_shape() {
        let resource = Resource::from_attributes([KeyValue::new("service.name", "loadgen")]);
        let batch = build_logs(&resource, "the message", SeverityNumber::INFO, "Info", &[], 42);

        assert_eq!(batch.resource_logs.len(), 1);
        assert_eq!(batch.log_record_count(), 1);
        assert_eq!(
            batch.resource_logs[0].resource.as_ref().unwrap().service_name(),
            Some("loadgen")
        );

        let record = record(&batch);
        assert_eq!(record.body, "the message");
        assert_eq!(record.severity_number, 9);
        assert_eq!(record.severity_text, "Info");
        assert_eq!(record.time_unix_nano, 42);
        assert_eq!(record.dropped_attributes_count, 1);
    }

    #[test]
    fn test_attribute_merge_order() {
        let resource = Resource::from_attributes([KeyValue::new("a", "1")]);
        let extra = [KeyValue::new("a", "2"), KeyValue::new("b", "3")];
        let batch = build_logs(&resource, "", SeverityNumber::INFO, "Info", &extra, 0);

        let attrs = &record(&batch).attributes;
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get("a"), Some("2"));
        assert_eq!(attrs.get("app"), Some("server"));
        assert_eq!(attrs.get("b"), Some("3"));
    }

    #[test]
    fn test_extra_attributes_override_marker() {
        let extra = [KeyValue::new("app", "client")];
        let batch = build_logs(&Resource::default(), "", SeverityNumber::INFO, "Info", &extra, 0);
        assert_eq!(record(&batch).attributes.get("app"), Some("client"));
    }

    #[test]
    fn test_builder_timestamps_non_decreasing() {
        let mut builder = LogsBatchBuilder::new("body", SeverityNumber::WARN, "Warn");
        let resource = Resource::default();

        let mut last = 0;
        for _ in 0..100 {
            let batch = builder.build(&resource, &[]);
            let ts = record(&batch).time_unix_nano;
            assert!(ts >= last);
            assert!(ts > 0);
            last = ts;
        }
    }
}
