//! Raw log bodies
//!
//! Each record's body is written verbatim as its own message. There is no
//! envelope and no key.

use loadgen_core::model::LogsData;

use crate::error::EncodingError;
use crate::marshaler::LogsMarshaler;
use crate::message::WireMessage;

#[derive(Debug, Clone, Copy, Default)]
pub struct RawLogsMarshaler;

impl LogsMarshaler for RawLogsMarshaler {
    fn marshal(&self, logs: &LogsData, topic: &str) -> Result<Vec<WireMessage>, EncodingError> {
        Ok(logs
            .log_records()
            .map(|record| WireMessage::new(topic, record.body.clone().into_bytes()))
            .collect())
    }

    fn encoding(&self) -> &str {
        crate::registry::RAW
    }
}
