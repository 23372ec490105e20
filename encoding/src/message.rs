//! Outbound wire messages

/// One message bound for a broker topic
///
/// The payload is opaque; `key` is set by partitioning encodings so the
/// broker can route every message for the same key to the same partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

impl WireMessage {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key: None,
            payload,
        }
    }

    pub fn with_key(mut self, key: Vec<u8>) -> Self {
        self.key = Some(key);
        self
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}
