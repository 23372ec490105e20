//! Export sink that marshals batches and hands them to a transport

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use loadgen_core::model::LogsData;
use loadgen_core::{ExportError, ExportSink};
use tokio::io::AsyncWriteExt;

use crate::error::TransportError;
use crate::marshaler::LogsMarshaler;
use crate::message::WireMessage;

// ============================================================================
// Transports
// ============================================================================

/// Destination for wire messages
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, messages: Vec<WireMessage>) -> Result<(), TransportError>;
}

/// Writes one line per message to stdout
///
/// Payloads are written as UTF-8 when they are valid text and as lowercase
/// hex otherwise. Each `send` writes its lines as one block.
#[derive(Debug)]
pub struct StdoutTransport {
    out: tokio::sync::Mutex<tokio::io::Stdout>,
}

impl StdoutTransport {
    pub fn new() -> Self {
        Self {
            out: tokio::sync::Mutex::new(tokio::io::stdout()),
        }
    }

    fn render(message: &WireMessage) -> String {
        let payload = match std::str::from_utf8(&message.payload) {
            Ok(text) => text.to_string(),
            Err(_) => loadgen_core::model::hex_id::encode(&message.payload),
        };
        match &message.key {
            Some(key) => format!(
                "{} key={} {}",
                message.topic,
                loadgen_core::model::hex_id::encode(key),
                payload
            ),
            None => format!("{} {}", message.topic, payload),
        }
    }

    fn render_block(messages: &[WireMessage]) -> String {
        messages
            .iter()
            .map(|message| Self::render(message) + "\n")
            .collect()
    }
}

impl Default for StdoutTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdoutTransport {
    async fn send(&self, messages: Vec<WireMessage>) -> Result<(), TransportError> {
        let block = Self::render_block(&messages);
        let mut out = self.out.lock().await;
        out.write_all(block.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

/// Drops messages, keeping only counters
#[derive(Debug, Default)]
pub struct DiscardTransport {
    messages: AtomicU64,
    bytes: AtomicU64,
}

impl DiscardTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> u64 {
        self.messages.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for DiscardTransport {
    async fn send(&self, messages: Vec<WireMessage>) -> Result<(), TransportError> {
        let bytes: usize = messages.iter().map(WireMessage::payload_len).sum();
        self.messages
            .fetch_add(messages.len() as u64, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryTransport {
    messages: Mutex<Vec<WireMessage>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poisoned locks are recovered; the list is never left half-written.
    fn stored(&self) -> MutexGuard<'_, Vec<WireMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of everything received so far
    pub fn messages(&self) -> Vec<WireMessage> {
        self.stored().clone()
    }

    pub fn len(&self) -> usize {
        self.stored().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, messages: Vec<WireMessage>) -> Result<(), TransportError> {
        self.stored().extend(messages);
        Ok(())
    }
}

// ============================================================================
// Marshaling sink
// ============================================================================

/// [`ExportSink`] that marshals each batch and sends the messages
pub struct MarshalingSink<T: Transport> {
    marshaler: Box<dyn LogsMarshaler>,
    topic: String,
    transport: T,
}

impl<T: Transport> MarshalingSink<T> {
    pub fn new(marshaler: Box<dyn LogsMarshaler>, topic: impl Into<String>, transport: T) -> Self {
        Self {
            marshaler,
            topic: topic.into(),
            transport,
        }
    }

    pub fn encoding(&self) -> &str {
        self.marshaler.encoding()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> ExportSink for MarshalingSink<T> {
    async fn export(&self, batch: LogsData) -> Result<(), ExportError> {
        let messages = self
            .marshaler
            .marshal(&batch, &self.topic)
            .map_err(ExportError::from_source)?;
        tracing::trace!(
            encoding = self.marshaler.encoding(),
            messages = messages.len(),
            "marshaled batch"
        );
        self.transport
            .send(messages)
            .await
            .map_err(ExportError::from_source)
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for MarshalingSink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarshalingSink")
            .field("encoding", &self.marshaler.encoding())
            .field("topic", &self.topic)
            .field("transport", &self.transport)
            .finish()
    }
}
