//! Error types for loadgen-encoding

use thiserror::Error;

use crate::registry::SignalKind;

/// Failure turning a batch into wire bytes
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encoding name not present in a signal's catalog
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized encoding {encoding:?} for {kind}")]
pub struct UnrecognizedEncoding {
    /// Signal whose catalog was searched
    pub kind: SignalKind,
    /// Name that was looked up
    pub encoding: String,
}

/// Failure handing wire messages to a transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport closed")]
    Closed,
}
