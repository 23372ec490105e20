//! Error types for loadgen-core

use thiserror::Error;

/// Category of a [`GenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenErrorKind {
    /// Invalid or inconsistent configuration
    Config,
    /// A required builder field was not provided
    MissingConfig,
    /// A worker stopped on a fatal error
    Worker,
    /// Spawning or joining workers failed
    Orchestration,
}

/// Driver-level error
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct GenError {
    /// Error category
    pub kind: GenErrorKind,
    /// Human readable detail
    pub message: String,
}

impl GenError {
    fn new(kind: GenErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(GenErrorKind::Config, message)
    }

    /// Required field missing from a builder
    pub fn missing_config(field: &str) -> Self {
        Self::new(
            GenErrorKind::MissingConfig,
            format!("missing required field: {field}"),
        )
    }

    /// Worker failed
    pub fn worker(worker_id: usize, source: &WorkerError) -> Self {
        Self::new(GenErrorKind::Worker, format!("worker {worker_id}: {source}"))
    }

    /// Spawning or joining failed
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::new(GenErrorKind::Orchestration, message)
    }
}

/// Result type alias
pub type GenResult<T> = std::result::Result<T, GenError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by an export sink
#[derive(Debug, Error)]
#[error("export failed: {message}")]
pub struct ExportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ExportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying encoder or transport error
    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure while waiting for a rate-limiter permit
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// A single permit is larger than the bucket can ever hold
    #[error("rate limiter cannot grant {requested} permit(s), capacity is {capacity}")]
    InsufficientCapacity {
        /// Permits requested
        requested: u32,
        /// Bucket capacity
        capacity: u32,
    },

    /// The wait was cancelled upstream
    #[error("rate limiter wait cancelled")]
    Cancelled,
}

/// Fatal error that ended a worker loop
///
/// Both variants carry the number of records generated before the failure.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("exporter failed after {generated} logs: {source}")]
    Export {
        generated: u64,
        #[source]
        source: ExportError,
    },

    #[error("limiter wait failed after {generated} logs: {source}")]
    Wait {
        generated: u64,
        #[source]
        source: WaitError,
    },
}

impl WorkerError {
    /// Records generated before the failure
    pub fn generated(&self) -> u64 {
        match self {
            WorkerError::Export { generated, .. } | WorkerError::Wait { generated, .. } => {
                *generated
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message() {
        let err = GenError::missing_config("stop_flag");
        assert_eq!(err.kind, GenErrorKind::MissingConfig);
        assert!(err.message.contains("stop_flag"));
    }

    #[test]
    fn test_export_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broker gone");
        let err = ExportError::from_source(io);
        assert_eq!(err.message(), "broker gone");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_worker_error_generated() {
        let err = WorkerError::Wait {
            generated: 7,
            source: WaitError::Cancelled,
        };
        assert_eq!(err.generated(), 7);
        assert!(err.to_string().contains("after 7 logs"));
    }
}
