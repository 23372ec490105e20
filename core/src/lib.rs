//! loadgen-core: worker model and data types for synthetic log load
//!
//! This crate provides the pieces a load generation run is built from:
//!
//! - OTLP-shaped telemetry messages (logs, traces, metrics)
//! - The single-record batch builder
//! - Workers, their rate limiter, stop flag and completion latch
//! - The Generator driver that fans workers out and joins them
//! - Collaborator traits (ExportSink, RateLimiter) and error types

#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod traits;
pub mod worker;

pub use batch::{build_logs, LogsBatchBuilder};
pub use config::{ConfigError, GeneratorConfig};
pub use error::*;
pub use orchestrator::{aggregate_worker_stats, AggregatedStats, Generator, GeneratorBuilder};
pub use traits::*;
pub use worker::{CompletionLatch, PermitLimiter, StopFlag, Worker, WorkerBuilder, WorkerStats};
