//! Worker module for generating log load
//!
//! A Worker owns one emission loop: **build -> export -> wait -> count ->
//! repeat**. Workers of a run share nothing mutable except a [`StopFlag`] and
//! a [`CompletionLatch`]:
//!
//! 1. Build one single-record batch from the resource and run attributes
//! 2. Export it through the shared sink (any failure ends the loop)
//! 3. Wait for the next rate-limiter permit (any failure ends the loop)
//! 4. Stop once the target count is reached or the stop flag is set
//!
//! Completion is signaled through a latch guard dropped on every exit path.
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::worker::{CompletionLatch, StopFlag, WorkerBuilder};
//!
//! let stop = StopFlag::new();
//! let latch = CompletionLatch::new(1);
//!
//! let worker = WorkerBuilder::new(0)
//!     .stop_flag(stop.clone())
//!     .completion(latch.clone())
//!     .target_count(100)
//!     .rate_limit(Some(50.0))
//!     .build()?;
//!
//! let stats = worker.run(resource, sink, attributes).await?;
//! latch.wait().await;
//! ```

mod builder;
mod completion;
mod executor;
mod rate_limiter;
mod stats;

pub use builder::{WorkerBuilder, DEFAULT_BODY, DEFAULT_SEVERITY_TEXT};
pub use completion::{CompletionGuard, CompletionLatch, StopFlag};
pub use executor::Worker;
pub use rate_limiter::{permit_period, PermitLimiter, MAX_PERMIT_PERIOD};
pub use stats::WorkerStats;
