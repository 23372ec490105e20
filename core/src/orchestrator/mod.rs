//! Generator for run lifecycle management
//!
//! The Generator coordinates one load generation run:
//! - Spawning one worker task per configured worker
//! - Flipping the shared stop flag on duration expiry or Ctrl+C
//! - Waiting on the completion latch and joining worker tasks
//! - Aggregating worker statistics
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::{GeneratorBuilder, GeneratorConfig};
//!
//! let generator = GeneratorBuilder::new()
//!     .config(GeneratorConfig::new(4).with_num_logs(1000))
//!     .sink(sink)
//!     .build()?;
//!
//! let stats = generator.run_with_signal_handling().await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_worker_stats, AggregatedStats};
pub use builder::GeneratorBuilder;
pub use executor::Generator;

#[cfg(test)]
mod tests;
