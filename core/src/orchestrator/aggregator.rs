//! Result aggregation from multiple workers

use std::time::Duration;

use crate::worker::WorkerStats;

/// Aggregated statistics from all workers
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Number of workers that completed
    pub total_workers: usize,

    /// Total records generated
    pub total_generated: u64,

    /// Maximum duration across all workers
    pub total_duration: Duration,

    /// Overall records per second
    pub records_per_second: f64,
}

/// Aggregate statistics from multiple workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> AggregatedStats {
    if stats.is_empty() {
        return AggregatedStats::default();
    }

    let total_generated: u64 = stats.iter().map(|s| s.generated).sum();

    // Use the maximum elapsed time across all workers
    let total_duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = total_duration.as_secs_f64();
    let records_per_second = if secs > 0.0 {
        total_generated as f64 / secs
    } else {
        0.0
    };

    AggregatedStats {
        total_workers: stats.len(),
        total_generated,
        total_duration,
        records_per_second,
    }
}
