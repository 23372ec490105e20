//! Tests for the Generator module

use super::aggregator::aggregate_worker_stats;
use super::builder::GeneratorBuilder;
use crate::config::GeneratorConfig;
use crate::error::{ExportError, GenErrorKind};
use crate::model::{AttributeMap, LogsData};
use crate::traits::ExportSink;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// ============================================================================
// Mock ExportSink
// ============================================================================

#[derive(Default)]
struct CountingSink {
    exports: AtomicU64,
    fail_at: Option<u64>,
    delay: Option<Duration>,
    last: Mutex<Option<LogsData>>,
}

impl CountingSink {
    fn new() -> Self {
        Self::default()
    }

    fn failing_at(mut self, n: u64) -> Self {
        self.fail_at = Some(n);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn exported(&self) -> u64 {
        self.exports.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExportSink for CountingSink {
    async fn export(&self, batch: LogsData) -> Result<(), ExportError> {
        let n = self.exports.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == Some(n) {
            return Err(ExportError::new("sink unavailable"));
        }
        *self.last.lock().unwrap() = Some(batch);
        Ok(())
    }
}

/// Counts ERROR events seen on the current thread
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_builder_missing_sink() {
    let result = GeneratorBuilder::new().num_logs(10).build();
    let err = result.unwrap_err();
    assert_eq!(err.kind, GenErrorKind::MissingConfig);
    assert!(err.message.contains("sink"));
}

#[test]
fn test_builder_invalid_config() {
    let result = GeneratorBuilder::new()
        .workers(0)
        .num_logs(10)
        .sink(Arc::new(CountingSink::new()))
        .build();
    assert_eq!(result.unwrap_err().kind, GenErrorKind::Config);
}

#[test]
fn test_builder_rejects_unbounded_run() {
    let result = GeneratorBuilder::new()
        .workers(1)
        .sink(Arc::new(CountingSink::new()))
        .build();
    assert_eq!(result.unwrap_err().kind, GenErrorKind::Config);
}

// ============================================================================
// Run Tests
// ============================================================================

#[tokio::test]
async fn test_generator_run_basic() {
    let sink = Arc::new(CountingSink::new());
    let generator = GeneratorBuilder::new()
        .config(
            GeneratorConfig::new(1)
                .with_num_logs(5)
                .with_rate(1000.0)
                .with_telemetry_attribute("run", "basic"),
        )
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");

    let stats = generator.run().await.expect("Run failed");

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].generated, 5);
    assert_eq!(sink.exported(), 5);

    let last = sink.last.lock().unwrap().clone().expect("a batch");
    let record = last.log_records().next().unwrap();
    assert_eq!(record.attributes.get("run"), Some("basic"));
    assert_eq!(
        last.resource_logs[0].resource.as_ref().unwrap().service_name(),
        Some("loadgen")
    );
}

#[tokio::test]
async fn test_generator_fans_out_workers() {
    let sink = Arc::new(CountingSink::new());
    let generator = GeneratorBuilder::new()
        .workers(4)
        .num_logs(25)
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");

    let stats = generator.run().await.expect("Run failed");

    assert_eq!(stats.len(), 4);
    assert!(stats.iter().all(|s| s.generated == 25));
    assert_eq!(aggregate_worker_stats(&stats).total_generated, 100);
    assert_eq!(sink.exported(), 100);
}

#[tokio::test]
async fn test_generator_duration_bounded() {
    let sink = Arc::new(CountingSink::new().with_delay(Duration::from_millis(5)));
    let generator = GeneratorBuilder::new()
        .config(
            GeneratorConfig::new(2)
                .with_num_logs(1_000_000)
                .with_duration(Duration::from_millis(100)),
        )
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");

    let start = Instant::now();
    let stats = generator.run().await.expect("Run failed");
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_secs(5));
    let total = aggregate_worker_stats(&stats).total_generated;
    assert!(total > 0);
    assert!(total < 1_000_000);
    assert_eq!(total, sink.exported());
}

#[tokio::test]
async fn test_generator_external_shutdown() {
    let sink = Arc::new(CountingSink::new().with_delay(Duration::from_millis(5)));
    let generator = GeneratorBuilder::new()
        .config(GeneratorConfig::new(2).with_duration(Duration::from_secs(60)))
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");

    let stop = generator.stop_flag();
    let handle = tokio::spawn(generator.run());

    tokio::time::sleep(Duration::from_millis(50)).await;
    stop.stop();

    let stats = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("generator did not stop")
        .expect("task panicked")
        .expect("Run failed");

    assert_eq!(stats.len(), 2);
    assert!(aggregate_worker_stats(&stats).total_generated >= 2);
}

#[tokio::test]
async fn test_generator_worker_failure_stops_run() {
    let sink = Arc::new(
        CountingSink::new()
            .failing_at(10)
            .with_delay(Duration::from_millis(1)),
    );
    let generator = GeneratorBuilder::new()
        .config(GeneratorConfig::new(3).with_duration(Duration::from_secs(60)))
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");
    let stop = generator.stop_flag();

    let err = tokio::time::timeout(Duration::from_secs(2), generator.run())
        .await
        .expect("run did not stop after a worker failure")
        .expect_err("run should fail");

    assert_eq!(err.kind, GenErrorKind::Worker);
    assert!(err.message.contains("sink unavailable"));
    assert!(stop.is_stopped());
}

#[tokio::test]
async fn test_generator_worker_failure_logged_once() {
    let errors = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let generator = GeneratorBuilder::new()
        .config(GeneratorConfig::new(1).with_num_logs(10))
        .sink(Arc::new(CountingSink::new().failing_at(3)))
        .build()
        .expect("Failed to build generator");

    let err = generator.run().await.expect_err("run should fail");
    assert_eq!(err.kind, GenErrorKind::Worker);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_generator_unlimited_rate_duration_run_current_thread() {
    let sink = Arc::new(CountingSink::new());
    let generator = GeneratorBuilder::new()
        .config(GeneratorConfig::new(1).with_duration(Duration::from_millis(50)))
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");

    let stats = tokio::time::timeout(Duration::from_secs(5), generator.run())
        .await
        .expect("duration timer never fired")
        .expect("Run failed");

    assert!(stats[0].generated > 0);
    assert_eq!(stats[0].generated, sink.exported());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_generator_unlimited_rate_duration_run_saturated_threads() {
    let sink = Arc::new(CountingSink::new());
    let generator = GeneratorBuilder::new()
        .config(GeneratorConfig::new(4).with_duration(Duration::from_millis(100)))
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");

    let stats = tokio::time::timeout(Duration::from_secs(5), generator.run())
        .await
        .expect("duration timer never fired")
        .expect("Run failed");

    assert_eq!(stats.len(), 4);
    assert_eq!(aggregate_worker_stats(&stats).total_generated, sink.exported());
}

#[tokio::test]
async fn test_generator_stop_flag_scoped_to_run() {
    let config = GeneratorConfig::new(1).with_duration(Duration::from_millis(30));
    let sink = Arc::new(CountingSink::new().with_delay(Duration::from_millis(1)));

    let first = GeneratorBuilder::new()
        .config(config.clone())
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");
    let first_stop = first.stop_flag();
    let first_stats = first.run().await.expect("Run failed");
    assert!(first_stop.is_stopped());
    assert!(first_stats[0].generated > 0);

    let second = GeneratorBuilder::new()
        .config(config)
        .sink(sink.clone())
        .build()
        .expect("Failed to build generator");
    assert!(!second.stop_flag().is_stopped());
    let second_stats = second.run().await.expect("Run failed");
    assert!(second_stats[0].generated > 0);
}

#[tokio::test]
async fn test_generator_debug_format() {
    let generator = GeneratorBuilder::new()
        .num_logs(1)
        .sink(Arc::new(CountingSink::new()))
        .build()
        .expect("Failed to build generator");

    let debug = format!("{:?}", generator);
    assert!(debug.contains("Generator"));
    assert!(debug.contains("stopped: false"));
}
