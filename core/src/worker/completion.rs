//! Run-scoped coordination primitives: stop flag and completion latch

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cooperative stop signal shared by every worker of a run
///
/// Single writer (the driver, a timer or a signal handler), many readers.
/// Workers poll it once per loop iteration.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that all workers stop after their current tick
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct LatchState {
    remaining: AtomicUsize,
    notify: Notify,
}

/// Counting latch the driver waits on until every worker has finished
///
/// Sized to the worker count. Each worker holds one [`CompletionGuard`];
/// dropping the guard counts the latch down, so completion is signaled once
/// per worker whether the loop ended normally, on error, or by panic.
#[derive(Debug, Clone)]
pub struct CompletionLatch {
    state: Arc<LatchState>,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            state: Arc::new(LatchState {
                remaining: AtomicUsize::new(count),
                notify: Notify::new(),
            }),
        }
    }

    /// Number of workers that have not signaled yet
    pub fn remaining(&self) -> usize {
        self.state.remaining.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }

    /// Guard that counts the latch down once when dropped
    pub fn guard(&self) -> CompletionGuard {
        CompletionGuard {
            latch: self.clone(),
        }
    }

    /// Decrement the count; saturates at zero
    fn count_down(&self) {
        let previous = self.state.remaining.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |remaining| remaining.checked_sub(1),
        );
        if previous == Ok(1) {
            self.state.notify.notify_waiters();
        }
    }

    /// Wait until every guard has been dropped
    pub async fn wait(&self) {
        loop {
            // Register before checking so a release in between is not missed
            let notified = self.state.notify.notified();
            if self.is_released() {
                return;
            }
            notified.await;
        }
    }
}

/// Completion signal for one worker
#[derive(Debug)]
#[must_use = "dropping the guard signals completion immediately"]
pub struct CompletionGuard {
    latch: CompletionLatch,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}
