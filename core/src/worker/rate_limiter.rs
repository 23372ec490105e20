//! Rate limiting for log emission

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};

use crate::error::WaitError;
use crate::traits;

/// Longest permit interval the limiter can represent
pub const MAX_PERMIT_PERIOD: Duration = Duration::from_nanos(u64::MAX);

/// Interval between permits at `rps` permits per second
///
/// `None` for zero, negative or non-finite rates and for rates so small
/// that the interval exceeds [`MAX_PERMIT_PERIOD`].
pub fn permit_period(rps: f64) -> Option<Duration> {
    if !rps.is_finite() || rps <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rps)
        .ok()
        .filter(|period| *period <= MAX_PERMIT_PERIOD)
}

/// Token bucket with a burst of one permit, via the governor crate
///
/// Each worker builds its own instance, so the configured rate applies per
/// worker.
pub struct PermitLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rate_limit: Option<f64>,
}

impl PermitLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `rate_limit` - Optional permits per second. `None`, zero, negative or
    ///   non-finite values disable limiting, as do rates with no
    ///   [`permit_period`] (`GeneratorConfig::validate` rejects those).
    ///   Fractional rates are honored (0.5 means one permit every two seconds).
    ///
    /// # Examples
    /// ```
    /// use loadgen_core::worker::PermitLimiter;
    ///
    /// let limiter = PermitLimiter::new(Some(100.0));
    /// assert!(limiter.is_enabled());
    ///
    /// let unlimited = PermitLimiter::new(None);
    /// assert!(!unlimited.is_enabled());
    /// ```
    pub fn new(rate_limit: Option<f64>) -> Self {
        let limiter = rate_limit.and_then(|rps| {
            let quota = Quota::with_period(permit_period(rps)?)?.allow_burst(NonZeroU32::MIN);
            Some(RateLimiter::direct(quota))
        });

        Self {
            limiter,
            rate_limit,
        }
    }

    /// Create an unlimited rate limiter (no rate limiting)
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Take a permit without waiting
    ///
    /// Always returns `true` if no rate limit is configured.
    pub fn try_acquire(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Get the configured rate limit (permits per second)
    pub fn rate_limit(&self) -> Option<f64> {
        self.rate_limit
    }
}

#[async_trait]
impl traits::RateLimiter for PermitLimiter {
    async fn wait(&self) -> Result<(), WaitError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter
            .until_n_ready(NonZeroU32::MIN)
            .await
            .map_err(|e| WaitError::InsufficientCapacity {
                requested: 1,
                capacity: e.0,
            })
    }
}

impl Default for PermitLimiter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for PermitLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermitLimiter")
            .field("rate_limit", &self.rate_limit)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
