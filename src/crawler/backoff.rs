//! Politeness and retry delay computation
//!
//! Two waits surround every request:
//! - a politeness delay before each attempt: `base * uniform(1 - jitter, 1 + jitter)`
//! - a backoff wait between attempts: `uniform(0, min(max, multiplier * 2^k))`
//!   where `k` is the zero-based index of the attempt that just failed

use crate::config::FetcherConfig;
use std::time::Duration;

/// Politeness delay applied before every attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Politeness {
    pub base: Duration,
    pub jitter_ratio: f64,
}

impl Politeness {
    pub fn new(base: Duration, jitter_ratio: f64) -> Self {
        Self {
            base,
            jitter_ratio: jitter_ratio.clamp(0.0, 1.0),
        }
    }

    /// Smallest delay `delay()` can return
    pub fn lower_bound(&self) -> Duration {
        self.base.mul_f64(1.0 - self.jitter_ratio)
    }

    /// Largest delay `delay()` can return
    pub fn upper_bound(&self) -> Duration {
        self.base.mul_f64(1.0 + self.jitter_ratio)
    }

    /// Draws a jittered delay within `[lower_bound, upper_bound]`
    pub fn delay(&self) -> Duration {
        if self.base.is_zero() {
            return Duration::ZERO;
        }
        let factor = 1.0 - self.jitter_ratio + fastrand::f64() * 2.0 * self.jitter_ratio;
        self.base.mul_f64(factor.min(1.0 + self.jitter_ratio))
    }
}

/// Bounded retry policy with randomized exponential backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub multiplier_s: f64,
    pub max_s: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            multiplier_s: config.backoff_multiplier_s,
            max_s: config.backoff_max_s,
        }
    }

    /// Upper bound of the wait after the attempt with zero-based index `k` fails
    pub fn ceiling(&self, k: u32) -> Duration {
        secs_to_duration(self.ceiling_secs(k))
    }

    /// Draws the wait after the attempt with zero-based index `k` fails
    pub fn delay_after(&self, k: u32) -> Duration {
        secs_to_duration(self.ceiling_secs(k) * fastrand::f64())
    }

    fn ceiling_secs(&self, k: u32) -> f64 {
        let exp = self.multiplier_s * 2f64.powi(k.min(62) as i32);
        exp.min(self.max_s)
    }
}

/// Converts seconds to a Duration, saturating instead of panicking
fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
