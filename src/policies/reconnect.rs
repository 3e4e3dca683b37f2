//! # Reconnect policy.
//!
//! [`ReconnectPolicy`] decides how long the reconnect loop sleeps after a failed
//! dial. The wait for the `n`-th consecutive failure (0-indexed) is
//! `interval × factor^n`, clamped to `max`, then jittered. The failure counter
//! resets whenever a dial succeeds.
//!
//! The default is a fixed interval: every retry waits exactly five seconds.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use brokervisor::ReconnectPolicy;
//!
//! let fixed = ReconnectPolicy::default();
//! assert_eq!(fixed.delay(0), Duration::from_secs(5));
//! assert_eq!(fixed.delay(40), Duration::from_secs(5));
//!
//! let grow = ReconnectPolicy::exponential(Duration::from_millis(500), Duration::from_secs(4));
//! assert_eq!(grow.delay(0), Duration::from_millis(500));
//! assert_eq!(grow.delay(2), Duration::from_secs(2));
//! assert_eq!(grow.delay(9), Duration::from_secs(4));
//! ```

use std::time::Duration;

use super::jitter::JitterPolicy;

/// Default wait between dial attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Timing of redial attempts after a failure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconnectPolicy {
    /// Wait after the first failure.
    pub interval: Duration,
    /// Upper bound on any wait.
    pub max: Duration,
    /// Growth factor per consecutive failure (`1.0` = fixed interval).
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: JitterPolicy,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_INTERVAL)
    }
}

impl ReconnectPolicy {
    /// Retry every `interval`, forever.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max: interval,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Double the wait after each consecutive failure, up to `max`.
    pub fn exponential(first: Duration, max: Duration) -> Self {
        Self {
            interval: first,
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Returns a copy with the given jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait before the next dial, given the number of consecutive failures so far.
    pub fn delay(&self, failures: u32) -> Duration {
        let exp = failures.min(i32::MAX as u32) as i32;
        let secs = self.interval.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_five_seconds() {
        let policy = ReconnectPolicy::default();
        for failures in [0, 1, 7, u32::MAX] {
            assert_eq!(policy.delay(failures), Duration::from_secs(5));
        }
    }

    #[test]
    fn exponential_doubles_then_caps() {
        let policy =
            ReconnectPolicy::exponential(Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(4), Duration::from_secs(1));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn interval_above_max_is_clamped() {
        let policy = ReconnectPolicy {
            interval: Duration::from_secs(10),
            max: Duration::from_secs(3),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.delay(0), Duration::from_secs(3));
    }

    #[test]
    fn jitter_never_exceeds_cap() {
        let policy = ReconnectPolicy::exponential(Duration::from_millis(50), Duration::from_secs(2))
            .with_jitter(JitterPolicy::Full);
        for failures in 0..40 {
            assert!(policy.delay(failures) <= Duration::from_secs(2));
        }
    }
}
