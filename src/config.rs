//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for one [`Executor`](crate::Executor).
//!
//! ## Sentinel values
//! - `tasks_limit < 1` → coerced to a single permit (never an error)
//! - `retry_limit` / `retry_timeout` are only validated when `retry_failures` is on
//!
//! Numeric fields are signed so that out-of-range input can be reported as a
//! [`ConfigError`] instead of being unrepresentable.

use std::time::Duration;

use tokio::sync::Semaphore;

use crate::{error::ConfigError, policies::RetryPolicy};

/// Configuration for the executor.
///
/// ## Field semantics
/// - `tasks_limit`: maximum attempts running their body at once (`< 1` = 1)
/// - `retry_failures`: re-run failed tasks in later rounds
/// - `retry_limit`: number of retry rounds (global, not per task)
/// - `retry_timeout`: seconds to sleep between rounds
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Desired concurrency.
    pub tasks_limit: i64,

    /// Enables the retry round state machine.
    pub retry_failures: bool,

    /// Number of retry rounds allowed after the first one.
    ///
    /// Retry rounds are shared by all tasks: one round retries every slot
    /// that failed in the previous round and consumes one unit of the limit.
    pub retry_limit: i64,

    /// Delay between rounds, in seconds.
    pub retry_timeout: i64,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the number of permits the concurrency gate is built with.
    ///
    /// Any `tasks_limit` below 1 yields exactly 1; values above the
    /// semaphore's maximum are capped to it.
    #[inline]
    pub fn concurrency_limit(&self) -> usize {
        if self.tasks_limit < 1 {
            1
        } else {
            usize::try_from(self.tasks_limit)
                .unwrap_or(usize::MAX)
                .min(Semaphore::MAX_PERMITS)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Validates the retry settings and returns the resulting policy.
    ///
    /// The limit is checked before the timeout, so a config violating both
    /// reports [`ConfigError::InvalidRetryLimit`].
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        if !self.retry_failures {
            return Ok(RetryPolicy::disabled());
        }
        if self.retry_limit < 1 {
            return Err(ConfigError::InvalidRetryLimit {
                limit: self.retry_limit,
            });
        }
        if self.retry_timeout < 0 {
            return Err(ConfigError::InvalidRetryTimeout {
                timeout: self.retry_timeout,
            });
        }

        let limit = u32::try_from(self.retry_limit).unwrap_or(u32::MAX);
        let delay = Duration::from_secs(self.retry_timeout.unsigned_abs());
        Ok(RetryPolicy::enabled(limit, delay))
    }

    /// Returns a new config with updated concurrency.
    pub fn with_tasks_limit(mut self, tasks_limit: i64) -> Self {
        self.tasks_limit = tasks_limit;
        self
    }

    /// Returns a new config with retries enabled and the given limit and delay.
    pub fn with_retries(mut self, retry_limit: i64, retry_timeout: i64) -> Self {
        self.retry_failures = true;
        self.retry_limit = retry_limit;
        self.retry_timeout = retry_timeout;
        self
    }

    /// Returns a new config with retries disabled.
    pub fn without_retries(mut self) -> Self {
        self.retry_failures = false;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `tasks_limit = 10`
    /// - `retry_failures = false`
    /// - `retry_limit = 1`
    /// - `retry_timeout = 10` (seconds)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            tasks_limit: 10,
            retry_failures: false,
            retry_limit: 1,
            retry_timeout: 10,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.concurrency_limit(), 10);
        assert!(!cfg.retry_failures);
        assert_eq!(cfg.retry_limit, 1);
        assert_eq!(cfg.retry_timeout, 10);
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn tasks_limit_below_one_is_coerced() {
        for limit in [0, -1, -100, i64::MIN] {
            let cfg = Config::default().with_tasks_limit(limit);
            assert_eq!(cfg.concurrency_limit(), 1, "tasks_limit={limit}");
        }
        assert_eq!(Config::default().with_tasks_limit(3).concurrency_limit(), 3);
        assert_eq!(
            Config::default().with_tasks_limit(i64::MAX).concurrency_limit(),
            Semaphore::MAX_PERMITS
        );
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn disabled_retries_skip_validation() {
        let cfg = Config {
            retry_failures: false,
            retry_limit: 0,
            retry_timeout: -5,
            ..Config::default()
        };
        let policy = cfg.retry_policy().unwrap();
        assert!(!policy.is_enabled());
    }

    #[test]
    fn invalid_retry_settings_are_rejected() {
        let cfg = Config::default().with_retries(0, 1);
        assert_eq!(
            cfg.retry_policy().unwrap_err(),
            ConfigError::InvalidRetryLimit { limit: 0 }
        );

        let cfg = Config::default().with_retries(1, -1);
        assert_eq!(
            cfg.retry_policy().unwrap_err(),
            ConfigError::InvalidRetryTimeout { timeout: -1 }
        );

        let cfg = Config::default().with_retries(-3, -1);
        assert_eq!(cfg.retry_policy().unwrap_err().as_label(), "invalid_retry_limit");
    }

    #[test]
    fn valid_retry_settings_build_policy() {
        let policy = Config::default().with_retries(2, 0).retry_policy().unwrap();
        assert!(policy.is_enabled());
        assert_eq!(policy.limit(), 2);
        assert_eq!(policy.delay(), Duration::ZERO);

        let policy = Config::default()
            .with_retries(1, 3)
            .without_retries()
            .retry_policy()
            .unwrap();
        assert!(!policy.is_enabled());
    }
}
