//! # Retry rounds.
//!
//! [`RetryPolicy`] decides whether failed slots get another attempt and how long
//! the executor sleeps between rounds.
//!
//! Retry rounds are global, not per task: the round counter is owned by the
//! executor loop and advances once per round no matter how many slots failed in
//! it. A permanently failing task is therefore attempted at most `limit + 1`
//! times.
//!
//! ```text
//! round 1: all slots ──► join ──► failed = {a, c}
//!          rounds_used(0) < limit ─► schedule a, c ─► sleep(delay) ─► rounds_used = 1
//! round 2: a, c      ──► join ──► failed = {c}
//!          rounds_used(1) < limit? ...
//! ```

use std::time::Duration;

/// Validated retry configuration.
///
/// Built by [`Config::retry_policy`](crate::Config::retry_policy); when enabled,
/// `limit >= 1` holds by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    enabled: bool,
    limit: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Policy that never retries.
    pub(crate) fn disabled() -> Self {
        Self {
            enabled: false,
            limit: 0,
            delay: Duration::ZERO,
        }
    }

    /// Policy allowing `limit` retry rounds separated by `delay`.
    pub(crate) fn enabled(limit: u32, delay: Duration) -> Self {
        Self {
            enabled: true,
            limit,
            delay,
        }
    }

    /// Returns `true` if failed slots may be retried at all.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Maximum number of retry rounds (0 when disabled).
    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Sleep between two rounds.
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `true` if another retry round may start after `rounds_used` rounds.
    #[inline]
    pub fn allows_round(&self, rounds_used: u32) -> bool {
        self.enabled && rounds_used < self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_never_allows_rounds() {
        let policy = RetryPolicy::disabled();
        assert!(!policy.allows_round(0));
        assert_eq!(policy.limit(), 0);
    }

    #[test]
    fn enabled_allows_up_to_limit() {
        let policy = RetryPolicy::enabled(2, Duration::from_secs(1));
        assert!(policy.allows_round(0));
        assert!(policy.allows_round(1));
        assert!(!policy.allows_round(2));
        assert!(!policy.allows_round(3));
    }
}
