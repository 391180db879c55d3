//! Retry policy.
//!
//! This module groups the knobs that control **if** failed tasks are attempted
//! again and **how long** the executor waits between rounds.
//!
//! ## Quick wiring
//! ```text
//! Config { retry_failures, retry_limit, retry_timeout }
//!      └─► Config::retry_policy() ─► RetryPolicy (validated)
//!           └─► core::executor round loop uses:
//!                - allows_round(rounds_used) to schedule failed slots
//!                - delay() to sleep between rounds
//! ```

mod retry;

pub use retry::RetryPolicy;
