//! Error types used by the executor and by tasks.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`]: invalid retry configuration, raised before any task runs.
//! - [`TaskError`]: failure of a single task attempt, captured as data.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::{any::Any, fmt::Display};

use thiserror::Error;

/// # Errors produced by configuration validation.
///
/// These are the only errors that propagate out of
/// [`Executor::execute`](crate::Executor::execute). They are raised before any
/// task is launched, so a failed call performs no work.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Retries are enabled but the retry limit is below 1.
    #[error("Retry limit must be a positive integer.")]
    InvalidRetryLimit {
        /// The rejected limit.
        limit: i64,
    },

    /// Retries are enabled but the delay between rounds is negative.
    #[error("Retry timeout must be a non negative integer.")]
    InvalidRetryTimeout {
        /// The rejected timeout, in seconds.
        timeout: i64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskrunner::ConfigError;
    ///
    /// let err = ConfigError::InvalidRetryLimit { limit: 0 };
    /// assert_eq!(err.as_label(), "invalid_retry_limit");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidRetryLimit { .. } => "invalid_retry_limit",
            ConfigError::InvalidRetryTimeout { .. } => "invalid_retry_timeout",
        }
    }

    /// Returns a human-readable message including the rejected value.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::InvalidRetryLimit { limit } => {
                format!("retry limit must be >= 1, got {limit}")
            }
            ConfigError::InvalidRetryTimeout { timeout } => {
                format!("retry timeout must be >= 0 seconds, got {timeout}")
            }
        }
    }
}

/// # Errors produced by task execution.
///
/// A task body reports failure by returning `Err(TaskError)`; a panic in the
/// body is captured as [`TaskError::Panicked`]. Either way the executor records
/// the error as the slot's outcome and never propagates it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task body returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task body (or the factory producing it) panicked.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use taskrunner::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Wraps a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        TaskError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }
}

/// Renders a panic payload the way `std` prints it, falling back to a placeholder.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_carry_fixed_messages() {
        let limit = ConfigError::InvalidRetryLimit { limit: 0 };
        let timeout = ConfigError::InvalidRetryTimeout { timeout: -1 };

        assert_eq!(limit.to_string(), "Retry limit must be a positive integer.");
        assert_eq!(
            timeout.to_string(),
            "Retry timeout must be a non negative integer."
        );
        assert_eq!(timeout.as_label(), "invalid_retry_timeout");
        assert_eq!(timeout.as_message(), "retry timeout must be >= 0 seconds, got -1");
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let err = TaskError::from_panic(Box::new("boom"));
        assert_eq!(err, TaskError::Panicked { info: "boom".into() });

        let err = TaskError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.as_message(), "panic: owned boom");

        let err = TaskError::from_panic(Box::new(42_u8));
        assert_eq!(err.as_label(), "task_panicked");
        assert_eq!(err.to_string(), "task panicked: unknown panic");
    }
}
