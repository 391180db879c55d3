//! # Per-slot results.
//!
//! [`Outcome`] is what the executor records for a slot after each attempt: the
//! success value or the captured [`TaskError`]. A later attempt's outcome
//! replaces an earlier one, so the final table holds the latest result per slot.

use crate::error::TaskError;

/// Result of the latest attempt of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The attempt produced a value.
    Success(T),
    /// The attempt failed; no later attempt replaced it.
    Failure(TaskError),
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Success`].
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns `true` for [`Outcome::Failure`].
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Borrows the success value, if any.
    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    /// Borrows the captured error, if any.
    pub fn failure(&self) -> Option<&TaskError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    /// Converts into a plain `Result`.
    pub fn into_result(self) -> Result<T, TaskError> {
        match self {
            Outcome::Success(v) => Ok(v),
            Outcome::Failure(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, TaskError>> for Outcome<T> {
    fn from(res: Result<T, TaskError>) -> Self {
        match res {
            Ok(v) => Outcome::Success(v),
            Err(e) => Outcome::Failure(e),
        }
    }
}
