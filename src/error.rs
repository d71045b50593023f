//! Error types used by the powser runtime and series operators.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the [`Session`](crate::Session) itself.
//! - [`SeriesError`]: faults raised while computing the terms of a series.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! End-of-stream is **not** an error: a pull that finds a closed series returns
//! `Ok(None)`. Dropping a series is not an error either.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the powser runtime.
///
/// These represent failures of the hosting [`Session`](crate::Session),
/// such as operator tasks that did not exit within the grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Grace period was exceeded; some operator tasks were still alive.
    #[error("grace period {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Labels of the tasks that had not exited in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use powser::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
        }
    }
}

/// # Faults produced while computing a series.
///
/// A fault is terminal for the series that carries it: the consumer observes
/// the error once and every later pull reports end-of-stream. Faults travel
/// downstream only, so series that do not depend on the faulty one are
/// unaffected.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// Reciprocal of a series whose leading coefficient is zero (or that has no terms).
    #[error("division by zero: leading coefficient is zero")]
    DivisionByZero,

    /// A programming-contract violation surfaced at runtime.
    ///
    /// Raised when a self-referential series reads a term it has not produced yet.
    #[error("contract violation: {reason}")]
    ContractViolation {
        /// What was violated.
        reason: String,
    },
}

impl SeriesError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use powser::SeriesError;
    ///
    /// assert_eq!(SeriesError::DivisionByZero.as_label(), "series_division_by_zero");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SeriesError::DivisionByZero => "series_division_by_zero",
            SeriesError::ContractViolation { .. } => "series_contract_violation",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SeriesError::DivisionByZero => "division by zero".to_string(),
            SeriesError::ContractViolation { reason } => format!("contract: {reason}"),
        }
    }

    pub(crate) fn contract(reason: impl Into<String>) -> Self {
        SeriesError::ContractViolation {
            reason: reason.into(),
        }
    }
}
