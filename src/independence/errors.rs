//! independence::errors — error types for the independence tests.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias returned by every public entry
//! point of the independence tests (`Dcorr`, `Hsic`), their option
//! constructors, and the significance drivers they call.
//!
//! Key behaviors
//! -------------
//! - Separate input validation failures (shape, finiteness, sample count),
//!   parameter failures (`reps`, `workers`, block shape) and runtime
//!   failures (thread-pool construction, non-finite statistics).
//! - Wrap [`MetricError`] so metric failures propagate through `?`.
//! - Map every variant to a Python `ValueError` when the
//!   `python-bindings` feature is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All validation errors are raised before any statistic is computed.
//! - Under-powered configurations (`reps < 1000`) are advisories carried
//!   by the outcome, never errors.
//!
//! Testing notes
//! -------------
//! - Unit tests check that messages embed their payloads and that metric
//!   errors convert transparently.

use crate::metrics::MetricError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type IndepResult<T> = Result<T, IndepError>;

/// IndepError — validation, parameter and runtime failures of a test.
///
/// Variants
/// --------
/// - `EmptyInput`
///   One of the sample matrices has no rows or no columns.
/// - `InsufficientSamples { n, min }`
///   Fewer samples than the statistic needs (`4` unbiased, `1` biased).
/// - `SampleSizeMismatch { nx, ny }`
///   `x` and `y` disagree on the number of samples.
/// - `NonFiniteData { matrix, row, col, value }`
///   An input entry is NaN or ±∞.
/// - `NotSquare { matrix, rows, cols }`
///   A precomputed distance/kernel matrix is not `n×n`.
/// - `InvalidReps { value }`
///   `reps` is zero, negative, or not an integer.
/// - `InvalidWorkers { value }`
///   `workers` is neither `-1` nor a positive integer.
/// - `PermBlocksDimMismatch { expected, actual }`
///   The permutation block array does not have one row per sample.
/// - `NonFiniteStatistic { value }`
///   A statistic evaluated to NaN or ±∞.
/// - `ThreadPool { reason }`
///   The worker pool for parallel permutations could not be built.
/// - `Distribution { reason }`
///   The reference χ² distribution could not be constructed.
/// - `Metric(MetricError)`
///   Distance or kernel construction failed.
#[derive(Debug, Clone, PartialEq)]
pub enum IndepError {
    // ---- Input validation ----
    EmptyInput,
    InsufficientSamples { n: usize, min: usize },
    SampleSizeMismatch { nx: usize, ny: usize },
    NonFiniteData { matrix: &'static str, row: usize, col: usize, value: f64 },
    NotSquare { matrix: &'static str, rows: usize, cols: usize },

    // ---- Parameters ----
    InvalidReps { value: String },
    InvalidWorkers { value: i64 },
    PermBlocksDimMismatch { expected: usize, actual: usize },

    // ---- Runtime ----
    NonFiniteStatistic { value: f64 },
    ThreadPool { reason: String },
    Distribution { reason: String },
    Metric(MetricError),
}

impl std::error::Error for IndepError {}

impl std::fmt::Display for IndepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndepError::EmptyInput => write!(f, "Input matrices must be non-empty."),
            IndepError::InsufficientSamples { n, min } => {
                write!(f, "At least {min} samples are required; got n = {n}.")
            }
            IndepError::SampleSizeMismatch { nx, ny } => {
                write!(f, "Shape mismatch: x has {nx} samples, y has {ny}.")
            }
            IndepError::NonFiniteData { matrix, row, col, value } => {
                write!(f, "Input {matrix} has a non-finite entry at ({row}, {col}): {value}")
            }
            IndepError::NotSquare { matrix, rows, cols } => {
                write!(f, "Precomputed {matrix} must be square; got {rows}x{cols}.")
            }
            IndepError::InvalidReps { value } => {
                write!(f, "Number of reps must be an integer greater than 0; got {value}.")
            }
            IndepError::InvalidWorkers { value } => {
                write!(f, "Workers must be -1 (all cores) or a positive integer; got {value}.")
            }
            IndepError::PermBlocksDimMismatch { expected, actual } => {
                write!(
                    f,
                    "perm_blocks must have one row per sample: expected {expected}, got {actual}."
                )
            }
            IndepError::NonFiniteStatistic { value } => {
                write!(f, "Test statistic is not finite: {value}")
            }
            IndepError::ThreadPool { reason } => {
                write!(f, "Failed to build permutation worker pool: {reason}")
            }
            IndepError::Distribution { reason } => {
                write!(f, "Failed to build the chi-squared reference distribution: {reason}")
            }
            IndepError::Metric(err) => write!(f, "{err}"),
        }
    }
}

impl From<MetricError> for IndepError {
    fn from(err: MetricError) -> Self {
        IndepError::Metric(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<IndepError> for PyErr {
    fn from(err: IndepError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Payload-bearing Display messages.
    // - Transparent conversion of metric errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Messages must embed the offending values so Python users see them.
    fn indep_error_messages_embed_payloads() {
        // Arrange
        let cases = [
            (IndepError::InsufficientSamples { n: 3, min: 4 }, "n = 3"),
            (IndepError::SampleSizeMismatch { nx: 10, ny: 9 }, "y has 9"),
            (IndepError::InvalidReps { value: "-1".to_string() }, "-1"),
            (IndepError::PermBlocksDimMismatch { expected: 100, actual: 99 }, "got 99"),
            (IndepError::Distribution { reason: "freedom must be > 0".to_string() }, "> 0"),
            (
                IndepError::NonFiniteData { matrix: "x", row: 2, col: 0, value: f64::NAN },
                "(2, 0)",
            ),
        ];

        for (err, needle) in cases {
            // Act
            let msg = err.to_string();

            // Assert
            assert!(msg.contains(needle), "expected {needle:?} in {msg:?}");
        }
    }

    #[test]
    fn indep_error_wraps_metric_error_message() {
        let metric = MetricError::UnknownMetric { name: "foo".to_string() };
        let err: IndepError = metric.clone().into();
        assert_eq!(err, IndepError::Metric(metric.clone()));
        assert_eq!(err.to_string(), metric.to_string());
    }
}
