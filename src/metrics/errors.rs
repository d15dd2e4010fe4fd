//! metrics::errors — failures raised while building distance/kernel matrices.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used by the pairwise
//! distance and kernel builders. Independence tests wrap these values
//! into their own error type through a `From` conversion so that metric
//! failures surface with the same `?`-based propagation as input
//! validation failures.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the metric contract (e.g. "unknown
//!   distance metric", "gamma must be finite and > 0").
//! - With the `python-bindings` feature enabled, every variant maps to a
//!   Python `ValueError` carrying the `Display` message verbatim.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for metric construction and matrix building.
pub type MetricResult<T> = Result<T, MetricError>;

/// MetricError — failures of the distance/kernel matrix builder.
///
/// Variants
/// --------
/// - `UnknownMetric { name }`
///   A metric name did not match any builtin distance or kernel.
/// - `InvalidParameter { name, value, reason }`
///   A metric parameter (bandwidth, Minkowski order, degree, ...) is
///   outside its admissible range.
/// - `InvalidCustomOutput { rows, cols, expected }`
///   A user-supplied metric returned a matrix that is not `n × n`.
/// - `CustomFailed { reason }`
///   A user-supplied metric raised instead of returning a matrix; `reason`
///   carries its message.
/// - `NonFiniteOutput { row, col, value }`
///   A metric produced NaN or ±∞ (e.g. cosine distance of a zero row).
/// - `NonPositiveKernelMax { value }`
///   A kernel matrix cannot be rescaled into a distance because its
///   largest entry is not strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    UnknownMetric { name: String },
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },
    InvalidCustomOutput { rows: usize, cols: usize, expected: usize },
    CustomFailed { reason: String },
    NonFiniteOutput { row: usize, col: usize, value: f64 },
    NonPositiveKernelMax { value: f64 },
}

impl std::error::Error for MetricError {}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricError::UnknownMetric { name } => {
                write!(f, "Unknown metric {name:?}; expected a builtin name or 'precomputed'.")
            }
            MetricError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid metric parameter {name} = {value}; {reason}")
            }
            MetricError::InvalidCustomOutput { rows, cols, expected } => {
                write!(
                    f,
                    "Custom metric must return a {expected}x{expected} matrix; got {rows}x{cols}"
                )
            }
            MetricError::CustomFailed { reason } => {
                write!(f, "Custom metric failed: {reason}")
            }
            MetricError::NonFiniteOutput { row, col, value } => {
                write!(f, "Metric produced a non-finite entry at ({row}, {col}): {value}")
            }
            MetricError::NonPositiveKernelMax { value } => {
                write!(f, "Kernel matrix maximum must be > 0 to form a distance; got {value}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<MetricError> for PyErr {
    fn from(err: MetricError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that the unknown-metric message embeds the offending name.
    fn metric_error_unknown_metric_includes_name() {
        // Arrange
        let err = MetricError::UnknownMetric { name: "hamming2".to_string() };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("hamming2"), "expected metric name in message.\nGot: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that a malformed custom output reports both the observed
    // and the expected shape.
    fn metric_error_invalid_custom_output_reports_shapes() {
        let err = MetricError::InvalidCustomOutput { rows: 3, cols: 4, expected: 5 };
        let msg = err.to_string();
        assert!(msg.contains("5x5") && msg.contains("3x4"), "Got: {msg}");
    }

    #[test]
    fn metric_error_custom_failed_carries_reason() {
        let err = MetricError::CustomFailed { reason: "ValueError: bad input".to_string() };
        let msg = err.to_string();
        assert!(msg.starts_with("Custom metric failed") && msg.contains("bad input"), "Got: {msg}");
    }
}
