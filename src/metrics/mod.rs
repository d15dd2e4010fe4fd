//! metrics — pairwise distance and kernel matrix builders.
//!
//! Purpose
//! -------
//! Turn raw `n×p` sample matrices into the `n×n` distance (Dcorr) or
//! kernel similarity (Hsic) matrices consumed by the statistic engines.
//! Metric choice is a closed enum resolved once at configuration time,
//! with a `Custom` escape hatch for user callables and a `Precomputed`
//! passthrough for callers that already hold the matrices.
//!
//! Key behaviors
//! -------------
//! - [`DistanceMetric`] / [`compute_dist`] for distance matrices.
//! - [`KernelMetric`] / [`compute_kern`] for kernel matrices, including the
//!   Gaussian median-bandwidth heuristic.
//! - [`kernel_to_distance`] to rescale kernels into distance-like matrices.
//!
//! Invariants & assumptions
//! ------------------------
//! - Builders never return non-finite entries; such outputs are reported
//!   as [`MetricError::NonFiniteOutput`].
//! - Inputs are assumed to have passed the independence-test validation
//!   (finite, consistent row counts) before reaching this module.

pub mod distance;
pub mod errors;
pub mod kernel;

pub use self::distance::{CustomMetricFn, DistanceMetric, compute_dist};
pub use self::errors::{MetricError, MetricResult};
pub use self::kernel::{KernelMetric, compute_kern, kernel_to_distance, median_heuristic_gamma};
