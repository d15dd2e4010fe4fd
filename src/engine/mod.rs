//! engine — numeric core of the distance-correlation family.
//!
//! Purpose
//! -------
//! Host the pure numeric kernels shared by every independence test:
//! matrix centering, the O(n²) quadratic statistic, the O(n log n)
//! univariate statistic, and the correlation normalizer.
//!
//! Key behaviors
//! -------------
//! - [`center_distmat`]: biased or unbiased (U-) centering.
//! - [`dcov`], [`dcov_centered`], [`trace_product`]: quadratic covariance
//!   terms.
//! - [`fast_1d_dcov`], [`fast_1d_dcorr`]: merge-sort based statistic for
//!   1-D Euclidean inputs.
//! - [`normalize`] and [`dcorr`]: covariance → correlation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every function here is pure and allocation-local; nothing retains
//!   state across calls, so they are safe to call concurrently from the
//!   permutation workers.
//! - Inputs are validated upstream (finite, square where required,
//!   `n ≥ 4` for unbiased statistics).
//!
//! Downstream usage
//! ----------------
//! - `independence::dcorr` and `independence::hsic` build their statistics
//!   from these primitives; `significance` reruns them under permutation.

pub mod centering;
pub mod fast_1d;
pub mod quadratic;

pub use self::centering::center_distmat;
pub use self::fast_1d::{fast_1d_dcorr, fast_1d_dcov};
pub use self::quadratic::{
    dcov, dcov_centered, dcov_denominator, permuted_dcov_centered, permuted_trace_product,
    trace_product,
};

use ndarray::ArrayView2;

/// Combine a covariance and two variances into a correlation.
///
/// Returns `covar / sqrt(varx · vary)` when both variances are strictly
/// positive and exactly `0.0` otherwise.
#[inline]
pub fn normalize(covar: f64, varx: f64, vary: f64) -> f64 {
    if varx <= 0.0 || vary <= 0.0 { 0.0 } else { covar / (varx * vary).sqrt() }
}

/// Distance correlation of two distance matrices via the quadratic engine.
///
/// Parameters
/// ----------
/// - `distx`, `disty`: `ArrayView2<f64>`
///   Square distance matrices sharing `n`.
/// - `bias`: `bool`
///   Biased or unbiased centering.
///
/// Returns
/// -------
/// `f64`
///   Correlation in `[−1, 1]`; `0.0` exactly when either matrix has
///   non-positive distance variance.
pub fn dcorr(distx: ArrayView2<'_, f64>, disty: ArrayView2<'_, f64>, bias: bool) -> f64 {
    let cx = center_distmat(distx, bias);
    let cy = center_distmat(disty, bias);
    let covar = dcov_centered(cx.view(), cy.view(), bias);
    let varx = dcov_centered(cx.view(), cx.view(), bias);
    let vary = dcov_centered(cy.view(), cy.view(), bias);
    normalize(covar, varx, vary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use proptest::prelude::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Degeneracy handling of the normalizer.
    // - Identity-matrix and zero-matrix reference values of dcorr.
    // - Symmetry and range of the quadratic dcorr (property based).
    // -------------------------------------------------------------------------

    #[test]
    fn normalize_zeroes_non_positive_variances() {
        assert_eq!(normalize(1.0, 0.0, 2.0), 0.0);
        assert_eq!(normalize(1.0, 2.0, -1e-300), 0.0);
        assert_eq!(normalize(0.5, 1.0, 4.0), 0.25);
    }

    #[test]
    // Purpose
    // -------
    // Reference values: dcorr of an identity matrix with itself is 1, and
    // dcorr of an all-zero matrix is 0.
    fn dcorr_reference_values() {
        // Arrange
        let eye = Array2::<f64>::eye(100);
        let zeros = Array2::<f64>::zeros((100, 100));

        // Act
        let same = dcorr(eye.view(), eye.view(), false);
        let flat = dcorr(zeros.view(), zeros.view(), false);

        // Assert
        assert!((same - 1.0).abs() < 1e-12, "got {same}");
        assert_eq!(flat, 0.0);
    }

    fn dist_1d(pts: &[f64]) -> Array2<f64> {
        let n = pts.len();
        Array2::from_shape_fn((n, n), |(i, j)| (pts[i] - pts[j]).abs())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn dcorr_is_symmetric_and_bounded(
            x in prop::collection::vec(-100.0_f64..100.0, 4..30),
            bias in any::<bool>(),
            shift in -3.0_f64..3.0,
        ) {
            let y: Vec<f64> = x.iter().enumerate().map(|(i, &v)| (v + shift * i as f64).sin()).collect();
            let (dx, dy) = (dist_1d(&x), dist_1d(&y));

            let xy = dcorr(dx.view(), dy.view(), bias);
            let yx = dcorr(dy.view(), dx.view(), bias);

            prop_assert!(xy.is_finite());
            prop_assert_eq!(xy, yx);
            prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&xy), "out of range: {}", xy);
        }
    }
}
