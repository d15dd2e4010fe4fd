//! engine::quadratic — O(n²) covariance terms over centered matrices.
//!
//! Purpose
//! -------
//! Compute distance covariance / variance terms from centered `n×n`
//! matrices. This is the general path: any dimension, any metric, and
//! precomputed inputs all flow through here.
//!
//! Key behaviors
//! -------------
//! - [`dcov_centered`]: `Σᵢⱼ Cx[i,j]·Cy[i,j] / denom` over matrices that
//!   are already centered.
//! - [`trace_product`]: `trace(Cx · Cy) / denom`, evaluated in O(n²)
//!   without materializing the matrix product. Used by Hsic.
//! - [`dcov`]: centers both raw matrices and then calls [`dcov_centered`].
//! - [`permuted_dcov_centered`], [`permuted_trace_product`]: the same sums
//!   with `Cy` re-indexed by a sample permutation. Centering commutes with
//!   a simultaneous row/column permutation, so permutation tests center
//!   once and only re-index afterwards.
//!
//! Conventions
//! -----------
//! - `denom = n²` for the biased statistic, `n(n−3)` for the unbiased one;
//!   see [`dcov_denominator`].
//! - For symmetric inputs the elementwise and trace forms agree exactly in
//!   exact arithmetic and to rounding in `f64`.
use crate::engine::centering::center_distmat;
use ndarray::{ArrayView2, Zip};

/// Normalizing denominator for the quadratic statistic: `n²` (biased) or
/// `n(n−3)` (unbiased).
#[inline]
pub fn dcov_denominator(n: usize, bias: bool) -> f64 {
    let nf = n as f64;
    if bias { nf * nf } else { nf * (nf - 3.0) }
}

/// Distance covariance of two already-centered matrices.
///
/// Parameters
/// ----------
/// - `cx`, `cy`: `ArrayView2<f64>`
///   Centered `n×n` matrices with identical shape.
/// - `bias`: `bool`
///   Selects the denominator (see [`dcov_denominator`]).
///
/// Returns
/// -------
/// `f64`
///   `Σᵢⱼ cx[i,j]·cy[i,j] / denom`.
pub fn dcov_centered(cx: ArrayView2<'_, f64>, cy: ArrayView2<'_, f64>, bias: bool) -> f64 {
    let sum = Zip::from(&cx).and(&cy).fold(0.0_f64, |acc, &a, &b| acc + a * b);
    sum / dcov_denominator(cx.nrows(), bias)
}

/// Trace form `trace(Cx · Cy) / denom`.
///
/// Notes
/// -----
/// - Computes `Σᵢ Σₖ cx[i,k]·cy[k,i]` directly, so cost is O(n²) rather
///   than the O(n³) of an explicit product.
pub fn trace_product(cx: ArrayView2<'_, f64>, cy: ArrayView2<'_, f64>, bias: bool) -> f64 {
    let n = cx.nrows();
    let mut sum = 0.0_f64;
    for i in 0..n {
        let row = cx.row(i);
        let col = cy.column(i);
        sum += row.dot(&col);
    }
    sum / dcov_denominator(n, bias)
}

/// [`dcov_centered`] with `cy` replaced by `cy[perm[i], perm[j]]`.
pub fn permuted_dcov_centered(
    cx: ArrayView2<'_, f64>, cy: ArrayView2<'_, f64>, perm: &[usize], bias: bool,
) -> f64 {
    let n = cx.nrows();
    let mut sum = 0.0_f64;
    for (i, row) in cx.outer_iter().enumerate() {
        let cy_row = cy.row(perm[i]);
        for (j, &a) in row.iter().enumerate() {
            sum += a * cy_row[perm[j]];
        }
    }
    sum / dcov_denominator(n, bias)
}

/// [`trace_product`] with `cy` replaced by `cy[perm[i], perm[j]]`.
pub fn permuted_trace_product(
    cx: ArrayView2<'_, f64>, cy: ArrayView2<'_, f64>, perm: &[usize], bias: bool,
) -> f64 {
    let n = cx.nrows();
    let mut sum = 0.0_f64;
    for (i, row) in cx.outer_iter().enumerate() {
        let pi = perm[i];
        for (k, &a) in row.iter().enumerate() {
            sum += a * cy[[perm[k], pi]];
        }
    }
    sum / dcov_denominator(n, bias)
}

/// Distance covariance of two raw distance matrices, centering inline.
///
/// Parameters
/// ----------
/// - `distx`, `disty`: `ArrayView2<f64>`
///   Square distance matrices sharing `n`.
/// - `bias`: `bool`
///   Biased (`true`) or unbiased (`false`) centering and denominator.
///
/// Returns
/// -------
/// `f64`
///   Un-normalized distance covariance.
///
/// Examples
/// --------
/// ```rust
/// use ndarray::Array2;
/// use rust_independence::engine::dcov;
///
/// let pts = [0.0_f64, 1.0, 2.0, 4.0, 7.0];
/// let d = Array2::from_shape_fn((5, 5), |(i, j)| (pts[i] - pts[j]).abs());
/// assert!(dcov(d.view(), d.view(), false) > 0.0);
/// ```
pub fn dcov(distx: ArrayView2<'_, f64>, disty: ArrayView2<'_, f64>, bias: bool) -> f64 {
    let cx = center_distmat(distx, bias);
    let cy = center_distmat(disty, bias);
    dcov_centered(cx.view(), cy.view(), bias)
}
