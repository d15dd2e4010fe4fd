//! engine::centering — biased and unbiased (U-) centering of distance matrices.
//!
//! Purpose
//! -------
//! Double-center an `n×n` distance or kernel matrix. This is the primitive
//! every quadratic statistic in the crate is built on.
//!
//! Key behaviors
//! -------------
//! - Biased mode: `C[i,j] = D[i,j] − r_i/n − c_j/n + g/n²`, where `r_i`,
//!   `c_j`, `g` are row, column and grand sums. The diagonal is kept.
//! - Unbiased mode (U-centering): `C[i,j] = D[i,j] − r_i/(n−2) − c_j/(n−2)
//!   + g/((n−1)(n−2))` for `i ≠ j`, and `C[i,i] = 0` exactly.
//!
//! Invariants & assumptions
//! ------------------------
//! - The input is square. Unbiased mode requires `n ≥ 4`; smaller `n`
//!   yields non-finite entries and is rejected upstream by
//!   `independence::validation`.
//! - The function is pure: output depends only on `(dist, bias)`.
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};

/// Center a square distance matrix with the biased or unbiased formula.
///
/// Parameters
/// ----------
/// - `dist`: `ArrayView2<f64>`
///   Square `n×n` distance (or kernel) matrix.
/// - `bias`: `bool`
///   `true` for mean-based centering, `false` for U-centering.
///
/// Returns
/// -------
/// `Array2<f64>`
///   Freshly allocated centered matrix. In unbiased mode its diagonal is
///   exactly zero.
///
/// Panics
/// ------
/// - Never panics for square input. Non-square input is a programming
///   error (shapes are validated before the engine runs).
pub fn center_distmat(dist: ArrayView2<'_, f64>, bias: bool) -> Array2<f64> {
    let n = dist.nrows();
    let nf = n as f64;

    let row_sums: Array1<f64> = dist.sum_axis(Axis(1));
    let col_sums: Array1<f64> = dist.sum_axis(Axis(0));
    let grand_sum: f64 = row_sums.sum();

    let (margin_div, grand_div) =
        if bias { (nf, nf * nf) } else { (nf - 2.0, (nf - 1.0) * (nf - 2.0)) };
    let grand_term = grand_sum / grand_div;

    let mut centered = Array2::<f64>::zeros((n, n));
    Zip::indexed(&mut centered).and(&dist).for_each(|(i, j), c, &d| {
        *c = d - (row_sums[i] / margin_div + col_sums[j] / margin_div - grand_term);
    });

    if !bias {
        centered.diag_mut().fill(0.0);
    }
    centered
}
