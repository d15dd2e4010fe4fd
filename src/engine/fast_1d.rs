//! engine::fast_1d — O(n log n) distance covariance for univariate data.
//!
//! Purpose
//! -------
//! Compute the distance covariance of two 1-D samples under the Euclidean
//! (absolute difference) metric without materializing either `n×n`
//! distance matrix.
//!
//! Key behaviors
//! -------------
//! - Sorts `x` (stable) and reorders `y` alongside it.
//! - Row sums `aᵢ = Σⱼ |xᵢ − xⱼ|` come from prefix sums of the sorted
//!   values.
//! - A bottom-up merge sort of `y` (descending) in the sorted-`x` index
//!   space counts, for every element, the left-run elements it overtakes
//!   and accumulates their `x`, `y` and `x·y` sums. Together with
//!   `n·Σ(x − x̄)(y − ȳ)` those give `Σᵢⱼ |Δx||Δy|`.
//! - The final merge order doubles as the `y`-sorted order, so the `y` row
//!   sums need no second sort.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x.len() == y.len()`; finiteness is checked by the caller.
//! - Tie rule in the merge: when `y[left] >= y[right]` the left element is
//!   placed first.
//! - The result equals [`crate::engine::quadratic::dcov`] on the explicit
//!   absolute-difference matrices up to floating-point rounding.
//!
//! Testing notes
//! -------------
//! - The proptest below checks agreement with the quadratic engine for
//!   several sample sizes and both bias conventions.
use crate::engine::normalize;

/// Denominators `(d, Σa·Σb, a·b)` for the three terms of the estimator.
fn denominators(n: usize, bias: bool) -> [f64; 3] {
    let nf = n as f64;
    if bias {
        [nf * nf, nf * nf * nf, nf * nf * nf * nf]
    } else {
        let d0 = nf * (nf - 3.0);
        let d1 = d0 * (nf - 2.0);
        [d0, d1, d1 * (nf - 1.0)]
    }
}

/// Row sums of the absolute-difference matrix for ascending `sorted`.
fn abs_deviation_sums(sorted: &[f64]) -> Vec<f64> {
    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    let mut prefix = 0.0_f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            prefix += v;
            (2.0 * i as f64 + 2.0 - n) * v + total - 2.0 * prefix
        })
        .collect()
}

/// Distance covariance of two univariate samples in O(n log n).
///
/// Parameters
/// ----------
/// - `x`, `y`: `&[f64]`
///   Paired samples of equal length `n` (`n ≥ 4` when `bias` is false).
/// - `bias`: `bool`
///   Biased (`n², n³, n⁴`) or unbiased denominators.
///
/// Returns
/// -------
/// `f64`
///   Distance covariance; identical in meaning to the quadratic `dcov`
///   of the `|xᵢ − xⱼ|`, `|yᵢ − yⱼ|` matrices.
///
/// Panics
/// ------
/// - Panics if `x` and `y` differ in length.
pub fn fast_1d_dcov(x: &[f64], y: &[f64], bias: bool) -> f64 {
    assert_eq!(x.len(), y.len(), "fast_1d_dcov: samples must have equal length");
    let n = x.len();
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));
    let xs: Vec<f64> = order.iter().map(|&i| x[i]).collect();
    let ys: Vec<f64> = order.iter().map(|&i| y[i]).collect();

    let ax = abs_deviation_sums(&xs);

    // Merge state: two index buffers, swapped every pass.
    let mut buffers = [(0..n).collect::<Vec<usize>>(), vec![0_usize; n]];
    let mut crossed = vec![0.0_f64; n];
    let mut crossed_x = vec![0.0_f64; n];
    let mut crossed_y = vec![0.0_f64; n];
    let mut crossed_xy = vec![0.0_f64; n];
    let mut csum = vec![[0.0_f64; 3]; n + 1];

    let mut width = 1;
    let mut current = 0;
    while width < n {
        let (first, second) = buffers.split_at_mut(1);
        let (src, dst) =
            if current == 0 { (&first[0], &mut second[0]) } else { (&second[0], &mut first[0]) };

        for (p, &i) in src.iter().enumerate() {
            let prev = csum[p];
            csum[p + 1] = [prev[0] + xs[i], prev[1] + ys[i], prev[2] + xs[i] * ys[i]];
        }

        let mut k = 0;
        let mut start = 0;
        while start < n {
            let mut st0 = start;
            let e0 = (start + width).min(n);
            let mut st1 = e0;
            let e1 = (start + 2 * width).min(n);

            while st0 < e0 && st1 < e1 {
                let a = src[st0];
                let b = src[st1];
                if ys[a] >= ys[b] {
                    dst[k] = a;
                    st0 += 1;
                } else {
                    dst[k] = b;
                    st1 += 1;
                    crossed[b] += (e0 - st0) as f64;
                    crossed_x[b] += csum[e0][0] - csum[st0][0];
                    crossed_y[b] += csum[e0][1] - csum[st0][1];
                    crossed_xy[b] += csum[e0][2] - csum[st0][2];
                }
                k += 1;
            }
            if st0 < e0 {
                let len = e0 - st0;
                dst[k..k + len].copy_from_slice(&src[st0..e0]);
                k += len;
            } else if st1 < e1 {
                let len = e1 - st1;
                dst[k..k + len].copy_from_slice(&src[st1..e1]);
                k += len;
            }
            start += 2 * width;
        }

        width *= 2;
        current = 1 - current;
    }

    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;
    let covterm =
        nf * xs.iter().zip(&ys).map(|(&a, &b)| (a - x_mean) * (b - y_mean)).sum::<f64>();

    let mut c1 = 0.0_f64;
    let mut c2 = 0.0_f64;
    let mut c3 = 0.0_f64;
    let mut c4 = 0.0_f64;
    for i in 0..n {
        c1 += crossed[i] * xs[i] * ys[i];
        c2 += crossed_xy[i];
        c3 += crossed_x[i] * ys[i];
        c4 += crossed_y[i] * xs[i];
    }
    let d = 4.0 * ((c1 + c2) - (c3 + c4)) - 2.0 * covterm;

    // The merge leaves y in descending order; reversed, it is ascending.
    let ascending: Vec<usize> = buffers[current].iter().rev().copied().collect();
    let y_sorted: Vec<f64> = ascending.iter().map(|&i| ys[i]).collect();
    let by_sorted = abs_deviation_sums(&y_sorted);
    let mut by = vec![0.0_f64; n];
    for (pos, &i) in ascending.iter().enumerate() {
        by[i] = by_sorted[pos];
    }

    let sum_ax: f64 = ax.iter().sum();
    let sum_by: f64 = by.iter().sum();
    let ax_dot_by: f64 = ax.iter().zip(&by).map(|(&a, &b)| a * b).sum();

    let [den0, den1, den2] = denominators(n, bias);
    d / den0 + sum_ax * sum_by / den2 - 2.0 * ax_dot_by / den1
}

/// Distance correlation of two univariate samples in O(n log n).
///
/// Returns `0.0` exactly when either distance variance is non-positive.
pub fn fast_1d_dcorr(x: &[f64], y: &[f64], bias: bool) -> f64 {
    let covar = fast_1d_dcov(x, y, bias);
    let varx = fast_1d_dcov(x, x, bias);
    let vary = fast_1d_dcov(y, y, bias);
    normalize(covar, varx, vary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::quadratic::dcov;
    use ndarray::Array2;
    use proptest::prelude::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Row sums from prefix sums.
    // - Agreement with the quadratic engine on fixed and random inputs,
    //   including ties.
    // - Perfect self-correlation and constant-input degeneracy.
    // -------------------------------------------------------------------------

    fn dist_1d(pts: &[f64]) -> Array2<f64> {
        let n = pts.len();
        Array2::from_shape_fn((n, n), |(i, j)| (pts[i] - pts[j]).abs())
    }

    fn assert_close(fast: f64, slow: f64, rel: f64) {
        let scale = slow.abs().max(1e-12);
        assert!((fast - slow).abs() / scale < rel, "fast={fast}, quadratic={slow}");
    }

    #[test]
    fn abs_deviation_sums_match_brute_force() {
        let sorted = [-2.0, -0.5, 0.0, 1.5, 4.0];
        let got = abs_deviation_sums(&sorted);
        for (i, &g) in got.iter().enumerate() {
            let expected: f64 = sorted.iter().map(|&v| (sorted[i] - v).abs()).sum();
            assert!((g - expected).abs() < 1e-12, "i={i}: {g} vs {expected}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Fixed example with ties in both variables: the merge tie rule must
    // not change the statistic.
    //
    // Given
    // -----
    // - x and y containing repeated values, both bias conventions.
    //
    // Expect
    // ------
    // - Fast and quadratic dcov agree to 1e-9 relative.
    fn fast_1d_dcov_matches_quadratic_with_ties() {
        // Arrange
        let x = [1.0, 3.0, 3.0, -2.0, 0.5, 1.0, 7.0, 3.0, -2.0];
        let y = [2.0, 2.0, -1.0, 0.0, 2.0, 5.0, -1.0, 4.0, 0.0];
        let (dx, dy) = (dist_1d(&x), dist_1d(&y));

        for bias in [false, true] {
            // Act
            let fast = fast_1d_dcov(&x, &y, bias);
            let slow = dcov(dx.view(), dy.view(), bias);

            // Assert
            assert_close(fast, slow, 1e-9);
        }
    }

    #[test]
    fn fast_1d_dcorr_self_is_one() {
        let x: Vec<f64> = (0..25).map(f64::from).collect();
        let stat = fast_1d_dcorr(&x, &x, false);
        assert!((stat - 1.0).abs() < 1e-12, "got {stat}");
    }

    #[test]
    fn fast_1d_dcorr_constant_input_is_exactly_zero() {
        let x: Vec<f64> = (0..12).map(f64::from).collect();
        let y = vec![3.5; 12];
        assert_eq!(fast_1d_dcorr(&x, &y, false), 0.0);
        assert_eq!(fast_1d_dcorr(&y, &x, true), 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        // Purpose
        // -------
        // Fast and quadratic unbiased dcov agree to 1e-6 relative across
        // the sample sizes the engine is tuned for.
        fn fast_1d_dcov_matches_quadratic_random(
            n in prop::sample::select(vec![10_usize, 50, 100, 500]),
            seed in any::<u64>(),
            bias in any::<bool>(),
        ) {
            use rand::{Rng, SeedableRng};
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
            let y: Vec<f64> = x.iter().map(|&v| v * v + rng.gen_range(-1.0..1.0)).collect();

            let fast = fast_1d_dcov(&x, &y, bias);
            let slow = dcov(dist_1d(&x).view(), dist_1d(&y).view(), bias);

            let scale = slow.abs().max(1e-9);
            prop_assert!((fast - slow).abs() / scale < 1e-6, "fast={}, quadratic={}", fast, slow);
        }
    }
}
