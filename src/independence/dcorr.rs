//! independence::dcorr — distance correlation test.
//!
//! Purpose
//! -------
//! Test independence of paired samples `x (n×p)` and `y (n×q)` with the
//! (biased or unbiased) distance correlation, and calibrate the statistic
//! by permutation or by the χ²₁ approximation.
//!
//! Key behaviors
//! -------------
//! - [`Dcorr::statistic`] validates inputs, builds both distance matrices
//!   with the configured [`DistanceMetric`], and returns the quadratic
//!   distance correlation.
//! - [`Dcorr::test`] additionally:
//!   - checks the block array against `n` before any statistic is
//!     computed,
//!   - takes the O(n log n) path when `auto` is set, both inputs are
//!     single columns, and the metric is Euclidean,
//!   - uses the χ² approximation when `auto`, `n > 20`, and no blocks,
//!     and the permutation test otherwise.
//! - The permutation path centers each distance matrix once; every
//!   replication only re-indexes the centered `y` matrix (or, on the fast
//!   path, the raw `y` column).
//!
//! Invariants & assumptions
//! ------------------------
//! - The statistic is `0.0` exactly when either distance variance is
//!   non-positive (e.g. a constant sample).
//! - `Dcorr` is immutable; every call returns a fresh outcome.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover the reference scenarios; end-to-end checks
//!   live in `tests/integration_dcorr.rs`.
use crate::engine::{
    center_distmat, dcov_centered, fast_1d_dcov, normalize, permuted_dcov_centered,
};
use crate::independence::errors::{IndepError, IndepResult};
use crate::independence::outcome::{IndependenceOutcome, TestMethod};
use crate::independence::validation::{check_inputs, check_perm_blocks_dim};
use crate::independence::{IndependenceTest, TestOptions, reps_advisories};
use crate::metrics::{DistanceMetric, compute_dist};
use crate::significance::{PermTree, chi2_approx, perm_test, use_chi2};
use ndarray::ArrayView2;
use tracing::debug;

/// Dcorr — distance correlation independence test.
///
/// Fields
/// ------
/// - `metric`: distance used to build the `n×n` matrices
///   (default Euclidean; `Precomputed` treats inputs as distance
///   matrices).
/// - `bias`: biased (`true`) or unbiased (`false`, default) statistic.
#[derive(Debug, Clone, Default)]
pub struct Dcorr {
    metric: DistanceMetric,
    bias: bool,
}

impl Dcorr {
    pub fn new(metric: DistanceMetric, bias: bool) -> Self {
        Self { metric, bias }
    }

    pub fn metric(&self) -> &DistanceMetric {
        &self.metric
    }

    pub fn bias(&self) -> bool {
        self.bias
    }

    fn uses_fast_path(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, auto: bool) -> bool {
        auto && x.ncols() == 1 && y.ncols() == 1 && self.metric.is_euclidean()
    }

    fn validate(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> IndepResult<()> {
        check_inputs(x, y, self.bias, self.metric.is_precomputed())
    }

    fn quadratic_stat(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> IndepResult<f64> {
        let (distx, disty) = compute_dist(x, y, &self.metric)?;
        Ok(crate::engine::dcorr(distx.view(), disty.view(), self.bias))
    }

    fn fast_stat(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> f64 {
        let xs = x.column(0).to_vec();
        let ys = y.column(0).to_vec();
        crate::engine::fast_1d_dcorr(&xs, &ys, self.bias)
    }

    fn permutation_null(
        &self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, fast: bool, opts: &TestOptions,
    ) -> IndepResult<(f64, crate::significance::PermutationResult)> {
        let n = x.nrows();
        let bias = self.bias;
        let tree = match &opts.perm_blocks {
            Some(blocks) => PermTree::from_blocks(blocks.view()),
            None => PermTree::unrestricted(n),
        };
        let seed = opts.resolve_seed();

        if fast {
            let xs = x.column(0).to_vec();
            let ys = y.column(0).to_vec();
            let varx = fast_1d_dcov(&xs, &xs, bias);
            let vary = fast_1d_dcov(&ys, &ys, bias);
            let observed = normalize(fast_1d_dcov(&xs, &ys, bias), varx, vary);
            let stat_fn = |perm: &[usize]| {
                let permuted: Vec<f64> = perm.iter().map(|&p| ys[p]).collect();
                normalize(fast_1d_dcov(&xs, &permuted, bias), varx, vary)
            };
            let result = perm_test(stat_fn, observed, &tree, opts.reps, opts.workers, seed)?;
            return Ok((observed, result));
        }

        let (distx, disty) = compute_dist(x, y, &self.metric)?;
        let cx = center_distmat(distx.view(), bias);
        let cy = center_distmat(disty.view(), bias);
        let varx = dcov_centered(cx.view(), cx.view(), bias);
        let vary = dcov_centered(cy.view(), cy.view(), bias);
        let observed = normalize(dcov_centered(cx.view(), cy.view(), bias), varx, vary);
        let stat_fn = |perm: &[usize]| {
            normalize(permuted_dcov_centered(cx.view(), cy.view(), perm, bias), varx, vary)
        };
        let result = perm_test(stat_fn, observed, &tree, opts.reps, opts.workers, seed)?;
        Ok((observed, result))
    }
}

impl IndependenceTest for Dcorr {
    /// Distance correlation of `x` and `y`.
    ///
    /// Parameters
    /// ----------
    /// - `x`, `y`: `ArrayView2<f64>`
    ///   `(n, p)` / `(n, q)` samples, or `n×n` distance matrices when the
    ///   metric is `Precomputed`.
    ///
    /// Returns
    /// -------
    /// `IndepResult<f64>`
    ///   Statistic in `[−1, 1]`.
    ///
    /// Errors
    /// ------
    /// - Validation errors from `check_inputs`.
    /// - `IndepError::Metric` if the metric cannot build a finite matrix.
    fn statistic(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> IndepResult<f64> {
        self.validate(x, y)?;
        self.quadratic_stat(x, y)
    }

    /// Statistic and p-value of the Dcorr test.
    ///
    /// Errors
    /// ------
    /// - Validation errors, reported before any statistic is computed.
    /// - `IndepError::PermBlocksDimMismatch` for a block array without one
    ///   row per sample.
    /// - `IndepError::ThreadPool` / `IndepError::NonFiniteStatistic` from
    ///   the significance drivers.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// use ndarray::Array2;
    /// use rust_independence::independence::{Dcorr, IndependenceTest, TestOptions};
    ///
    /// let x = Array2::from_shape_fn((25, 1), |(i, _)| i as f64);
    /// let outcome = Dcorr::default().test(x.view(), x.view(), &TestOptions::default()).unwrap();
    /// assert!((outcome.stat - 1.0).abs() < 1e-9);
    /// assert!(outcome.pvalue < 0.01);
    /// ```
    fn test(
        &self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, opts: &TestOptions,
    ) -> IndepResult<IndependenceOutcome> {
        self.validate(x, y)?;
        let n = x.nrows();
        if let Some(blocks) = &opts.perm_blocks {
            check_perm_blocks_dim(blocks, n)?;
        }
        let advisories = reps_advisories(opts.reps);
        let fast = self.uses_fast_path(x, y, opts.auto);

        if use_chi2(opts.auto, n, opts.perm_blocks.is_some()) {
            debug!(n, fast, "dcorr: chi-squared approximation");
            let (stat, pvalue) = chi2_approx(
                || if fast { Ok(self.fast_stat(x, y)) } else { self.quadratic_stat(x, y) },
                n,
            )?;
            return Ok(IndependenceOutcome {
                stat,
                pvalue,
                null_dist: None,
                method: TestMethod::ChiSquared,
                advisories,
            });
        }

        debug!(n, fast, "dcorr: permutation test");
        let (stat, result) = self.permutation_null(x, y, fast, opts)?;
        if !stat.is_finite() {
            return Err(IndepError::NonFiniteStatistic { value: stat });
        }
        Ok(IndependenceOutcome {
            stat,
            pvalue: result.pvalue,
            null_dist: Some(result.null_dist),
            method: TestMethod::Permutation { reps: opts.reps.get() },
            advisories,
        })
    }
}
