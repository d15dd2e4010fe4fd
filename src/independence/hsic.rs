//! independence::hsic — Hilbert–Schmidt independence criterion.
//!
//! Purpose
//! -------
//! Kernel analogue of the distance correlation test. Samples are mapped to
//! kernel matrices, turned into distance-like matrices, and the
//! (un-normalized) distance covariance is computed through the trace form.
//!
//! Key behaviors
//! -------------
//! - `statistic` and the χ² path rescale crate-built kernels to
//!   `D = 1 − K / max(K)` before centering.
//! - The permutation path centers the raw kernel matrices `K`. Under
//!   U-centering the two differ because `D` has a zero diagonal.
//! - `Precomputed` matrices are used as supplied on every path.
//! - The statistic is `trace(Cx · Cy) / denom` with the same biased /
//!   unbiased conventions as Dcorr.
//! - Strategy selection and permutation blocks follow Dcorr exactly.
//!
//! Invariants & assumptions
//! ------------------------
//! - Kernel construction failures (non-positive maximum, non-finite
//!   entries, invalid bandwidth) surface as `IndepError::Metric`.
use crate::engine::{center_distmat, permuted_trace_product, trace_product};
use crate::independence::errors::{IndepError, IndepResult};
use crate::independence::outcome::{IndependenceOutcome, TestMethod};
use crate::independence::validation::{check_inputs, check_perm_blocks_dim};
use crate::independence::{IndependenceTest, TestOptions, reps_advisories};
use crate::metrics::{KernelMetric, compute_kern, kernel_to_distance};
use crate::significance::{PermTree, chi2_approx, perm_test, use_chi2};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

/// Hsic — kernel independence test.
///
/// - `metric`: kernel used to build similarity matrices (default Gaussian
///   with the median-heuristic bandwidth).
/// - `bias`: biased (`true`) or unbiased (`false`, default) statistic.
#[derive(Debug, Clone, Default)]
pub struct Hsic {
    metric: KernelMetric,
    bias: bool,
}

impl Hsic {
    pub fn new(metric: KernelMetric, bias: bool) -> Self {
        Self { metric, bias }
    }

    pub fn metric(&self) -> &KernelMetric {
        &self.metric
    }

    pub fn bias(&self) -> bool {
        self.bias
    }

    /// Distance-like matrices the statistic is computed from.
    fn distance_matrices(
        &self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>,
    ) -> IndepResult<(Array2<f64>, Array2<f64>)> {
        if self.metric.is_precomputed() {
            return Ok((x.to_owned(), y.to_owned()));
        }
        let (kernx, kerny) = compute_kern(x, y, &self.metric)?;
        Ok((kernel_to_distance(&kernx)?, kernel_to_distance(&kerny)?))
    }

    /// Matrices scored by the permutation path: raw kernels, or the
    /// precomputed inputs.
    fn kernel_matrices(
        &self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>,
    ) -> IndepResult<(Array2<f64>, Array2<f64>)> {
        if self.metric.is_precomputed() {
            return Ok((x.to_owned(), y.to_owned()));
        }
        Ok(compute_kern(x, y, &self.metric)?)
    }

    fn raw_stat(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> IndepResult<f64> {
        let (distx, disty) = self.distance_matrices(x, y)?;
        let cx = center_distmat(distx.view(), self.bias);
        let cy = center_distmat(disty.view(), self.bias);
        Ok(trace_product(cx.view(), cy.view(), self.bias))
    }
}

impl IndependenceTest for Hsic {
    fn statistic(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> IndepResult<f64> {
        check_inputs(x, y, self.bias, self.metric.is_precomputed())?;
        self.raw_stat(x, y)
    }

    fn test(
        &self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, opts: &TestOptions,
    ) -> IndepResult<IndependenceOutcome> {
        check_inputs(x, y, self.bias, self.metric.is_precomputed())?;
        let n = x.nrows();
        if let Some(blocks) = &opts.perm_blocks {
            check_perm_blocks_dim(blocks, n)?;
        }
        let advisories = reps_advisories(opts.reps);

        if use_chi2(opts.auto, n, opts.perm_blocks.is_some()) {
            debug!(n, "hsic: chi-squared approximation");
            let (stat, pvalue) = chi2_approx(|| self.raw_stat(x, y), n)?;
            return Ok(IndependenceOutcome {
                stat,
                pvalue,
                null_dist: None,
                method: TestMethod::ChiSquared,
                advisories,
            });
        }

        debug!(n, "hsic: permutation test");
        let bias = self.bias;
        let (kernx, kerny) = self.kernel_matrices(x, y)?;
        let cx = center_distmat(kernx.view(), bias);
        let cy = center_distmat(kerny.view(), bias);
        let stat = trace_product(cx.view(), cy.view(), bias);
        if !stat.is_finite() {
            return Err(IndepError::NonFiniteStatistic { value: stat });
        }
        let tree = match &opts.perm_blocks {
            Some(blocks) => PermTree::from_blocks(blocks.view()),
            None => PermTree::unrestricted(n),
        };
        let stat_fn = |perm: &[usize]| permuted_trace_product(cx.view(), cy.view(), perm, bias);
        let result =
            perm_test(stat_fn, stat, &tree, opts.reps, opts.workers, opts.resolve_seed())?;

        Ok(IndependenceOutcome {
            stat,
            pvalue: result.pvalue,
            null_dist: Some(result.null_dist),
            method: TestMethod::Permutation { reps: opts.reps.get() },
            advisories,
        })
    }
}
