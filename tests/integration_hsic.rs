//! Integration tests for the Hilbert–Schmidt independence criterion.
//!
//! Purpose
//! -------
//! - Exercise `Hsic` end to end with built-in, precomputed and custom
//!   kernels, under both significance strategies.
//! - Check that block-restricted permutations drive strategy selection
//!   and produce reproducible nulls.
//!
//! Coverage
//! --------
//! - `independence::Hsic` via the `IndependenceTest` trait.
//! - `metrics::{KernelMetric, compute_kern, kernel_to_distance}`.
//! - `significance::PermTree` through `TestOptions::perm_blocks`.
//! - Reference values for a perfectly dependent ramp and for constant
//!   precomputed matrices.
//!
//! Exclusions
//! ----------
//! - Kernel formulas in isolation; `metrics::kernel` unit tests own those.
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_independence::{
    independence::{Hsic, IndependenceTest, TestMethod, TestOptions, as_column},
    metrics::{KernelMetric, compute_kern, kernel_to_distance},
    significance::PermTree,
};

/// Uniform `(n, p)` sample from a seeded ChaCha stream.
fn uniform(n: usize, p: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((n, p), |_| rng.gen_range(-1.0..1.0))
}

fn options(reps: i64, workers: i64, auto: bool, seed: u64) -> TestOptions {
    TestOptions::new(Some(reps), Some(workers), Some(auto), None, Some(seed)).unwrap()
}

#[test]
// Purpose
// -------
// Hsic is symmetric up to rounding and vanishes on constant samples.
fn hsic_symmetry_and_degeneracy() {
    // Arrange
    let x = uniform(30, 2, 1);
    let y = x.mapv(|v| v.sin()) + uniform(30, 2, 2) * 0.2;
    let constant = Array2::<f64>::from_elem((30, 1), -3.0);

    for bias in [false, true] {
        let hsic = Hsic::new(KernelMetric::default(), bias);

        // Act
        let xy = hsic.statistic(x.view(), y.view()).unwrap();
        let yx = hsic.statistic(y.view(), x.view()).unwrap();
        let flat = hsic.statistic(x.view(), constant.view()).unwrap();

        // Assert
        assert!((xy - yx).abs() <= 1e-12 * xy.abs().max(1.0), "bias={bias}: {xy} vs {yx}");
        assert_eq!(flat, 0.0);
    }
}

#[test]
// Purpose
// -------
// Supplying `1 − K / max(K)` as precomputed input reproduces the
// built-in kernel statistic for several kernels.
fn hsic_precomputed_matches_builtin_kernels() {
    let x = uniform(12, 3, 5);
    let y = uniform(12, 2, 6);
    for metric in [
        KernelMetric::default(),
        "laplacian".parse().unwrap(),
        KernelMetric::gaussian(0.5).unwrap(),
    ] {
        let (kx, ky) = compute_kern(x.view(), y.view(), &metric).unwrap();
        let dx = kernel_to_distance(&kx).unwrap();
        let dy = kernel_to_distance(&ky).unwrap();

        let direct = Hsic::new(metric, false).statistic(x.view(), y.view()).unwrap();
        let pre = Hsic::new(KernelMetric::Precomputed, false)
            .statistic(dx.view(), dy.view())
            .unwrap();

        assert!((direct - pre).abs() < 1e-12, "{direct} vs {pre}");
    }
}

#[test]
// Purpose
// -------
// Custom kernels run through the same pipeline as built-in ones.
fn hsic_custom_kernel_matches_linear() {
    let x = uniform(10, 2, 7);
    let y = x.mapv(|v| 2.0 * v + 0.5);
    let custom = KernelMetric::custom(|v| v.dot(&v.t()));

    let linear = Hsic::new(KernelMetric::Linear, true).statistic(x.view(), y.view()).unwrap();
    let via_custom = Hsic::new(custom, true).statistic(x.view(), y.view()).unwrap();

    assert!((linear - via_custom).abs() < 1e-12, "{linear} vs {via_custom}");
}

#[test]
// Purpose
// -------
// Seeded Hsic permutation tests are reproducible and independent of the
// worker count.
fn hsic_outcome_is_worker_invariant() {
    // Arrange
    let x = uniform(15, 2, 11);
    let y = uniform(15, 1, 12);
    let hsic = Hsic::default();

    // Act
    let first = hsic.test(x.view(), y.view(), &options(250, 1, true, 3)).unwrap();
    let again = hsic.test(x.view(), y.view(), &options(250, 1, true, 3)).unwrap();
    let pooled = hsic.test(x.view(), y.view(), &options(250, 3, true, 3)).unwrap();

    // Assert
    assert_eq!(first, again);
    assert_eq!(first, pooled);
    assert!(first.pvalue >= 1.0 / 251.0 && first.pvalue <= 1.0);
}

#[test]
// Purpose
// -------
// Supplying blocks forces the permutation strategy even when n ≥ 20 and
// `auto` is set.
//
// Given
// -----
// - n = 24 samples split into three exchangeable blocks of eight.
//
// Expect
// ------
// - A permutation outcome with `reps` null values.
// - The tree yields permutations that move whole blocks only.
fn hsic_blocks_force_permutation_strategy() {
    // Arrange
    let labels: Vec<i64> = (0..24).map(|i| (i / 8) as i64).collect();
    let blocks = Array2::from_shape_vec((24, 1), labels).unwrap();
    let x = uniform(24, 1, 21);
    let y = x.mapv(|v| v * v);
    let opts = TestOptions { perm_blocks: Some(blocks.clone()), ..options(300, 1, true, 4) };

    // Act
    let outcome = Hsic::default().test(x.view(), y.view(), &opts).unwrap();
    let tree = PermTree::from_blocks(blocks.view());
    let perm = tree.permutation(&mut ChaCha8Rng::seed_from_u64(0));

    // Assert
    assert_eq!(outcome.method, TestMethod::Permutation { reps: 300 });
    assert_eq!(outcome.null_dist.map(|d| d.len()), Some(300));
    for chunk in perm.chunks(8) {
        assert!(chunk.iter().all(|&drawn| drawn / 8 == chunk[0] / 8), "{perm:?}");
    }
}

#[test]
// Purpose
// -------
// Large samples without blocks use the χ² approximation and report no
// null distribution.
fn hsic_large_sample_uses_chi_squared() {
    let x = uniform(60, 1, 31);
    let y = x.mapv(f64::cos);

    let outcome = Hsic::default().test(x.view(), y.view(), &TestOptions::default()).unwrap();

    assert_eq!(outcome.method, TestMethod::ChiSquared);
    assert!(outcome.null_dist.is_none());
    assert!(outcome.advisories.is_empty());
    assert!(outcome.pvalue > 0.0 && outcome.pvalue <= 1.0);
}

#[test]
// Purpose
// -------
// Pin the reference value for a perfectly dependent small sample.
//
// Given
// -----
// - x = y = 0, 1, …, 6 with the default Gaussian kernel, 1000 seeded reps.
//
// Expect
// ------
// - n < 20, so the permutation strategy runs on the raw kernels.
// - stat ≈ 0.1532 (prints as 0.2 to one decimal) and pvalue < 0.01.
fn hsic_reference_ramp_is_strongly_dependent() {
    // Arrange
    let ramp: Vec<f64> = (0..7).map(f64::from).collect();
    let x = as_column(&ramp);

    // Act
    let outcome = Hsic::default().test(x.view(), x.view(), &options(1000, 1, true, 17)).unwrap();

    // Assert
    assert_eq!(outcome.method, TestMethod::Permutation { reps: 1000 });
    assert!((outcome.stat - 0.1532).abs() < 1e-3, "stat = {}", outcome.stat);
    assert_eq!(format!("{:.1}", outcome.stat), "0.2");
    assert!(outcome.pvalue < 0.01, "pvalue = {}", outcome.pvalue);
}

#[test]
// Purpose
// -------
// Constant off-diagonal precomputed matrices carry no signal.
//
// Given
// -----
// - x = ones(10, 10) − I and y = 2x, passed as precomputed kernels.
//
// Expect
// ------
// - U-centering annihilates both matrices, so stat = 0.
// - Every null value ties the observed one, so pvalue = 1.
fn hsic_reference_constant_precomputed_is_null() {
    // Arrange
    let x = Array2::<f64>::ones((10, 10)) - Array2::<f64>::eye(10);
    let y = x.mapv(|v| 2.0 * v);
    let hsic = Hsic::new(KernelMetric::Precomputed, false);

    // Act
    let outcome = hsic.test(x.view(), y.view(), &options(1000, 1, true, 5)).unwrap();

    // Assert
    assert_eq!(outcome.method, TestMethod::Permutation { reps: 1000 });
    assert_eq!(outcome.stat, 0.0);
    assert_eq!(outcome.pvalue, 1.0);
    assert!(outcome.null_dist.unwrap().iter().all(|&v| v == 0.0));
}
