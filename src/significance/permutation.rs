//! significance::permutation — permutation test driver.
//!
//! Purpose
//! -------
//! Estimate a p-value by recomputing a statistic under `reps` admissible
//! permutations of one sample and comparing against the observed value.
//!
//! Key behaviors
//! -------------
//! - Replication `i` draws its permutation from
//!   `ChaCha8Rng::seed_from_u64(counter_seed(seed, i))`, so the null
//!   distribution for a given seed does not depend on the worker count
//!   or on scheduling.
//! - `Workers::Sequential` runs on the calling thread; otherwise a
//!   dedicated rayon pool of the requested size runs the replications.
//! - `pvalue = (1 + #{null ≥ observed}) / (1 + reps)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The statistic closure is pure: it depends only on the permutation it
//!   receives.
//! - Any non-finite null statistic aborts the test.
use crate::independence::errors::{IndepError, IndepResult};
use crate::independence::options::{Reps, Workers};
use crate::significance::blocks::PermTree;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

/// Result of a permutation test.
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationResult {
    pub pvalue: f64,
    pub null_dist: Vec<f64>,
}

/// Derive a well-mixed per-replication seed (SplitMix64 finalizer).
pub fn counter_seed(base: u64, index: u64) -> u64 {
    let mut z = base ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// `(1 + #{null ≥ observed}) / (1 + reps)`.
pub fn perm_pvalue(observed: f64, null_dist: &[f64]) -> f64 {
    let exceed = null_dist.iter().filter(|&&v| v >= observed).count();
    (1 + exceed) as f64 / (1 + null_dist.len()) as f64
}

/// Run a permutation test.
///
/// Parameters
/// ----------
/// - `stat_fn`: `Fn(&[usize]) -> f64 + Sync`
///   Statistic evaluated with `y` reordered by the permutation
///   (`perm[i]` is the source row for position `i`).
/// - `observed`: `f64`
///   Statistic on the unpermuted data.
/// - `tree`: `&PermTree`
///   Admissible permutations.
/// - `reps`, `workers`: validated replication count and parallelism.
/// - `seed`: `u64`
///   Base seed; replication seeds are derived with [`counter_seed`].
///
/// Returns
/// -------
/// `IndepResult<PermutationResult>`
///   p-value and the full null distribution (length `reps`).
///
/// Errors
/// ------
/// - `IndepError::ThreadPool` if the worker pool cannot be built.
/// - `IndepError::NonFiniteStatistic` if a null statistic is NaN or ±∞.
pub fn perm_test<F>(
    stat_fn: F, observed: f64, tree: &PermTree, reps: Reps, workers: Workers, seed: u64,
) -> IndepResult<PermutationResult>
where
    F: Fn(&[usize]) -> f64 + Sync,
{
    let reps = reps.get();
    let threads = workers.threads();
    debug!(reps, threads, n = tree.len(), "running permutation test");

    let trial = |i: usize| {
        let mut rng = ChaCha8Rng::seed_from_u64(counter_seed(seed, i as u64));
        let perm = tree.permutation(&mut rng);
        stat_fn(&perm)
    };

    let null_dist: Vec<f64> = if threads <= 1 {
        (0..reps).map(&trial).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| IndepError::ThreadPool { reason: e.to_string() })?;
        pool.install(|| (0..reps).into_par_iter().map(&trial).collect())
    };

    if let Some(&value) = null_dist.iter().find(|v| !v.is_finite()) {
        return Err(IndepError::NonFiniteStatistic { value });
    }
    let pvalue = perm_pvalue(observed, &null_dist);
    Ok(PermutationResult { pvalue, null_dist })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - p-value formula and bounds.
    // - Reproducibility across worker counts.
    // - Seed mixing.
    // -------------------------------------------------------------------------

    #[test]
    fn perm_pvalue_bounds() {
        let null = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(perm_pvalue(1.0, &null), 1.0 / 5.0);
        assert_eq!(perm_pvalue(0.0, &null), 1.0);
        assert_eq!(perm_pvalue(0.25, &null), 3.0 / 5.0);
    }

    #[test]
    fn counter_seed_separates_indices_and_bases() {
        assert_ne!(counter_seed(0, 0), counter_seed(0, 1));
        assert_ne!(counter_seed(0, 0), counter_seed(1, 0));
        assert_eq!(counter_seed(42, 9), counter_seed(42, 9));
    }

    #[test]
    // Purpose
    // -------
    // The null distribution for a fixed seed is identical whether the
    // replications run sequentially or on a pool.
    //
    // Given
    // -----
    // - A statistic that depends on the permutation order.
    //
    // Expect
    // ------
    // - Bitwise equal null distributions and p-values for 1, 3 and all
    //   workers.
    fn perm_test_is_worker_invariant() {
        // Arrange
        let y: Vec<f64> = (0..15).map(|i| (i as f64 * 0.7).sin()).collect();
        let stat =
            |perm: &[usize]| perm.iter().enumerate().map(|(i, &p)| i as f64 * y[p]).sum::<f64>();
        let identity: Vec<usize> = (0..15).collect();
        let observed = stat(identity.as_slice());
        let tree = PermTree::unrestricted(15);
        let reps = Reps::new(200).unwrap();

        // Act
        let seq = perm_test(stat, observed, &tree, reps, Workers::Sequential, 5).unwrap();
        let three = perm_test(stat, observed, &tree, reps, Workers::Threads(3), 5).unwrap();
        let all = perm_test(stat, observed, &tree, reps, Workers::AllCores, 5).unwrap();

        // Assert
        assert_eq!(seq, three);
        assert_eq!(seq, all);
        assert_eq!(seq.null_dist.len(), 200);
        assert!(seq.pvalue >= 1.0 / 201.0 && seq.pvalue <= 1.0);
    }

    #[test]
    fn perm_test_rejects_non_finite_null() {
        let tree = PermTree::unrestricted(5);
        let err = perm_test(|_| f64::NAN, 0.0, &tree, Reps::new(3).unwrap(), Workers::Sequential, 1)
            .unwrap_err();
        assert!(matches!(err, IndepError::NonFiniteStatistic { .. }));
    }
}
