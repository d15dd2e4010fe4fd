//! significance — turning a statistic into a calibrated p-value.
//!
//! Purpose
//! -------
//! Provide the two strategies used by the independence tests:
//! permutation testing (optionally restricted by exchangeability blocks
//! and parallelized over a rayon pool) and the χ²₁ moment approximation.
//!
//! Key behaviors
//! -------------
//! - [`perm_test`] / [`perm_pvalue`]: permutation null and p-value.
//! - [`PermTree`]: admissible permutations under nested block labels.
//! - [`chi2_approx`] / [`chi2_pvalue`]: closed-form approximation.
//! - [`use_chi2`]: the strategy rule shared by every test.
//!
//! Conventions
//! -----------
//! - The χ² approximation is chosen only when `auto` is set, `n > 20`,
//!   and no permutation blocks are given.

pub mod blocks;
pub mod chi2;
pub mod permutation;

pub use self::blocks::PermTree;
pub use self::chi2::{chi2_approx, chi2_pvalue};
pub use self::permutation::{PermutationResult, counter_seed, perm_pvalue, perm_test};

/// Sample size above which `auto` switches to the χ² approximation.
pub const CHI2_MIN_SAMPLES: usize = 20;

/// `true` when the χ² approximation should replace permutation.
pub fn use_chi2(auto: bool, n: usize, has_blocks: bool) -> bool {
    auto && n > CHI2_MIN_SAMPLES && !has_blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_chi2_requires_auto_large_n_and_no_blocks() {
        assert!(use_chi2(true, 21, false));
        assert!(!use_chi2(true, 20, false));
        assert!(!use_chi2(false, 100, false));
        assert!(!use_chi2(true, 100, true));
    }
}
