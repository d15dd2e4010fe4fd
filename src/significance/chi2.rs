//! significance::chi2 — moment-matched χ² approximation.
//!
//! The scaled null statistic `n·stat + 1` is matched to a χ² law with one
//! degree of freedom; the p-value is its survival function. No null
//! distribution is produced.
use crate::independence::errors::{IndepError, IndepResult};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::debug;

/// Degrees of freedom of the reference χ² law.
pub const CHI2_DF: f64 = 1.0;

/// `P(χ²₁ ≥ n·stat + 1)`.
///
/// # Arguments
/// - `stat`: observed statistic.
/// - `n`: sample size.
///
/// # Returns
/// p-value in `[0, 1]`.
///
/// # Errors
/// - `IndepError::Distribution` if statrs rejects [`CHI2_DF`].
pub fn chi2_pvalue(stat: f64, n: usize) -> IndepResult<f64> {
    let chi = ChiSquared::new(CHI2_DF)
        .map_err(|e| IndepError::Distribution { reason: e.to_string() })?;
    Ok(chi.sf(n as f64 * stat + 1.0))
}

/// Compute the statistic once and approximate its p-value.
///
/// # Errors
/// - `IndepError::NonFiniteStatistic` when the statistic or p-value is not
///   finite.
/// - `IndepError::Distribution` from [`chi2_pvalue`].
pub fn chi2_approx<F>(stat_fn: F, n: usize) -> IndepResult<(f64, f64)>
where
    F: FnOnce() -> IndepResult<f64>,
{
    let stat = stat_fn()?;
    if !stat.is_finite() {
        return Err(IndepError::NonFiniteStatistic { value: stat });
    }
    let pvalue = chi2_pvalue(stat, n)?;
    if !pvalue.is_finite() {
        return Err(IndepError::NonFiniteStatistic { value: pvalue });
    }
    debug!(n, stat, pvalue, "chi-squared approximation");
    Ok((stat, pvalue))
}
