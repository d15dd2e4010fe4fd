//! Kernel similarity matrices for Hsic.
//!
//! This module provides:
//! - A `KernelMetric` enum (Gaussian/RBF, Laplacian, linear, polynomial,
//!   sigmoid, cosine, plus `Precomputed` and `Custom`).
//! - A median-heuristic bandwidth for the Gaussian kernel:
//!   `γ = 1 / (2·med²)`, where `med` is the median off-diagonal Euclidean
//!   distance (replaced by 1 when it is zero, e.g. on label vectors).
//! - `kernel_to_distance`, the rescaling `D = 1 − K / max(K)` that lets the
//!   distance-covariance machinery consume kernel matrices.
//!
//! Conventions:
//! - Optional `gamma` parameters default to the median heuristic (Gaussian)
//!   or to `1 / p` (Laplacian, polynomial, sigmoid), `p` = feature count.
use crate::metrics::{
    distance::{CustomMetricFn, ensure_finite, sq_euclidean},
    errors::{MetricError, MetricResult},
};
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::{fmt, str::FromStr, sync::Arc};

/// Kernel family used to build `n×n` similarity matrices.
#[derive(Clone)]
pub enum KernelMetric {
    Gaussian { gamma: Option<f64> },
    Laplacian { gamma: Option<f64> },
    Linear,
    Polynomial { degree: u32, gamma: Option<f64>, coef0: f64 },
    Sigmoid { gamma: Option<f64>, coef0: f64 },
    Cosine,
    Precomputed,
    Custom(CustomMetricFn),
}

impl fmt::Debug for KernelMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelMetric::Gaussian { gamma } => write!(f, "Gaussian {{ gamma: {gamma:?} }}"),
            KernelMetric::Laplacian { gamma } => write!(f, "Laplacian {{ gamma: {gamma:?} }}"),
            KernelMetric::Linear => write!(f, "Linear"),
            KernelMetric::Polynomial { degree, gamma, coef0 } => write!(
                f,
                "Polynomial {{ degree: {degree}, gamma: {gamma:?}, coef0: {coef0} }}"
            ),
            KernelMetric::Sigmoid { gamma, coef0 } => {
                write!(f, "Sigmoid {{ gamma: {gamma:?}, coef0: {coef0} }}")
            }
            KernelMetric::Cosine => write!(f, "Cosine"),
            KernelMetric::Precomputed => write!(f, "Precomputed"),
            KernelMetric::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

impl Default for KernelMetric {
    fn default() -> Self {
        KernelMetric::Gaussian { gamma: None }
    }
}

impl FromStr for KernelMetric {
    type Err = MetricError;

    /// Parse a kernel name (case-insensitive) with default parameters.
    ///
    /// Accepts `gaussian`/`rbf`, `laplacian`, `linear`, `polynomial`/`poly`
    /// (degree 3, coef0 1), `sigmoid` (coef0 1), `cosine`, and
    /// `precomputed`/`none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gaussian" | "rbf" => Ok(KernelMetric::Gaussian { gamma: None }),
            "laplacian" => Ok(KernelMetric::Laplacian { gamma: None }),
            "linear" => Ok(KernelMetric::Linear),
            "polynomial" | "poly" => {
                Ok(KernelMetric::Polynomial { degree: 3, gamma: None, coef0: 1.0 })
            }
            "sigmoid" => Ok(KernelMetric::Sigmoid { gamma: None, coef0: 1.0 }),
            "cosine" => Ok(KernelMetric::Cosine),
            "precomputed" | "none" => Ok(KernelMetric::Precomputed),
            other => Err(MetricError::UnknownMetric { name: other.to_string() }),
        }
    }
}

impl KernelMetric {
    /// Gaussian kernel with a fixed bandwidth; requires finite `gamma > 0`.
    pub fn gaussian(gamma: f64) -> MetricResult<Self> {
        Ok(KernelMetric::Gaussian { gamma: Some(check_gamma(gamma)?) })
    }

    /// Laplacian kernel `exp(−γ‖a − b‖₁)`; requires finite `gamma > 0`.
    pub fn laplacian(gamma: f64) -> MetricResult<Self> {
        Ok(KernelMetric::Laplacian { gamma: Some(check_gamma(gamma)?) })
    }

    /// Polynomial kernel `(γ⟨a, b⟩ + c₀)^d`; requires `degree ≥ 1`.
    pub fn polynomial(degree: u32, gamma: Option<f64>, coef0: f64) -> MetricResult<Self> {
        if degree == 0 {
            return Err(MetricError::InvalidParameter {
                name: "degree",
                value: 0.0,
                reason: "polynomial degree must be >= 1",
            });
        }
        let gamma = gamma.map(check_gamma).transpose()?;
        Ok(KernelMetric::Polynomial { degree, gamma, coef0 })
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(ArrayView2<'_, f64>) -> Array2<f64> + Send + Sync + 'static,
    {
        let infallible =
            move |x: ArrayView2<'_, f64>| -> MetricResult<Array2<f64>> { Ok(f(x)) };
        KernelMetric::Custom(Arc::new(infallible))
    }

    /// Fallible counterpart of [`custom`](Self::custom); errors propagate
    /// out of [`similarity`](Self::similarity) unchanged.
    pub fn try_custom<F>(f: F) -> Self
    where
        F: Fn(ArrayView2<'_, f64>) -> MetricResult<Array2<f64>> + Send + Sync + 'static,
    {
        KernelMetric::Custom(Arc::new(f))
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, KernelMetric::Precomputed)
    }

    /// Build the `n×n` kernel matrix of an `n×p` sample matrix.
    ///
    /// # Errors
    /// - Any error returned by a fallible custom kernel.
    /// - `MetricError::InvalidCustomOutput` for a mis-shaped custom output.
    /// - `MetricError::NonFiniteOutput` when any entry is NaN/±∞.
    pub fn similarity(&self, x: ArrayView2<'_, f64>) -> MetricResult<Array2<f64>> {
        let n = x.nrows();
        let default_gamma = 1.0 / x.ncols().max(1) as f64;
        let kern = match self {
            KernelMetric::Precomputed => x.to_owned(),
            KernelMetric::Custom(f) => {
                let out = f(x)?;
                if out.dim() != (n, n) {
                    let (rows, cols) = out.dim();
                    return Err(MetricError::InvalidCustomOutput { rows, cols, expected: n });
                }
                out
            }
            KernelMetric::Gaussian { gamma } => {
                let gamma = gamma.unwrap_or_else(|| median_heuristic_gamma(x));
                symmetric_fill(x, |a, b| (-gamma * sq_euclidean(a, b)).exp())
            }
            KernelMetric::Laplacian { gamma } => {
                let gamma = gamma.unwrap_or(default_gamma);
                symmetric_fill(x, |a, b| {
                    (-gamma * a.iter().zip(b).map(|(u, v)| (u - v).abs()).sum::<f64>()).exp()
                })
            }
            KernelMetric::Linear => symmetric_fill(x, |a, b| a.dot(&b)),
            KernelMetric::Polynomial { degree, gamma, coef0 } => {
                let gamma = gamma.unwrap_or(default_gamma);
                symmetric_fill(x, |a, b| (gamma * a.dot(&b) + coef0).powi(*degree as i32))
            }
            KernelMetric::Sigmoid { gamma, coef0 } => {
                let gamma = gamma.unwrap_or(default_gamma);
                symmetric_fill(x, |a, b| (gamma * a.dot(&b) + coef0).tanh())
            }
            KernelMetric::Cosine => {
                symmetric_fill(x, |a, b| a.dot(&b) / (a.dot(&a).sqrt() * b.dot(&b).sqrt()))
            }
        };
        ensure_finite(&kern)?;
        Ok(kern)
    }
}

/// Build the kernel matrices `(Kx, Ky)` for a pair of samples.
pub fn compute_kern(
    x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, metric: &KernelMetric,
) -> MetricResult<(Array2<f64>, Array2<f64>)> {
    Ok((metric.similarity(x)?, metric.similarity(y)?))
}

/// Rescale a kernel matrix into a distance-like matrix `1 − K / max(K)`.
///
/// # Errors
/// - `MetricError::NonPositiveKernelMax` if `max(K) ≤ 0`, where the
///   rescaling is undefined.
pub fn kernel_to_distance(kern: &Array2<f64>) -> MetricResult<Array2<f64>> {
    let max = kern.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > 0.0) {
        return Err(MetricError::NonPositiveKernelMax { value: max });
    }
    Ok(kern.mapv(|k| 1.0 - k / max))
}

/// Median-heuristic bandwidth `γ = 1 / (2·med²)` over off-diagonal
/// Euclidean distances; `med` falls back to 1 when zero or undefined.
pub fn median_heuristic_gamma(x: ArrayView2<'_, f64>) -> f64 {
    let n = x.nrows();
    let mut dists = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            dists.push(sq_euclidean(x.row(i), x.row(j)).sqrt());
        }
    }
    let med = match median(&mut dists) {
        Some(m) if m > 0.0 => m,
        _ => 1.0,
    };
    1.0 / (2.0 * med * med)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some(0.5 * (values[mid - 1] + values[mid]))
    } else {
        Some(values[mid])
    }
}

fn check_gamma(gamma: f64) -> MetricResult<f64> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(gamma)
    } else {
        Err(MetricError::InvalidParameter {
            name: "gamma",
            value: gamma,
            reason: "gamma must be finite and > 0",
        })
    }
}

fn symmetric_fill<F>(x: ArrayView2<'_, f64>, kernel: F) -> Array2<f64>
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64,
{
    let n = x.nrows();
    let mut out = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let k = kernel(x.row(i), x.row(j));
            out[[i, j]] = k;
            out[[j, i]] = k;
        }
    }
    out
}
