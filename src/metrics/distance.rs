//! Pairwise distance metrics for sample matrices.
//!
//! This module provides:
//! - A `DistanceMetric` enum with the common Minkowski-family, angular and
//!   ratio distances, a `Precomputed` passthrough, and a `Custom` variant
//!   wrapping a user callable.
//! - `pairwise`, which turns an `n×p` sample matrix into a symmetric `n×n`
//!   distance matrix with a zero diagonal.
//! - `compute_dist`, which builds the pair `(Dx, Dy)` consumed by Dcorr.
//!
//! Conventions:
//! - Input matrices are `n×p` (rows = observations, cols = features).
//! - Names are resolved once via `FromStr` (case-insensitive); the hot loop
//!   dispatches on the enum, never on strings.
use crate::metrics::errors::{MetricError, MetricResult};
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::{fmt, str::FromStr, sync::Arc};

/// User-supplied pairwise metric: maps an `n×p` sample matrix to an `n×n`
/// matrix, or reports why it could not. Shared across worker threads,
/// hence `Send + Sync`.
pub type CustomMetricFn =
    Arc<dyn Fn(ArrayView2<'_, f64>) -> MetricResult<Array2<f64>> + Send + Sync>;

/// Distance family used to build `n×n` distance matrices.
///
/// - `Euclidean`: ℓ₂ norm of the difference (the only metric eligible for
///   the O(n log n) univariate engine).
/// - `SqEuclidean`: squared ℓ₂ norm.
/// - `Manhattan`: ℓ₁ norm (a.k.a. cityblock).
/// - `Chebyshev`: ℓ∞ norm.
/// - `Minkowski { p }`: ℓₚ norm, `p ≥ 1`.
/// - `Cosine`: `1 − ⟨a, b⟩ / (‖a‖‖b‖)`.
/// - `Correlation`: cosine distance of the row-centered vectors.
/// - `Canberra`: `Σ |aₖ − bₖ| / (|aₖ| + |bₖ|)`, with `0/0 = 0`.
/// - `BrayCurtis`: `Σ |aₖ − bₖ| / Σ |aₖ + bₖ|`.
/// - `Precomputed`: inputs already are distance matrices.
/// - `Custom(f)`: `f(x)` returns the distance matrix.
#[derive(Clone)]
pub enum DistanceMetric {
    Euclidean,
    SqEuclidean,
    Manhattan,
    Chebyshev,
    Minkowski { p: f64 },
    Cosine,
    Correlation,
    Canberra,
    BrayCurtis,
    Precomputed,
    Custom(CustomMetricFn),
}

impl fmt::Debug for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => write!(f, "Euclidean"),
            DistanceMetric::SqEuclidean => write!(f, "SqEuclidean"),
            DistanceMetric::Manhattan => write!(f, "Manhattan"),
            DistanceMetric::Chebyshev => write!(f, "Chebyshev"),
            DistanceMetric::Minkowski { p } => write!(f, "Minkowski {{ p: {p} }}"),
            DistanceMetric::Cosine => write!(f, "Cosine"),
            DistanceMetric::Correlation => write!(f, "Correlation"),
            DistanceMetric::Canberra => write!(f, "Canberra"),
            DistanceMetric::BrayCurtis => write!(f, "BrayCurtis"),
            DistanceMetric::Precomputed => write!(f, "Precomputed"),
            DistanceMetric::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

impl Default for DistanceMetric {
    fn default() -> Self {
        DistanceMetric::Euclidean
    }
}

impl FromStr for DistanceMetric {
    type Err = MetricError;

    /// Parse a distance name (case-insensitive).
    ///
    /// Accepts `euclidean`/`l2`, `sqeuclidean`, `manhattan`/`cityblock`/`l1`,
    /// `chebyshev`, `minkowski` (p = 2), `cosine`, `correlation`, `canberra`,
    /// `braycurtis`, and `precomputed`/`none`. Anything else is
    /// `MetricError::UnknownMetric`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "sqeuclidean" => Ok(DistanceMetric::SqEuclidean),
            "manhattan" | "cityblock" | "l1" => Ok(DistanceMetric::Manhattan),
            "chebyshev" => Ok(DistanceMetric::Chebyshev),
            "minkowski" => Ok(DistanceMetric::Minkowski { p: 2.0 }),
            "cosine" => Ok(DistanceMetric::Cosine),
            "correlation" => Ok(DistanceMetric::Correlation),
            "canberra" => Ok(DistanceMetric::Canberra),
            "braycurtis" => Ok(DistanceMetric::BrayCurtis),
            "precomputed" | "none" => Ok(DistanceMetric::Precomputed),
            other => Err(MetricError::UnknownMetric { name: other.to_string() }),
        }
    }
}

impl DistanceMetric {
    /// Minkowski distance of order `p`; requires finite `p ≥ 1`.
    pub fn minkowski(p: f64) -> MetricResult<Self> {
        if !p.is_finite() || p < 1.0 {
            return Err(MetricError::InvalidParameter {
                name: "p",
                value: p,
                reason: "Minkowski order must be finite and >= 1",
            });
        }
        Ok(DistanceMetric::Minkowski { p })
    }

    /// Wrap an infallible user callable `f(x) -> D`.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(ArrayView2<'_, f64>) -> Array2<f64> + Send + Sync + 'static,
    {
        let infallible =
            move |x: ArrayView2<'_, f64>| -> MetricResult<Array2<f64>> { Ok(f(x)) };
        DistanceMetric::Custom(Arc::new(infallible))
    }

    /// Wrap a fallible user callable. Its error is returned unchanged by
    /// [`pairwise`](Self::pairwise); use `MetricError::CustomFailed` to
    /// carry the callable's own message.
    pub fn try_custom<F>(f: F) -> Self
    where
        F: Fn(ArrayView2<'_, f64>) -> MetricResult<Array2<f64>> + Send + Sync + 'static,
    {
        DistanceMetric::Custom(Arc::new(f))
    }

    pub fn is_euclidean(&self) -> bool {
        matches!(self, DistanceMetric::Euclidean)
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, DistanceMetric::Precomputed)
    }

    /// Distance between two feature vectors of equal length.
    ///
    /// # Returns
    /// `Some(d)` for builtins, where `d` may be NaN for angular metrics on
    /// zero vectors (which [`pairwise`](Self::pairwise) reports as an
    /// error). `None` for `Precomputed` and `Custom`, which have no
    /// row-level definition.
    pub fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Option<f64> {
        let d = match self {
            DistanceMetric::Euclidean => sq_euclidean(a, b).sqrt(),
            DistanceMetric::SqEuclidean => sq_euclidean(a, b),
            DistanceMetric::Manhattan => a.iter().zip(b).map(|(u, v)| (u - v).abs()).sum(),
            DistanceMetric::Chebyshev => {
                a.iter().zip(b).map(|(u, v)| (u - v).abs()).fold(0.0, f64::max)
            }
            DistanceMetric::Minkowski { p } => a
                .iter()
                .zip(b)
                .map(|(u, v)| (u - v).abs().powf(*p))
                .sum::<f64>()
                .powf(1.0 / p),
            DistanceMetric::Cosine => cosine_distance(a.iter().copied(), b.iter().copied()),
            DistanceMetric::Correlation => {
                let mean_a = a.mean().unwrap_or(0.0);
                let mean_b = b.mean().unwrap_or(0.0);
                cosine_distance(a.iter().map(|u| u - mean_a), b.iter().map(|v| v - mean_b))
            }
            DistanceMetric::Canberra => a
                .iter()
                .zip(b)
                .map(|(u, v)| {
                    let denom = u.abs() + v.abs();
                    if denom == 0.0 { 0.0 } else { (u - v).abs() / denom }
                })
                .sum(),
            DistanceMetric::BrayCurtis => {
                let (num, denom) = a.iter().zip(b).fold((0.0, 0.0), |(num, denom), (u, v)| {
                    (num + (u - v).abs(), denom + (u + v).abs())
                });
                num / denom
            }
            DistanceMetric::Precomputed | DistanceMetric::Custom(_) => return None,
        };
        Some(d)
    }

    /// Build the `n×n` distance matrix of an `n×p` sample matrix.
    ///
    /// # Arguments
    /// - `x`: sample matrix, or an `n×n` distance matrix for `Precomputed`.
    ///
    /// # Returns
    /// A symmetric matrix with zero diagonal for builtins; the input copied
    /// verbatim for `Precomputed`; the callable's output for `Custom`.
    ///
    /// # Errors
    /// - Any error returned by a fallible custom metric.
    /// - `MetricError::InvalidCustomOutput` when a custom metric does not
    ///   return an `n×n` matrix.
    /// - `MetricError::NonFiniteOutput` when any entry is NaN/±∞.
    pub fn pairwise(&self, x: ArrayView2<'_, f64>) -> MetricResult<Array2<f64>> {
        let n = x.nrows();
        let dist = match self {
            DistanceMetric::Precomputed => x.to_owned(),
            DistanceMetric::Custom(f) => {
                let out = f(x)?;
                if out.dim() != (n, n) {
                    let (rows, cols) = out.dim();
                    return Err(MetricError::InvalidCustomOutput { rows, cols, expected: n });
                }
                out
            }
            _ => {
                let mut out = Array2::<f64>::zeros((n, n));
                for i in 0..n {
                    for j in (i + 1)..n {
                        // Builtins always yield `Some`.
                        let d = self.distance(x.row(i), x.row(j)).unwrap_or(f64::NAN);
                        out[[i, j]] = d;
                        out[[j, i]] = d;
                    }
                }
                out
            }
        };
        ensure_finite(&dist)?;
        Ok(dist)
    }
}

/// Build the distance matrices `(Dx, Dy)` for a pair of samples.
///
/// # Errors
/// Propagates any [`MetricError`] from [`DistanceMetric::pairwise`].
pub fn compute_dist(
    x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, metric: &DistanceMetric,
) -> MetricResult<(Array2<f64>, Array2<f64>)> {
    Ok((metric.pairwise(x)?, metric.pairwise(y)?))
}

pub(crate) fn ensure_finite(mat: &Array2<f64>) -> MetricResult<()> {
    match mat.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(MetricError::NonFiniteOutput { row, col, value }),
        None => Ok(()),
    }
}

#[inline]
pub(crate) fn sq_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b).map(|(u, v)| (u - v) * (u - v)).sum()
}

#[inline]
fn cosine_distance(a: impl Iterator<Item = f64>, b: impl Iterator<Item = f64>) -> f64 {
    let (dot, norm_a, norm_b) =
        a.zip(b).fold((0.0, 0.0, 0.0), |(dot, na, nb), (u, v)| (dot + u * v, na + u * u, nb + v * v));
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
