//! independence::validation — input checks run before any numeric work.
//!
//! Purpose
//! -------
//! Reject malformed `(x, y)` pairs and permutation blocks up front so the
//! engines can assume finite, consistently shaped inputs.
//!
//! Key behaviors
//! -------------
//! - [`check_inputs`]: non-empty, finite, equal sample counts, at least
//!   [`min_samples`] rows, and square matrices in precomputed mode.
//! - [`check_perm_blocks_dim`]: one block row per sample.
//!
//! Invariants & assumptions
//! ------------------------
//! - Checks run in a fixed order (emptiness, sample counts, shape,
//!   finiteness) so the reported error is deterministic.
use crate::independence::errors::{IndepError, IndepResult};
use ndarray::{Array2, ArrayView2};

/// Minimum sample count: 4 for unbiased statistics, 1 for biased ones.
pub fn min_samples(bias: bool) -> usize {
    if bias { 1 } else { 4 }
}

/// Validate a pair of sample (or precomputed) matrices.
///
/// Parameters
/// ----------
/// - `x`, `y`: `ArrayView2<f64>`
///   Sample matrices `(n, p)` / `(n, q)`, or `n×n` precomputed matrices.
/// - `bias`: `bool`
///   Selects the minimum sample count.
/// - `precomputed`: `bool`
///   When `true`, both inputs must be square.
///
/// Errors
/// ------
/// - `EmptyInput`, `SampleSizeMismatch`, `InsufficientSamples`,
///   `NotSquare`, `NonFiniteData`.
pub fn check_inputs(
    x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, bias: bool, precomputed: bool,
) -> IndepResult<()> {
    if x.is_empty() || y.is_empty() {
        return Err(IndepError::EmptyInput);
    }
    let (nx, ny) = (x.nrows(), y.nrows());
    if nx != ny {
        return Err(IndepError::SampleSizeMismatch { nx, ny });
    }
    let min = min_samples(bias);
    if nx < min {
        return Err(IndepError::InsufficientSamples { n: nx, min });
    }
    if precomputed {
        for (matrix, (rows, cols)) in [("x", x.dim()), ("y", y.dim())] {
            if rows != cols {
                return Err(IndepError::NotSquare { matrix, rows, cols });
            }
        }
    }
    check_finite("x", x)?;
    check_finite("y", y)
}

fn check_finite(matrix: &'static str, m: ArrayView2<'_, f64>) -> IndepResult<()> {
    match m.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(IndepError::NonFiniteData { matrix, row, col, value }),
        None => Ok(()),
    }
}

/// Ensure the block array has exactly one row per sample.
///
/// Errors
/// ------
/// - `PermBlocksDimMismatch { expected: n, actual: rows }`.
pub fn check_perm_blocks_dim(perm_blocks: &Array2<i64>, n: usize) -> IndepResult<()> {
    if perm_blocks.nrows() != n {
        return Err(IndepError::PermBlocksDimMismatch { expected: n, actual: perm_blocks.nrows() });
    }
    Ok(())
}
