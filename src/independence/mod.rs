//! independence — distance- and kernel-based independence tests.
//!
//! Purpose
//! -------
//! Expose the public test objects ([`Dcorr`], [`Hsic`]) behind one trait,
//! together with their validated options, outcomes and errors.
//!
//! Key behaviors
//! -------------
//! - [`IndependenceTest`]: `statistic(x, y)` and `test(x, y, &opts)`.
//! - Every `test` call runs `validate → (blocks check) → strategy →
//!   outcome` and never retains state between calls.
//! - Under-powered `reps` are reported as [`Advisory::LowReps`] in the
//!   outcome and as a `tracing` warning.
//!
//! Conventions
//! -----------
//! - Samples are `(n, p)` matrices with rows as observations. 1-D data
//!   can be lifted with [`as_column`].
//!
//! Downstream usage
//! ----------------
//! - The Python bindings in `lib.rs` wrap `Dcorr` and `Hsic` directly and
//!   return `outcome.as_pair()`.

pub mod dcorr;
pub mod errors;
pub mod hsic;
pub mod options;
pub mod outcome;
pub mod validation;

pub use self::dcorr::Dcorr;
pub use self::errors::{IndepError, IndepResult};
pub use self::hsic::Hsic;
pub use self::options::{MIN_POWERED_REPS, Reps, TestOptions, Workers};
pub use self::outcome::{Advisory, IndependenceOutcome, TestMethod};

use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::warn;

/// IndependenceTest — common surface of the independence tests.
///
/// Implementors are immutable configurations (metric, bias); both methods
/// take `&self` so one instance can serve concurrent callers.
pub trait IndependenceTest: Sync {
    /// Test statistic of `(x, y)` after input validation.
    fn statistic(&self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> IndepResult<f64>;

    /// Statistic, p-value and diagnostics of `(x, y)` under `opts`.
    fn test(
        &self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, opts: &TestOptions,
    ) -> IndepResult<IndependenceOutcome>;
}

/// Lift a 1-D sample into an `(n, 1)` matrix.
pub fn as_column(data: &[f64]) -> Array2<f64> {
    Array1::from(data.to_vec()).insert_axis(Axis(1))
}

pub(crate) fn reps_advisories(reps: Reps) -> Vec<Advisory> {
    if !reps.is_underpowered() {
        return Vec::new();
    }
    let advisory = Advisory::LowReps { reps: reps.get() };
    warn!(reps = reps.get(), "{advisory}");
    vec![advisory]
}
