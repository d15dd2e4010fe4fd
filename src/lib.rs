//! rust_independence — distance-correlation family independence tests with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the independence tests to Python via the `_rust_independence`
//! extension module when the `python-bindings` feature is enabled.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: [`metrics`] (distance/kernel matrices),
//!   [`engine`] (centering, quadratic and fast 1-D statistics),
//!   [`significance`] (permutation and χ² p-values) and [`independence`]
//!   (the `Dcorr` / `Hsic` tests).
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer, and
//!   register the `independence` submodule under `rust_independence`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs
//!   only FFI glue and error mapping.
//! - The GIL is released while statistics and permutations run.
//!
//! Conventions
//! -----------
//! - Python signatures follow `Dcorr(compute_distance="euclidean",
//!   bias=False)` / `Hsic(compute_kernel="gaussian", bias=False)` with
//!   `statistic(x, y)` and `test(x, y, reps=1000, workers=1, auto=True,
//!   perm_blocks=None, random_state=None) -> (stat, pvalue)`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Rust code should depend on [`independence`] directly:
//!
//! ```rust
//! use rust_independence::independence::{Dcorr, IndependenceTest, TestOptions, as_column};
//!
//! let x = as_column(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
//! let y = x.mapv(|v| (v - 3.5).abs());
//! let opts = TestOptions::new(Some(500), None, None, None, Some(42)).unwrap();
//! let outcome = Dcorr::default().test(x.view(), y.view(), &opts).unwrap();
//! assert!(outcome.pvalue > 0.0 && outcome.pvalue <= 1.0);
//! ```

pub mod engine;
pub mod independence;
pub mod metrics;
pub mod significance;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    independence::{Dcorr, Hsic, IndependenceTest},
    utils::{
        MetricArg, build_test_options, extract_distance_metric, extract_f64_matrix,
        extract_kernel_metric,
    },
};

/// Dcorr — Python-facing distance correlation test.
///
/// Parameters
/// ----------
/// Constructed from Python via `Dcorr(compute_distance="euclidean", bias=False)`:
/// - `compute_distance`: `str | callable | None`
///   Builtin distance name, a callable mapping an `(n, p)` array to an
///   `(n, n)` distance matrix, or `None` when inputs are precomputed
///   distance matrices.
/// - `bias`: `bool`
///   Use the biased statistic (default: unbiased).
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_independence.independence", name = "Dcorr")]
pub struct PyDcorr {
    inner: Dcorr,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyDcorr {
    #[new]
    #[pyo3(
        text_signature = "(compute_distance='euclidean', bias=False)",
        signature = (compute_distance = Some(MetricArg::Name("euclidean".to_owned())), bias = false)
    )]
    pub fn new(py: Python<'_>, compute_distance: Option<MetricArg>, bias: bool) -> PyResult<Self> {
        let metric = extract_distance_metric(py, compute_distance)?;
        Ok(PyDcorr { inner: Dcorr::new(metric, bias) })
    }

    /// Dcorr statistic of `x` and `y`.
    #[pyo3(text_signature = "(self, x, y)")]
    pub fn statistic<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
    ) -> PyResult<f64> {
        let x = extract_f64_matrix(py, x)?;
        let y = extract_f64_matrix(py, y)?;
        Ok(py.allow_threads(|| self.inner.statistic(x.view(), y.view()))?)
    }

    /// `(stat, pvalue)` of the Dcorr test.
    #[pyo3(
        text_signature = "(self, x, y, reps=1000, workers=1, auto=True, perm_blocks=None, random_state=None)",
        signature = (x, y, reps = None, workers = 1, auto = true, perm_blocks = None, random_state = None)
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn test<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        reps: Option<&Bound<'py, PyAny>>, workers: i64, auto: bool,
        perm_blocks: Option<&Bound<'py, PyAny>>, random_state: Option<u64>,
    ) -> PyResult<(f64, f64)> {
        let x = extract_f64_matrix(py, x)?;
        let y = extract_f64_matrix(py, y)?;
        let opts = build_test_options(reps, workers, auto, perm_blocks, random_state)?;
        let outcome = py.allow_threads(|| self.inner.test(x.view(), y.view(), &opts))?;
        Ok(outcome.as_pair())
    }

    #[getter]
    pub fn bias(&self) -> bool {
        self.inner.bias()
    }
}

/// Hsic — Python-facing Hilbert–Schmidt independence criterion.
///
/// Parameters
/// ----------
/// Constructed from Python via `Hsic(compute_kernel="gaussian", bias=False)`:
/// - `compute_kernel`: `str | callable | None`
///   Builtin kernel name, a callable returning an `(n, n)` kernel matrix,
///   or `None` when inputs are precomputed matrices.
/// - `bias`: `bool`
///   Use the biased statistic (default: unbiased).
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_independence.independence", name = "Hsic")]
pub struct PyHsic {
    inner: Hsic,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyHsic {
    #[new]
    #[pyo3(
        text_signature = "(compute_kernel='gaussian', bias=False)",
        signature = (compute_kernel = Some(MetricArg::Name("gaussian".to_owned())), bias = false)
    )]
    pub fn new(py: Python<'_>, compute_kernel: Option<MetricArg>, bias: bool) -> PyResult<Self> {
        let metric = extract_kernel_metric(py, compute_kernel)?;
        Ok(PyHsic { inner: Hsic::new(metric, bias) })
    }

    /// Hsic statistic of `x` and `y`.
    #[pyo3(text_signature = "(self, x, y)")]
    pub fn statistic<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
    ) -> PyResult<f64> {
        let x = extract_f64_matrix(py, x)?;
        let y = extract_f64_matrix(py, y)?;
        Ok(py.allow_threads(|| self.inner.statistic(x.view(), y.view()))?)
    }

    /// `(stat, pvalue)` of the Hsic test.
    #[pyo3(
        text_signature = "(self, x, y, reps=1000, workers=1, auto=True, perm_blocks=None, random_state=None)",
        signature = (x, y, reps = None, workers = 1, auto = true, perm_blocks = None, random_state = None)
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn test<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        reps: Option<&Bound<'py, PyAny>>, workers: i64, auto: bool,
        perm_blocks: Option<&Bound<'py, PyAny>>, random_state: Option<u64>,
    ) -> PyResult<(f64, f64)> {
        let x = extract_f64_matrix(py, x)?;
        let y = extract_f64_matrix(py, y)?;
        let opts = build_test_options(reps, workers, auto, perm_blocks, random_state)?;
        let outcome = py.allow_threads(|| self.inner.test(x.view(), y.view(), &opts))?;
        Ok(outcome.as_pair())
    }

    #[getter]
    pub fn bias(&self) -> bool {
        self.inner.bias()
    }
}

/// _rust_independence — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `independence` submodule holding `Dcorr` and `Hsic`.
/// - Register it in `sys.modules` as `rust_independence.independence` so
///   dotted imports work.
///
/// Errors
/// ------
/// - `PyErr` if creating the submodule or touching `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_independence<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let independence_mod = PyModule::new(_py, "independence")?;
    independence(_py, m, &independence_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_independence.independence", independence_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn independence<'py>(
    _py: Python, rust_independence: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyDcorr>()?;
    m.add_class::<PyHsic>()?;
    rust_independence.add_submodule(m)?;
    Ok(())
}
