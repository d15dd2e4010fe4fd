//! utils — Python-side argument extraction for the bindings.
//!
//! Converts NumPy arrays, pandas objects and nested sequences into owned
//! `ndarray` matrices, and maps the loosely typed Python keyword
//! arguments of `test(...)` onto a validated [`TestOptions`].

#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, ArrayView2, Axis};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray, // Array2 → PyArray
    PyReadonlyArray1,
    PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyBool, PyInt},
};

#[cfg(feature = "python-bindings")]
use crate::{
    independence::{IndepError, TestOptions},
    metrics::{DistanceMetric, KernelMetric, MetricError, MetricResult},
};

/// Metric argument as passed from Python: a builtin name or a callable.
#[cfg(feature = "python-bindings")]
#[derive(FromPyObject)]
pub enum MetricArg {
    Name(String),
    Callable(PyObject),
}

/// Two-dimensional `f64` matrix from an ndarray, pandas object or nested
/// sequence. 1-D inputs become an `(n, 1)` column.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned().insert_axis(Axis(1)));
    }

    if let Ok(obj) = raw.call_method0("to_numpy") {
        if obj.as_ptr() != raw.as_ptr() {
            return extract_f64_matrix(py, &obj);
        }
    }

    if let Ok(rows) = raw.extract::<Vec<Vec<f64>>>() {
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(PyValueError::new_err("rows of a nested sequence must have equal length"));
        }
        let nrows = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        return Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|e| PyValueError::new_err(e.to_string()));
    }

    let vec: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a 1-D or 2-D numpy.ndarray, pandas object, or sequence of float64",
        )
    })?;
    Ok(Array1::from(vec).insert_axis(Axis(1)))
}

/// Optional `perm_blocks` array; 1-D labels become a single column.
#[cfg(feature = "python-bindings")]
pub fn extract_perm_blocks<'py>(raw: Option<&Bound<'py, PyAny>>) -> PyResult<Option<Array2<i64>>> {
    let Some(raw) = raw.filter(|r| !r.is_none()) else {
        return Ok(None);
    };
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<i64>>() {
        return Ok(Some(arr.as_array().to_owned()));
    }
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<i64>>() {
        return Ok(Some(arr.as_array().to_owned().insert_axis(Axis(1))));
    }
    if let Ok(rows) = raw.extract::<Vec<Vec<i64>>>() {
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(PyValueError::new_err("perm_blocks rows must have equal length"));
        }
        let nrows = rows.len();
        let flat: Vec<i64> = rows.into_iter().flatten().collect();
        return Array2::from_shape_vec((nrows, ncols), flat)
            .map(Some)
            .map_err(|e| PyValueError::new_err(e.to_string()));
    }
    let labels: Vec<i64> = raw.extract().map_err(|_| {
        PyTypeError::new_err("perm_blocks must be an integer array with one row per sample")
    })?;
    Ok(Some(Array1::from(labels).insert_axis(Axis(1))))
}

/// `reps` must be a Python `int` (not `bool`, `float` or `str`).
#[cfg(feature = "python-bindings")]
fn extract_reps(raw: Option<&Bound<'_, PyAny>>) -> PyResult<Option<i64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.is_instance_of::<PyInt>() && !raw.is_instance_of::<PyBool>() {
        if let Ok(value) = raw.extract::<i64>() {
            return Ok(Some(value));
        }
    }
    let value = raw.repr().map(|r| r.to_string()).unwrap_or_else(|_| "<unrepresentable>".into());
    Err(IndepError::InvalidReps { value }.into())
}

/// Assemble validated [`TestOptions`] from Python keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_test_options<'py>(
    reps: Option<&Bound<'py, PyAny>>, workers: i64, auto: bool,
    perm_blocks: Option<&Bound<'py, PyAny>>, random_state: Option<u64>,
) -> PyResult<TestOptions> {
    let reps = extract_reps(reps)?;
    let blocks = extract_perm_blocks(perm_blocks)?;
    Ok(TestOptions::new(reps, Some(workers), Some(auto), blocks, random_state)?)
}

/// Wrap a Python callable `f(x) -> ndarray` as a fallible metric closure.
///
/// An exception raised by the callable, or a return value that is not a
/// 2-D float array, becomes `MetricError::CustomFailed` with the Python
/// error text as its reason.
#[cfg(feature = "python-bindings")]
fn py_callable_metric(
    func: PyObject,
) -> impl Fn(ArrayView2<'_, f64>) -> MetricResult<Array2<f64>> + Send + Sync + 'static {
    move |x: ArrayView2<'_, f64>| {
        Python::with_gil(|py| {
            let call = || -> PyResult<Array2<f64>> {
                let arg = x.to_owned().into_pyarray(py);
                let out = func.bind(py).call1((arg,))?;
                let arr = out.extract::<PyReadonlyArray2<f64>>()?;
                Ok(arr.as_array().to_owned())
            };
            call().map_err(|e| MetricError::CustomFailed { reason: e.to_string() })
        })
    }
}

#[cfg(feature = "python-bindings")]
fn check_callable(py: Python<'_>, func: &PyObject) -> PyResult<()> {
    if func.bind(py).is_callable() {
        Ok(())
    } else {
        Err(PyTypeError::new_err("metric must be a name, a callable, or None"))
    }
}

/// `None` → precomputed, name → builtin, callable → custom.
#[cfg(feature = "python-bindings")]
pub fn extract_distance_metric(py: Python<'_>, arg: Option<MetricArg>) -> PyResult<DistanceMetric> {
    match arg {
        None => Ok(DistanceMetric::Precomputed),
        Some(MetricArg::Name(name)) => Ok(name.parse::<DistanceMetric>()?),
        Some(MetricArg::Callable(func)) => {
            check_callable(py, &func)?;
            Ok(DistanceMetric::try_custom(py_callable_metric(func)))
        }
    }
}

/// `None` → precomputed, name → builtin, callable → custom.
#[cfg(feature = "python-bindings")]
pub fn extract_kernel_metric(py: Python<'_>, arg: Option<MetricArg>) -> PyResult<KernelMetric> {
    match arg {
        None => Ok(KernelMetric::Precomputed),
        Some(MetricArg::Name(name)) => Ok(name.parse::<KernelMetric>()?),
        Some(MetricArg::Callable(func)) => {
            check_callable(py, &func)?;
            Ok(KernelMetric::try_custom(py_callable_metric(func)))
        }
    }
}
