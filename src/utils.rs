#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::deconvolution::{
    core::{
        data::FluorTrace,
        options::{BarrierSchedule, DeconvOptions, NewtonTolerances},
        params::DeconvParams,
    },
    errors::DeconvError,
    models::fnnd::FnndModel,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1, PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Coerce a fluorescence trace from either orientation into a validated
/// [`FluorTrace`].
///
/// Accepts a 1-D array/series/sequence, or a 2-D array with one unit
/// dimension (row or column vector). Anything else is rejected with the
/// shape error; the samples themselves then go through the usual trace
/// validation. No mean subtraction or rescaling happens here.
#[cfg(feature = "python-bindings")]
pub fn extract_trace<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, dt: f64,
) -> PyResult<FluorTrace> {
    if let Ok(arr2) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        let view = arr2.as_array();
        let (rows, cols) = (view.nrows(), view.ncols());
        if rows != 1 && cols != 1 {
            return Err(DeconvError::NotOneDimensional { ndim: 2 }.into());
        }
        let flat: Vec<f64> = view.iter().copied().collect();
        return Ok(FluorTrace::new(Array1::from(flat), dt)?);
    }

    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err("trace must be a 1-D contiguous float64 array or sequence")
    })?;
    Ok(FluorTrace::from_slice(slice, dt)?)
}

#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_fnnd_model(
    data_length: usize, tau: f64, lam: f64, sig: f64, mu: f64, max_iter: Option<usize>,
    tol: Option<f64>, eta_decay: Option<f64>, eta_floor: Option<f64>,
    newton_dir_tol: Option<f64>, newton_step_floor: Option<f64>, armijo_slack: Option<f64>,
    sigma_floor: Option<f64>, estimate_tau: Option<bool>, estimate_sig: Option<bool>,
    estimate_mu: Option<bool>, scale_lambda_by_dt: Option<bool>, verbose: Option<bool>,
) -> PyResult<FnndModel> {
    let params = DeconvParams::new(tau, lam, sig, mu)?;

    let barrier_defaults = BarrierSchedule::default();
    let barrier = BarrierSchedule::new(
        barrier_defaults.eta_init,
        eta_decay.unwrap_or(barrier_defaults.eta_decay),
        eta_floor.unwrap_or(barrier_defaults.eta_floor),
    )?;

    let newton_defaults = NewtonTolerances::default();
    let newton = NewtonTolerances::new(
        newton_dir_tol.unwrap_or(newton_defaults.dir_tol),
        newton_step_floor.unwrap_or(newton_defaults.step_floor),
        armijo_slack.unwrap_or(newton_defaults.armijo_slack),
    )?;

    let opts_defaults = DeconvOptions::default();
    let options = DeconvOptions::new(
        max_iter.unwrap_or(opts_defaults.max_iter),
        tol.unwrap_or(opts_defaults.tol),
        barrier,
        newton,
        sigma_floor.unwrap_or(opts_defaults.sigma_floor),
        estimate_tau.unwrap_or(opts_defaults.estimate_tau),
        estimate_sig.unwrap_or(opts_defaults.estimate_sig),
        estimate_mu.unwrap_or(opts_defaults.estimate_mu),
        scale_lambda_by_dt.unwrap_or(opts_defaults.scale_lambda_by_dt),
        verbose.unwrap_or(opts_defaults.verbose),
    )?;

    Ok(FnndModel::new(data_length, params, options))
}
