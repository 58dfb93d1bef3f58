//! calcium_deconv — fast non-negative calcium deconvolution with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the spike-inference routines to Python via the `_calcium_deconv`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing classes used by the `calcium_deconv`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust module ([`deconvolution`]) as the public crate
//!   surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_calcium_deconv` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work is implemented in the inner Rust modules; this
//!   file performs only FFI glue, input validation, and error mapping.
//! - When `python-bindings` is enabled, the Python-visible types mirror the
//!   invariants and signatures of their Rust counterparts
//!   ([`FnndModel`], [`InferOutcome`], [`DeconvParams`]).
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are propagated as rich error types
//!   internally and converted to `PyErr` values at the PyO3 boundary.
//! - Fluorescence input from Python is accepted in either orientation of a
//!   1-D container; see `utils::extract_trace`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on [`deconvolution`] and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//! - External users are expected to interact with either the safe Rust APIs
//!   or the pure-Python wrappers; the PyO3 plumbing is considered internal.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by the synthetic-data integration test; smoke tests for the PyO3
//!   bindings live on the Python side.

pub mod deconvolution;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    deconvolution::{
        core::params::DeconvParams,
        models::fnnd::{FnndModel, InferOutcome},
    },
    utils::{build_fnnd_model, extract_trace},
};

/// SpikeInference — Python-facing wrapper for fast non-negative
/// deconvolution.
///
/// Purpose
/// -------
/// Expose the [`FnndModel`] API to Python callers while preserving the core
/// Rust invariants and error handling.
///
/// Key behaviors
/// -------------
/// - Build an [`FnndModel`] from Python-friendly scalar arguments.
/// - Provide an `infer` method that converts a Python array (either
///   orientation) into a validated trace and delegates to the core
///   implementation.
/// - Cache the inference outcome for inspection from Python via property
///   getters.
///
/// Notes
/// -----
/// - Native Rust callers should use [`FnndModel`] directly; this type
///   exists solely for the PyO3 binding surface.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "calcium_deconv", unsendable)]
pub struct SpikeInference {
    /// Underlying Rust model.
    pub inner: FnndModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl SpikeInference {
    #[new]
    #[pyo3(
        signature = (
            data_length,
            tau,
            lam,
            sig,
            mu = 0.0,
            max_iter = None,
            tol = None,
            eta_decay = None,
            eta_floor = None,
            newton_dir_tol = None,
            newton_step_floor = None,
            armijo_slack = None,
            sigma_floor = None,
            estimate_tau = None,
            estimate_sig = None,
            estimate_mu = None,
            scale_lambda_by_dt = None,
            verbose = None,
        ),
        text_signature = "(data_length, tau, lam, sig, /, mu=0.0, max_iter=25, tol=1e-3, \
                          eta_decay=0.1, eta_floor=1e-13, newton_dir_tol=5e-2, \
                          newton_step_floor=1e-3, armijo_slack=1e-7, sigma_floor=1e-6, \
                          estimate_tau=True, estimate_sig=True, estimate_mu=False, \
                          scale_lambda_by_dt=False, verbose=False)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        data_length: usize, tau: f64, lam: f64, sig: f64, mu: f64, max_iter: Option<usize>,
        tol: Option<f64>, eta_decay: Option<f64>, eta_floor: Option<f64>,
        newton_dir_tol: Option<f64>, newton_step_floor: Option<f64>, armijo_slack: Option<f64>,
        sigma_floor: Option<f64>, estimate_tau: Option<bool>, estimate_sig: Option<bool>,
        estimate_mu: Option<bool>, scale_lambda_by_dt: Option<bool>, verbose: Option<bool>,
    ) -> PyResult<Self> {
        let inner = build_fnnd_model(
            data_length,
            tau,
            lam,
            sig,
            mu,
            max_iter,
            tol,
            eta_decay,
            eta_floor,
            newton_dir_tol,
            newton_step_floor,
            armijo_slack,
            sigma_floor,
            estimate_tau,
            estimate_sig,
            estimate_mu,
            scale_lambda_by_dt,
            verbose,
        )?;
        Ok(SpikeInference { inner })
    }

    /// Run spike inference on `data` sampled at interval `dt` (seconds).
    #[pyo3(text_signature = "(self, data, dt, /)")]
    pub fn infer<'py>(
        &mut self, py: Python<'py>, data: &Bound<'py, PyAny>, dt: f64,
    ) -> PyResult<()> {
        let trace = extract_trace(py, data, dt)?;
        self.inner.infer(&trace)?;
        Ok(())
    }

    #[getter]
    pub fn results(&self) -> PyResult<SpikeInferOutcome> {
        match &self.inner.results {
            Some(outcome) => Ok(SpikeInferOutcome { inner: outcome.clone() }),
            None => Err(PyValueError::new_err("inference has not been run yet")),
        }
    }

    #[getter]
    pub fn fitted_params(&self) -> PyResult<SpikeFittedParams> {
        match &self.inner.results {
            Some(outcome) => Ok(SpikeFittedParams { inner: outcome.params }),
            None => Err(PyValueError::new_err("inference has not been run yet")),
        }
    }
}

/// SpikeInferOutcome — inference outcome exposed to Python.
///
/// Presents the key diagnostics from [`InferOutcome`] in a lightweight,
/// read-only wrapper: the inferred spike and calcium vectors, the best
/// negative log-likelihood and its trace, the iteration count, and the
/// convergence status.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "calcium_deconv")]
pub struct SpikeInferOutcome {
    /// Underlying Rust outcome.
    pub inner: InferOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl SpikeInferOutcome {
    #[getter]
    pub fn spikes(&self) -> Vec<f64> {
        self.inner.spikes.to_vec()
    }

    #[getter]
    pub fn calcium(&self) -> Vec<f64> {
        self.inner.calcium.to_vec()
    }

    #[getter]
    pub fn nll(&self) -> f64 {
        self.inner.nll
    }

    #[getter]
    pub fn nll_trace(&self) -> Vec<f64> {
        self.inner.nll_trace.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }
}

/// SpikeFittedParams — refined generative parameters exposed to Python.
///
/// Mirrors [`DeconvParams`] at the best iterate of the last run without
/// exposing internal validators to Python.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "calcium_deconv")]
pub struct SpikeFittedParams {
    pub inner: DeconvParams,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl SpikeFittedParams {
    #[getter]
    pub fn tau(&self) -> f64 {
        self.inner.tau
    }

    #[getter]
    pub fn lam(&self) -> f64 {
        self.inner.lam
    }

    #[getter]
    pub fn sig(&self) -> f64 {
        self.inner.sig
    }

    #[getter]
    pub fn mu(&self) -> f64 {
        self.inner.mu
    }
}

/// _calcium_deconv — PyO3 module initializer for the Python extension.
///
/// Registers the binding classes; invoked automatically by Python when
/// importing the compiled extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _calcium_deconv<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<SpikeInference>()?;
    m.add_class::<SpikeInferOutcome>()?;
    m.add_class::<SpikeFittedParams>()?;
    Ok(())
}
