//! Errors for fluorescence deconvolution (input validation, configuration
//! checks, and numerical breakdowns inside the interior-point solver).
//!
//! This module defines a solver error type, [`DeconvError`], and a parameter
//! error type, [`ParamError`], used across the Python-facing API and the
//! internal Rust core. Both implement `Display`/`Error` and convert to `PyErr`
//! for PyO3.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Fluorescence samples must be **finite**; the trace must have at least
//!   four samples so the one-step-ahead decay regression is well posed.
//! - Exhausting `max_iter` without reaching the outer tolerance is **not an
//!   error**: the driver reports `converged = false` with a status string and
//!   still returns the best iterate (see `InferOutcome`).
//! - A degenerate line search (step floor reached without objective decrease)
//!   is an accepted stopping condition for the current barrier stage, never
//!   an error.
#[cfg(feature = "python-bindings")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

/// Crate-wide result alias for deconvolution operations that may produce
/// [`DeconvError`].
pub type DeconvResult<T> = Result<T, DeconvError>;

/// Result alias for parameter-construction/validation paths that may produce
/// [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Unified error type for fluorescence deconvolution.
///
/// Covers trace/shape validation, configuration checks, and numerical
/// breakdowns raised by the tridiagonal solve or the Newton iteration.
/// Implements `Display`/`Error` and converts to a Python `ValueError` at
/// PyO3 boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum DeconvError {
    // ---- Trace/shape validation ----
    /// Fluorescence trace is empty.
    EmptyTrace,

    /// Trace has fewer samples than the solver requires.
    TraceTooShort { len: usize, min: usize },

    /// A fluorescence sample is NaN/±inf.
    NonFiniteSample { index: usize, value: f64 },

    /// The sample interval must be finite and strictly positive.
    InvalidSampleInterval { dt: f64 },

    /// Input array is not coercible to a one-dimensional trace.
    NotOneDimensional { ndim: usize },

    // ---- Configuration validation ----
    /// Outer convergence tolerance must be finite and strictly positive.
    InvalidTolerance { value: f64 },

    /// Barrier schedule constants must satisfy 0 < decay < 1 and
    /// 0 < floor < init.
    InvalidBarrierSchedule { init: f64, decay: f64, floor: f64, reason: &'static str },

    /// Newton thresholds must be finite and strictly positive.
    InvalidNewtonTolerance { name: &'static str, value: f64 },

    /// The noise floor must be finite and strictly positive.
    InvalidSigmaFloor { value: f64 },

    // ---- Numerical breakdowns ----
    /// The tridiagonal elimination met a pivot ≤ 0; the Newton system lost
    /// positive-definiteness.
    NotPositiveDefinite { row: usize, pivot: f64 },

    /// A committed objective value was NaN/±inf.
    NonFiniteObjective { value: f64 },

    /// A committed iterate (calcium, spike, or gradient entry) was NaN/±inf.
    NonFiniteIterate { index: usize, value: f64 },

    /// A spike entry left the feasible interior (n[i] ≤ 0) where strict
    /// positivity is required.
    SpikeNotPositive { index: usize, value: f64 },

    // ---- Parameter record ----
    /// Wrapper for a parameter-record violation.
    Param(ParamError),
}

impl std::error::Error for DeconvError {}

impl std::fmt::Display for DeconvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Trace/shape validation ----
            DeconvError::EmptyTrace => {
                write!(f, "Fluorescence trace is empty.")
            }
            DeconvError::TraceTooShort { len, min } => {
                write!(f, "Fluorescence trace has {len} samples; at least {min} are required.")
            }
            DeconvError::NonFiniteSample { index, value } => {
                write!(f, "Fluorescence sample at index {index} is non-finite: {value}")
            }
            DeconvError::InvalidSampleInterval { dt } => {
                write!(f, "Sample interval must be finite and > 0; got: {dt}")
            }
            DeconvError::NotOneDimensional { ndim } => {
                write!(
                    f,
                    "Input must be a 1-D trace (or a 2-D array with one unit dimension); \
                     got {ndim} dimensions."
                )
            }
            // ---- Configuration validation ----
            DeconvError::InvalidTolerance { value } => {
                write!(f, "Outer tolerance must be finite and > 0; got: {value}")
            }
            DeconvError::InvalidBarrierSchedule { init, decay, floor, reason } => {
                write!(
                    f,
                    "Barrier schedule (init {init}, decay {decay}, floor {floor}) is invalid: \
                     {reason}"
                )
            }
            DeconvError::InvalidNewtonTolerance { name, value } => {
                write!(f, "Newton threshold '{name}' must be finite and > 0; got: {value}")
            }
            DeconvError::InvalidSigmaFloor { value } => {
                write!(f, "Noise floor must be finite and > 0; got: {value}")
            }
            // ---- Numerical breakdowns ----
            DeconvError::NotPositiveDefinite { row, pivot } => {
                write!(
                    f,
                    "Tridiagonal elimination met pivot {pivot} at row {row}; the Newton system \
                     is not positive definite."
                )
            }
            DeconvError::NonFiniteObjective { value } => {
                write!(f, "Solver produced a non-finite objective value: {value}")
            }
            DeconvError::NonFiniteIterate { index, value } => {
                write!(f, "Solver produced a non-finite iterate entry at index {index}: {value}")
            }
            DeconvError::SpikeNotPositive { index, value } => {
                write!(
                    f,
                    "Spike entry at index {index} is {value}; strict positivity is required \
                     inside the barrier."
                )
            }
            // ---- Parameter record ----
            DeconvError::Param(err) => err.fmt(f),
        }
    }
}

impl From<ParamError> for DeconvError {
    fn from(err: ParamError) -> DeconvError {
        DeconvError::Param(err)
    }
}

/// Convert a [`DeconvError`] into a Python `ValueError` with the error message.
///
/// This is used at the Rust↔Python boundary to surface domain errors cleanly.
#[cfg(feature = "python-bindings")]
impl std::convert::From<DeconvError> for PyErr {
    fn from(err: DeconvError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Errors specific to the generative-model parameter record.
///
/// Typical causes include a decay time constant at or below the sample
/// interval, non-positive noise or sparsity weights, and non-finite
/// baselines.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Time constant must be finite and > 0.
    InvalidTau { value: f64 },

    /// Time constant must exceed the sample interval so the decay factor
    /// lies in (0, 1).
    TauNotAboveDt { tau: f64, dt: f64 },

    /// Sparsity weight must be finite and > 0.
    InvalidLambda { value: f64 },

    /// Noise standard deviation must be finite and > 0.
    InvalidSigma { value: f64 },

    /// Baseline offset must be finite.
    InvalidBaseline { value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::InvalidTau { value } => {
                write!(f, "Decay time constant must be finite and > 0; got: {value}")
            }
            ParamError::TauNotAboveDt { tau, dt } => {
                write!(
                    f,
                    "Decay time constant ({tau}) must exceed the sample interval ({dt}) so the \
                     per-step decay factor lies in (0, 1)."
                )
            }
            ParamError::InvalidLambda { value } => {
                write!(f, "Sparsity weight must be finite and > 0; got: {value}")
            }
            ParamError::InvalidSigma { value } => {
                write!(f, "Noise standard deviation must be finite and > 0; got: {value}")
            }
            ParamError::InvalidBaseline { value } => {
                write!(f, "Baseline offset must be finite; got: {value}")
            }
        }
    }
}

/// Convert a [`ParamError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<ParamError> for PyErr {
    fn from(err: ParamError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
