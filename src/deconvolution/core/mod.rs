//! core — shared data, parameters, operator, and workspace.
//!
//! Purpose
//! -------
//! Collect the building blocks of the deconvolution stack: the validated
//! fluorescence container, the generative parameter record, the run
//! options, the bidiagonal spike operator with its Hessian assembly, the
//! validation helpers, and the preallocated solver workspace. The solver
//! and model layers build on these primitives.
//!
//! Key behaviors
//! -------------
//! - Define the data and configuration types ([`FluorTrace`],
//!   [`DeconvParams`], [`DeconvOptions`], [`BarrierSchedule`],
//!   [`NewtonTolerances`]).
//! - Implement the spike-from-calcium linear map as two scalars plus a
//!   length ([`SpikeOperator`]), with all products and the tridiagonal
//!   Hessian bands as specialised O(T) loops.
//! - Centralize small reusable checks in [`validation`] so every public
//!   constructor funnels through the same error surface.
//! - Own the reusable length-T buffers in [`DeconvScratch`] so nothing
//!   inside the Newton loop allocates.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; `dt` is carried by the trace, not the parameters,
//!   so the `tau > dt` cross-check happens at solver entry.
//! - This module avoids I/O and logging; it operates purely on `ndarray`
//!   containers and scalar values. Error conditions are reported via
//!   `DeconvResult` / `ParamResult`.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover: container construction and rejection
//!   paths, operator products against hand-expanded cases, Hessian bands
//!   against the explicit normal-matrix expansion, and configuration
//!   validation.

pub mod data;
pub mod operator;
pub mod options;
pub mod params;
pub mod validation;
pub mod workspace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::FluorTrace;
pub use self::operator::SpikeOperator;
pub use self::options::{BarrierSchedule, DeconvOptions, NewtonTolerances};
pub use self::params::DeconvParams;
pub use self::validation::{
    validate_barrier_schedule, validate_baseline, validate_lambda, validate_newton_tolerance,
    validate_outer_tol, validate_sample_interval, validate_sigma, validate_sigma_floor,
    validate_tau, validate_tau_against_dt, validate_trace,
};
pub use self::workspace::DeconvScratch;
