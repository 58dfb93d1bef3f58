//! deconvolution — fast non-negative spike inference stack.
//!
//! Purpose
//! -------
//! Provide a cohesive layer for inferring a non-negative spike train from a
//! single-neuron calcium fluorescence trace: validated data and parameter
//! containers, the bidiagonal spike operator, the interior-point Newton
//! solver, closed-form parameter re-estimation, the outer driver model, and
//! shared error types under a single namespace. This is the surface most
//! consumers (including the Python bindings) should depend on.
//!
//! Key behaviors
//! -------------
//! - Collect the numerical building blocks in [`core`]: the fluorescence
//!   container, the generative parameter record, run options, the spike
//!   operator, validation helpers, and the preallocated workspace.
//! - Implement the solver layer in [`solver`]: the symmetric tridiagonal
//!   solve, the barrier-continuation Newton inner loop, and the closed-form
//!   estimator with the negative log-likelihood.
//! - Expose the user-facing driver in [`models`] via [`FnndModel`] and the
//!   one-shot [`deconvolve`] convenience function.
//! - Centralize error types in [`errors`] (`DeconvError`, `ParamError`, and
//!   the `DeconvResult` / `ParamResult` aliases).
//!
//! Invariants & assumptions
//! ------------------------
//! - Fluorescence data are carried in validated [`FluorTrace`] instances:
//!   finite, at least four samples, strictly positive sample interval.
//! - Caller-supplied parameter records satisfy `tau > 0`, `lam > 0`,
//!   `sig > 0`, finite `mu`, and are cross-checked against `dt` at solver
//!   entry so the decay factor lies in (0, 1).
//! - At every committed iterate the spike and calcium buffers satisfy
//!   `spikes = M·calcium` and, inside the barrier, `spikes[i] > 0` strictly.
//! - Internal scratch buffers are single-owner and not thread-safe;
//!   concurrent use of the same [`FnndModel`] instance is not supported. Run
//!   one model per neuron for parallel deployments.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based throughout; the AR(1) recurrence is
//!   `C[i] = a·C[i−1] + n[i]` with `C[−1] ≡ 0`.
//! - The stack performs no I/O and holds no global state; with `verbose`
//!   enabled the driver prints progress lines to stderr. Error conditions
//!   are surfaced as [`DeconvResult`] / [`ParamResult`]; panics indicate
//!   programming errors such as shape mismatches.
//! - The trace is never rescaled or mean-subtracted internally; recording
//!   scale and offset are absorbed by `sig` and `mu`.
//!
//! Downstream usage
//! ----------------
//! - Typical end-to-end flow:
//!   1. Construct a [`FluorTrace`] from the recorded samples and `dt`.
//!   2. Build a [`DeconvParams`] record and [`DeconvOptions`] bundle.
//!   3. Run [`deconvolve`], or construct an [`FnndModel`] and call
//!      `infer(&trace)` when reusing buffers across traces of equal length.
//!   4. Read the spike train, refined parameters, and diagnostics from the
//!      returned [`InferOutcome`].
//! - Python bindings import from this module and rely on the
//!   `DeconvError` / `ParamError` conversions into `PyErr` defined in
//!   [`errors`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; the integration test exercises
//!   the full pipeline on synthetic AR(1) data, including recovery quality,
//!   parameter accuracy, sparsity monotonicity, and determinism.

pub mod core;
pub mod errors;
pub mod models;
pub mod solver;

// ---- Re-exports (primary public surface) ----------------------------------
//
// These are the “everyday” types most users need. More specialized items
// (validation helpers, the raw operator and solver entry points) remain
// under their respective submodules.

pub use self::core::{
    BarrierSchedule, DeconvOptions, DeconvParams, DeconvScratch, FluorTrace, NewtonTolerances,
    SpikeOperator,
};

pub use self::errors::{DeconvError, DeconvResult, ParamError, ParamResult};

pub use self::models::{FnndModel, InferOutcome, deconvolve};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use calcium_deconv::deconvolution::prelude::*;
//
// to import the main deconvolution surface in a single line.

pub mod prelude {
    pub use super::{
        BarrierSchedule, DeconvError, DeconvOptions, DeconvParams, DeconvResult, FluorTrace,
        FnndModel, InferOutcome, NewtonTolerances, ParamError, ParamResult, deconvolve,
    };
}
