//! models — the user-facing deconvolution driver.
//!
//! Purpose
//! -------
//! Expose the outer expectation–maximisation-style loop as a model type,
//! [`FnndModel`], that owns preallocated buffers and alternates the
//! interior-point inner solver with closed-form parameter updates, keeping
//! the best iterate across non-monotone outer steps. The one-shot
//! [`deconvolve`] function covers the common single-trace case.
//!
//! Conventions
//! -----------
//! - A model instance is single-owner and not thread-safe; parallelism
//!   across neurons belongs to the caller.
//! - Exhausted iteration budgets and numerical breakdowns both still return
//!   the best iterate; only invalid inputs produce an `Err`.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`fnnd`] cover the single-run path, keep-best
//!   bookkeeping, determinism, and entry validation; recovery quality lives
//!   in the integration tests.

pub mod fnnd;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::fnnd::{FnndModel, InferOutcome, deconvolve};
