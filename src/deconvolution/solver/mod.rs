//! solver — the interior-point inner solver and its supporting numerics.
//!
//! Purpose
//! -------
//! House the algorithmic core of the crate: the symmetric
//! positive-definite tridiagonal solve used for every Newton direction, the
//! barrier-continuation Newton loop that finds the MAP calcium trace for
//! fixed parameters, and the closed-form parameter estimator with the
//! negative log-likelihood used by the outer driver.
//!
//! Key behaviors
//! -------------
//! - [`tridiagonal`]: Thomas-style elimination with a strict positive-pivot
//!   check, two O(T) passes, no allocation.
//! - [`newton`]: Newton with feasibility-capped backtracking, nested inside
//!   a geometric barrier-weight continuation.
//! - [`estimator`]: one-step-ahead decay regression, residual-RMS noise
//!   update with a floor, opt-in baseline recentring, and the NLL.
//!
//! Conventions
//! -----------
//! - All routines operate on caller-owned buffers (`DeconvScratch`) and
//!   `ndarray` views; the solver layer performs no allocation and no I/O.
//! - Degenerate line searches end the current barrier stage without error;
//!   genuine numerical breakdowns surface as `DeconvError` so the driver
//!   can return its best iterate alongside the tag.

pub mod estimator;
pub mod newton;
pub mod tridiagonal;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::estimator::{estimate_params, neg_log_likelihood};
pub use self::newton::interior_point_solve;
pub use self::tridiagonal::solve_spd_tridiagonal;
