//! Estimation options for fluorescence deconvolution.
//!
//! This module defines [`DeconvOptions`], a single struct that bundles the
//! configuration used by the solver and the outer driver: the barrier
//! continuation schedule, the Newton inner thresholds, the outer convergence
//! tolerance and iteration cap, the noise floor, and the estimation flags.
//!
//! Design goals:
//! - Keep all solver knobs in one place.
//! - Avoid hidden defaults in the core (validation lives in the individual
//!   constructors [`BarrierSchedule::new`], [`NewtonTolerances::new`],
//!   [`DeconvOptions::new`]).
//!
//! Notes:
//! - `max_iter = 0`, or all estimation flags off, means the driver runs the
//!   inner solver exactly once and returns.
//! - `scale_lambda_by_dt` switches the sparsity penalty from `λ·Σn` to
//!   `λ·dt·Σn` in both the solver objective and the likelihood.
use crate::deconvolution::{
    core::validation::{
        validate_barrier_schedule, validate_newton_tolerance, validate_outer_tol,
        validate_sigma_floor,
    },
    errors::DeconvResult,
};

/// Barrier continuation schedule for the interior-point inner solver.
///
/// The barrier weight starts at `eta_init`, is multiplied by `eta_decay`
/// after each Newton loop, and the continuation stops once it falls below
/// `eta_floor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierSchedule {
    /// Initial barrier weight (default 1.0).
    pub eta_init: f64,
    /// Multiplicative factor applied per barrier stage (default 0.1).
    pub eta_decay: f64,
    /// Continuation lower bound (default 1e-13).
    pub eta_floor: f64,
}

impl BarrierSchedule {
    /// Construct a validated barrier schedule.
    ///
    /// # Errors
    /// Returns [`DeconvError::InvalidBarrierSchedule`] unless all constants
    /// are finite, `0 < eta_decay < 1`, and `0 < eta_floor < eta_init`.
    ///
    /// [`DeconvError::InvalidBarrierSchedule`]: crate::deconvolution::errors::DeconvError::InvalidBarrierSchedule
    pub fn new(eta_init: f64, eta_decay: f64, eta_floor: f64) -> DeconvResult<Self> {
        validate_barrier_schedule(eta_init, eta_decay, eta_floor)?;
        Ok(BarrierSchedule { eta_init, eta_decay, eta_floor })
    }
}

impl Default for BarrierSchedule {
    fn default() -> Self {
        BarrierSchedule { eta_init: 1.0, eta_decay: 0.1, eta_floor: 1e-13 }
    }
}

/// Inner Newton thresholds: termination, feasibility, and acceptance.
///
/// - `dir_tol`: the Newton loop continues while the direction norm exceeds
///   this value (default 5e-2).
/// - `step_floor`: the loop also requires the accepted step size to stay
///   above this value (default 1e-3); collapsing below it ends the current
///   barrier stage without error.
/// - `armijo_slack`: a trial step is accepted when the objective rises by
///   less than this slack (default 1e-7). This preserves the source
///   algorithm's increase-tolerance rule rather than a classical Armijo
///   sufficient-decrease condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonTolerances {
    pub dir_tol: f64,
    pub step_floor: f64,
    pub armijo_slack: f64,
}

impl NewtonTolerances {
    /// Construct validated Newton thresholds.
    ///
    /// # Errors
    /// Returns [`DeconvError::InvalidNewtonTolerance`] naming the offending
    /// field when a threshold is non-finite or ≤ 0.
    ///
    /// [`DeconvError::InvalidNewtonTolerance`]: crate::deconvolution::errors::DeconvError::InvalidNewtonTolerance
    pub fn new(dir_tol: f64, step_floor: f64, armijo_slack: f64) -> DeconvResult<Self> {
        validate_newton_tolerance("dir_tol", dir_tol)?;
        validate_newton_tolerance("step_floor", step_floor)?;
        validate_newton_tolerance("armijo_slack", armijo_slack)?;
        Ok(NewtonTolerances { dir_tol, step_floor, armijo_slack })
    }
}

impl Default for NewtonTolerances {
    fn default() -> Self {
        NewtonTolerances { dir_tol: 5e-2, step_floor: 1e-3, armijo_slack: 1e-7 }
    }
}

/// Configuration options for a deconvolution run.
///
/// Bundles the outer-loop controls (`max_iter`, `tol`), the inner solver
/// schedules, the noise floor used when re-estimating `sig`, the estimation
/// flags, the sparsity-scaling switch, and a verbosity flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeconvOptions {
    /// Maximum number of outer iterations; 0 disables parameter updates and
    /// runs the inner solver once.
    pub max_iter: usize,
    /// Outer convergence threshold on the negative log-likelihood.
    pub tol: f64,
    /// Barrier continuation schedule for the inner solver.
    pub barrier: BarrierSchedule,
    /// Newton inner thresholds.
    pub newton: NewtonTolerances,
    /// Lower bound applied to re-estimated noise levels (default 1e-6).
    pub sigma_floor: f64,
    /// Re-estimate the decay time constant each outer iteration.
    pub estimate_tau: bool,
    /// Re-estimate the noise standard deviation each outer iteration.
    pub estimate_sig: bool,
    /// Opt-in re-estimation of the baseline as `mean(F − C)`.
    pub estimate_mu: bool,
    /// Scale the sparsity penalty by the sample interval (`λ·dt·Σn`).
    pub scale_lambda_by_dt: bool,
    /// Print one progress line per outer iteration to stderr.
    pub verbose: bool,
}

impl DeconvOptions {
    /// Construct validated options.
    ///
    /// The schedule and threshold arguments are assumed to have been built
    /// through their own validating constructors; only the scalar fields are
    /// checked here.
    ///
    /// # Errors
    /// - [`DeconvError::InvalidTolerance`] if `tol` is non-finite or ≤ 0,
    /// - [`DeconvError::InvalidSigmaFloor`] if `sigma_floor` is non-finite
    ///   or ≤ 0.
    ///
    /// [`DeconvError::InvalidTolerance`]: crate::deconvolution::errors::DeconvError::InvalidTolerance
    /// [`DeconvError::InvalidSigmaFloor`]: crate::deconvolution::errors::DeconvError::InvalidSigmaFloor
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_iter: usize, tol: f64, barrier: BarrierSchedule, newton: NewtonTolerances,
        sigma_floor: f64, estimate_tau: bool, estimate_sig: bool, estimate_mu: bool,
        scale_lambda_by_dt: bool, verbose: bool,
    ) -> DeconvResult<Self> {
        validate_outer_tol(tol)?;
        validate_sigma_floor(sigma_floor)?;
        Ok(DeconvOptions {
            max_iter,
            tol,
            barrier,
            newton,
            sigma_floor,
            estimate_tau,
            estimate_sig,
            estimate_mu,
            scale_lambda_by_dt,
            verbose,
        })
    }

    /// Whether the outer loop performs any closed-form parameter update.
    pub fn updates_params(&self) -> bool {
        self.max_iter > 0 && (self.estimate_tau || self.estimate_sig || self.estimate_mu)
    }
}

impl Default for DeconvOptions {
    fn default() -> Self {
        DeconvOptions {
            max_iter: 25,
            tol: 1e-3,
            barrier: BarrierSchedule::default(),
            newton: NewtonTolerances::default(),
            sigma_floor: 1e-6,
            estimate_tau: true,
            estimate_sig: true,
            estimate_mu: false,
            scale_lambda_by_dt: false,
            verbose: false,
        }
    }
}
