//! Validation helpers for fluorescence deconvolution.
//!
//! This module centralizes small, reusable checks used across the
//! deconvolution stack — trace data, the generative-model parameter record,
//! and the solver configuration (barrier schedule, Newton thresholds, outer
//! tolerance, noise floor).
//!
//! **Convention:**
//! - The trace needs at least [`MIN_TRACE_LEN`] samples so the one-step-ahead
//!   decay regression in the estimator has a non-degenerate design.
//! - Caller-supplied parameters are validated strictly (`tau > dt`); values
//!   produced by the estimator are clamped at the source instead and bypass
//!   these checks.
use crate::deconvolution::errors::{DeconvError, DeconvResult, ParamError, ParamResult};
use ndarray::ArrayView1;

/// Minimum number of samples accepted in a fluorescence trace.
pub const MIN_TRACE_LEN: usize = 4;

/// Validate a raw fluorescence series.
///
/// Checks that the trace is non-empty, has at least [`MIN_TRACE_LEN`]
/// samples, and contains only finite values.
///
/// # Errors
/// - [`DeconvError::EmptyTrace`] if the series has no samples,
/// - [`DeconvError::TraceTooShort`] if it has fewer than [`MIN_TRACE_LEN`],
/// - [`DeconvError::NonFiniteSample`] if any entry is NaN or ±inf.
pub fn validate_trace(data: ArrayView1<f64>) -> DeconvResult<()> {
    if data.is_empty() {
        return Err(DeconvError::EmptyTrace);
    }
    if data.len() < MIN_TRACE_LEN {
        return Err(DeconvError::TraceTooShort { len: data.len(), min: MIN_TRACE_LEN });
    }
    for (index, &value) in data.iter().enumerate() {
        if !value.is_finite() {
            return Err(DeconvError::NonFiniteSample { index, value });
        }
    }
    Ok(())
}

/// Validate the sample interval `dt`.
pub fn validate_sample_interval(dt: f64) -> DeconvResult<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(DeconvError::InvalidSampleInterval { dt });
    }
    Ok(())
}

/// Validate the calcium decay time constant `tau` in isolation.
///
/// The cross-check against the sample interval happens at solver entry via
/// [`validate_tau_against_dt`], where `dt` is known.
pub fn validate_tau(tau: f64) -> ParamResult<()> {
    if !tau.is_finite() || tau <= 0.0 {
        return Err(ParamError::InvalidTau { value: tau });
    }
    Ok(())
}

/// Validate that `tau > dt`, so the decay factor `a = 1 − dt/tau` lies in
/// (0, 1).
pub fn validate_tau_against_dt(tau: f64, dt: f64) -> ParamResult<()> {
    if tau <= dt {
        return Err(ParamError::TauNotAboveDt { tau, dt });
    }
    Ok(())
}

/// Validate the sparsity prior weight `lam`.
pub fn validate_lambda(lam: f64) -> ParamResult<()> {
    if !lam.is_finite() || lam <= 0.0 {
        return Err(ParamError::InvalidLambda { value: lam });
    }
    Ok(())
}

/// Validate the observation-noise standard deviation `sig`.
pub fn validate_sigma(sig: f64) -> ParamResult<()> {
    if !sig.is_finite() || sig <= 0.0 {
        return Err(ParamError::InvalidSigma { value: sig });
    }
    Ok(())
}

/// Validate the additive baseline offset `mu` (any finite real).
pub fn validate_baseline(mu: f64) -> ParamResult<()> {
    if !mu.is_finite() {
        return Err(ParamError::InvalidBaseline { value: mu });
    }
    Ok(())
}

/// Validate the outer convergence tolerance on the negative log-likelihood.
pub fn validate_outer_tol(tol: f64) -> DeconvResult<()> {
    if !tol.is_finite() || tol <= 0.0 {
        return Err(DeconvError::InvalidTolerance { value: tol });
    }
    Ok(())
}

/// Validate one named Newton threshold (direction tolerance, step floor, or
/// line-search slack).
pub fn validate_newton_tolerance(name: &'static str, value: f64) -> DeconvResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DeconvError::InvalidNewtonTolerance { name, value });
    }
    Ok(())
}

/// Validate the barrier continuation schedule.
///
/// # Errors
/// Returns [`DeconvError::InvalidBarrierSchedule`] if:
/// - any constant is non-finite,
/// - `decay` is outside (0, 1),
/// - `floor` is not strictly between 0 and `init`.
pub fn validate_barrier_schedule(init: f64, decay: f64, floor: f64) -> DeconvResult<()> {
    if !init.is_finite() || !decay.is_finite() || !floor.is_finite() {
        return Err(DeconvError::InvalidBarrierSchedule {
            init,
            decay,
            floor,
            reason: "All barrier constants must be finite.",
        });
    }
    if decay <= 0.0 || decay >= 1.0 {
        return Err(DeconvError::InvalidBarrierSchedule {
            init,
            decay,
            floor,
            reason: "The decay factor must lie strictly between 0 and 1.",
        });
    }
    if floor <= 0.0 || floor >= init {
        return Err(DeconvError::InvalidBarrierSchedule {
            init,
            decay,
            floor,
            reason: "The floor must satisfy 0 < floor < init.",
        });
    }
    Ok(())
}

/// Validate the lower bound applied to re-estimated noise levels.
pub fn validate_sigma_floor(value: f64) -> DeconvResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DeconvError::InvalidSigmaFloor { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance of well-formed traces, parameters, and configuration values.
    // - Rejection of empty/short/non-finite traces with the right variant.
    // - Rejection of out-of-domain parameters and schedule constants.
    //
    // They intentionally DO NOT cover:
    // - Behavior of the solver on validated inputs; that belongs to the
    //   operator, Newton, and driver tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure that `validate_trace` accepts a finite series of the minimum
    // admissible length and rejects shorter or non-finite ones with the
    // matching error variant.
    fn validate_trace_length_and_finiteness() {
        // Arrange
        let ok = array![0.0, 1.0, 0.5, 0.25];
        let short = array![1.0, 2.0, 3.0];
        let with_nan = array![0.0, f64::NAN, 0.5, 0.25];
        let empty = ndarray::Array1::<f64>::zeros(0);

        // Act & Assert
        assert!(validate_trace(ok.view()).is_ok());
        assert_eq!(
            validate_trace(short.view()),
            Err(DeconvError::TraceTooShort { len: 3, min: MIN_TRACE_LEN })
        );
        assert!(matches!(
            validate_trace(with_nan.view()),
            Err(DeconvError::NonFiniteSample { index: 1, .. })
        ));
        assert_eq!(validate_trace(empty.view()), Err(DeconvError::EmptyTrace));
    }

    #[test]
    // Purpose
    // -------
    // Ensure the parameter checks enforce their documented domains: tau and
    // lam and sig strictly positive and finite, mu merely finite, and the
    // tau-versus-dt cross check strict.
    fn parameter_checks_enforce_domains() {
        assert!(validate_tau(0.5).is_ok());
        assert!(validate_tau(0.0).is_err());
        assert!(validate_tau(f64::INFINITY).is_err());

        assert!(validate_tau_against_dt(0.5, 1.0 / 30.0).is_ok());
        assert_eq!(
            validate_tau_against_dt(0.01, 0.01),
            Err(ParamError::TauNotAboveDt { tau: 0.01, dt: 0.01 })
        );

        assert!(validate_lambda(5.0).is_ok());
        assert!(validate_lambda(-1.0).is_err());

        assert!(validate_sigma(0.05).is_ok());
        assert!(validate_sigma(0.0).is_err());

        assert!(validate_baseline(-3.0).is_ok());
        assert!(validate_baseline(f64::NAN).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Ensure the barrier-schedule check rejects decay factors outside (0, 1)
    // and floors that do not sit strictly below the initial weight.
    fn barrier_schedule_rejects_bad_constants() {
        assert!(validate_barrier_schedule(1.0, 0.1, 1e-13).is_ok());
        assert!(validate_barrier_schedule(1.0, 1.0, 1e-13).is_err());
        assert!(validate_barrier_schedule(1.0, 0.1, 2.0).is_err());
        assert!(validate_barrier_schedule(1.0, 0.1, 0.0).is_err());
        assert!(validate_barrier_schedule(f64::NAN, 0.1, 1e-13).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Ensure the scalar configuration checks (outer tolerance, Newton
    // thresholds, noise floor, sample interval) enforce positivity and
    // finiteness.
    fn scalar_configuration_checks() {
        assert!(validate_outer_tol(1e-3).is_ok());
        assert!(validate_outer_tol(0.0).is_err());

        assert!(validate_newton_tolerance("dir_tol", 5e-2).is_ok());
        assert!(matches!(
            validate_newton_tolerance("step_floor", -1.0),
            Err(DeconvError::InvalidNewtonTolerance { name: "step_floor", .. })
        ));

        assert!(validate_sigma_floor(1e-6).is_ok());
        assert!(validate_sigma_floor(0.0).is_err());

        assert!(validate_sample_interval(1.0 / 30.0).is_ok());
        assert_eq!(
            validate_sample_interval(0.0),
            Err(DeconvError::InvalidSampleInterval { dt: 0.0 })
        );
    }
}
