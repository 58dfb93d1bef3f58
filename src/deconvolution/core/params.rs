//! Generative-model parameter record for fluorescence deconvolution.
//!
//! Purpose
//! -------
//! Define [`DeconvParams`], the constrained parameter record of the AR(1)
//! calcium model: decay time constant `tau`, sparsity prior weight `lam`,
//! observation-noise standard deviation `sig`, and additive baseline `mu`.
//!
//! Key ideas
//! ---------
//! - Caller-supplied records are validated once through
//!   [`DeconvParams::new`]; the cross-check `tau > dt` happens at solver
//!   entry where the sample interval is known.
//! - The estimator mutates a working copy through the public fields. Its
//!   outputs are clamped at the source (`0 ≤ â ≤ 1`, `sig ≥ sigma_floor`),
//!   so re-validation is unnecessary; in particular a re-estimated `tau` may
//!   legitimately touch `dt` (decay factor 0) even though caller input may
//!   not.
//!
//! Invariants
//! ----------
//! - `tau > 0`, `lam > 0`, `sig > 0`, all finite; `mu` finite.
use crate::deconvolution::{
    core::validation::{
        validate_baseline, validate_lambda, validate_sigma, validate_tau,
        validate_tau_against_dt,
    },
    errors::ParamResult,
};

/// Parameter record of the AR(1) calcium generative model.
///
/// The forward model is `C[i] = a·C[i−1] + n[i]` with decay factor
/// `a = 1 − dt/tau`, observed as `F[i] = C[i] + mu + sig·ε[i]` with standard
/// normal `ε`, under an exponential sparsity prior with weight `lam` on the
/// spike vector `n`.
///
/// Construct with [`DeconvParams::new`] to validate inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeconvParams {
    /// Calcium decay time constant in seconds (> 0, finite).
    pub tau: f64,
    /// Sparsity prior weight (> 0, finite).
    pub lam: f64,
    /// Observation-noise standard deviation (> 0, finite).
    pub sig: f64,
    /// Additive baseline offset (finite).
    pub mu: f64,
}

impl DeconvParams {
    /// Construct a validated parameter record.
    ///
    /// # Errors
    /// - [`ParamError::InvalidTau`] if `tau` is non-finite or ≤ 0,
    /// - [`ParamError::InvalidLambda`] if `lam` is non-finite or ≤ 0,
    /// - [`ParamError::InvalidSigma`] if `sig` is non-finite or ≤ 0,
    /// - [`ParamError::InvalidBaseline`] if `mu` is non-finite.
    ///
    /// [`ParamError::InvalidTau`]: crate::deconvolution::errors::ParamError::InvalidTau
    /// [`ParamError::InvalidLambda`]: crate::deconvolution::errors::ParamError::InvalidLambda
    /// [`ParamError::InvalidSigma`]: crate::deconvolution::errors::ParamError::InvalidSigma
    /// [`ParamError::InvalidBaseline`]: crate::deconvolution::errors::ParamError::InvalidBaseline
    pub fn new(tau: f64, lam: f64, sig: f64, mu: f64) -> ParamResult<Self> {
        validate_tau(tau)?;
        validate_lambda(lam)?;
        validate_sigma(sig)?;
        validate_baseline(mu)?;
        Ok(DeconvParams { tau, lam, sig, mu })
    }

    /// Check that this record is compatible with a given sample interval,
    /// i.e. `tau > dt`.
    ///
    /// # Errors
    /// [`ParamError::TauNotAboveDt`] when the decay factor would leave (0, 1).
    ///
    /// [`ParamError::TauNotAboveDt`]: crate::deconvolution::errors::ParamError::TauNotAboveDt
    pub fn check_against_dt(&self, dt: f64) -> ParamResult<()> {
        validate_tau_against_dt(self.tau, dt)
    }

    /// Per-step decay factor `a = 1 − dt/tau`.
    ///
    /// Lies in (0, 1) whenever `tau > dt`; estimator-produced records may
    /// yield 0 exactly (`tau == dt`), which the operator tolerates.
    pub fn decay_factor(&self, dt: f64) -> f64 {
        1.0 - dt / self.tau
    }

    /// Gaussian precision-like weight `c = 1 / (2·sig²)` used by the solver
    /// objective.
    pub fn residual_weight(&self) -> f64 {
        1.0 / (2.0 * self.sig * self.sig)
    }
}
