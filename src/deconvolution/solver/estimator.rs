//! Closed-form parameter re-estimation and the negative log-likelihood.
//!
//! Given a committed calcium/spike pair, the generative parameters admit
//! closed-form conditional updates — no iterative optimisation is involved:
//!
//! - **Decay / tau.** One-step-ahead least squares of the shifted
//!   fluorescence residual on the previous calcium:
//!   `â = (W·Y)/(W·W)` with `W = C[0..T−1]`, `Y = F[1..] − n[1..]`, clamped
//!   to [0, 1], then `tau = dt / (1 − â)` with the denominator floored so
//!   `tau` stays finite as `â → 1`.
//! - **Noise / sig.** Residual root mean square `√(‖F − C − μ‖²/T)`, floored
//!   at the configured `sigma_floor` so the precision weight `1/(2σ²)` stays
//!   finite.
//! - **Baseline / mu.** Fixed by default; the `estimate_mu` opt-in replaces
//!   it with `mean(F − C)`.
//! - **Sparsity / lam.** Never re-estimated; it is a prior hyperparameter.
//!
//! The negative log-likelihood combines the Gaussian observation block
//! (evaluated through `statrs`' normal density) with the spiking prior block
//! `− T·log(λ·dt) + λ_eff·Σn`.
use crate::deconvolution::{
    core::{data::FluorTrace, options::DeconvOptions, params::DeconvParams},
    errors::{DeconvResult, ParamError},
};
use ndarray::ArrayView1;
use statrs::distribution::{Continuous, Normal};

/// Floor on `1 − â` when mapping the decay factor back to a time constant;
/// caps `tau` at `dt·1e12` instead of overflowing to infinity.
const TAU_DENOM_FLOOR: f64 = 1e-12;

/// Update `params` in place from a committed `(C, n)` pair.
///
/// Only the fields selected by the options are touched; the baseline is
/// re-estimated first (when enabled) so the noise update sees the current
/// offset. Outputs are clamped at the source (`â ∈ [0, 1]`,
/// `sig ≥ sigma_floor`), so the mutated record needs no re-validation. A
/// degenerate decay regression (`W·W = 0` or a non-finite ratio) leaves
/// `tau` unchanged.
pub fn estimate_params(
    trace: &FluorTrace, calcium: ArrayView1<f64>, spikes: ArrayView1<f64>,
    params: &mut DeconvParams, options: &DeconvOptions,
) {
    let t = trace.len();
    let fluor = trace.data();

    if options.estimate_mu {
        let mut acc = 0.0;
        for i in 0..t {
            acc += fluor[i] - calcium[i];
        }
        params.mu = acc / t as f64;
    }

    if options.estimate_tau {
        let mut wy = 0.0;
        let mut ww = 0.0;
        for i in 0..t - 1 {
            let w = calcium[i];
            let y = fluor[i + 1] - spikes[i + 1];
            wy += w * y;
            ww += w * w;
        }
        let a_hat = wy / ww;
        if a_hat.is_finite() {
            let a_hat = a_hat.clamp(0.0, 1.0);
            params.tau = trace.dt() / (1.0 - a_hat).max(TAU_DENOM_FLOOR);
        }
    }

    if options.estimate_sig {
        let mut ss = 0.0;
        for i in 0..t {
            let r = fluor[i] - calcium[i] - params.mu;
            ss += r * r;
        }
        params.sig = (ss / t as f64).sqrt().max(options.sigma_floor);
    }
}

/// Negative log-likelihood of a committed `(C, n)` pair at `params`:
///
///   ½·T·log(2πσ²) + ‖F − C − μ‖²/(2σ²) − T·log(λ·dt) + λ_eff·Σn
///
/// where `λ_eff` is `λ`, or `λ·dt` under the dt-scaling switch. The Gaussian
/// block is accumulated through the normal log-density so the constant and
/// quadratic terms stay consistent by construction.
///
/// # Errors
/// [`ParamError::InvalidSigma`] if the noise level is rejected by the
/// density constructor; unreachable for records produced by
/// [`DeconvParams::new`] or [`estimate_params`].
pub fn neg_log_likelihood(
    trace: &FluorTrace, calcium: ArrayView1<f64>, spikes: ArrayView1<f64>,
    params: &DeconvParams, options: &DeconvOptions,
) -> DeconvResult<f64> {
    let t = trace.len();
    let fluor = trace.data();
    let lam_eff =
        if options.scale_lambda_by_dt { params.lam * trace.dt() } else { params.lam };
    let noise = Normal::new(0.0, params.sig)
        .map_err(|_| ParamError::InvalidSigma { value: params.sig })?;

    let mut gauss = 0.0;
    let mut total_spike = 0.0;
    for i in 0..t {
        gauss += noise.ln_pdf(fluor[i] - calcium[i] - params.mu);
        total_spike += spikes[i];
    }
    let prior = -(t as f64) * (params.lam * trace.dt()).ln() + lam_eff * total_spike;
    Ok(-gauss + prior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deconvolution::core::options::DeconvOptions;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery of the decay factor from noiseless AR(1) data.
    // - The sigma floor and the residual RMS formula.
    // - The opt-in baseline update.
    // - The NLL against its closed form, and its response to the dt-scaling
    //   switch.
    // -------------------------------------------------------------------------

    fn ar1_pair(t: usize, a: f64) -> (Array1<f64>, Array1<f64>) {
        let mut spikes = Array1::zeros(t);
        for i in (5..t).step_by(17) {
            spikes[i] = 1.0;
        }
        let mut calcium = Array1::zeros(t);
        calcium[0] = spikes[0];
        for i in 1..t {
            calcium[i] = a * calcium[i - 1] + spikes[i];
        }
        (calcium, spikes)
    }

    #[test]
    // Purpose
    // -------
    // With F = C exactly and n the true innovation sequence, the decay
    // regression must recover the generative factor (and hence tau) to
    // machine precision, and the noise update must hit the floor.
    fn noiseless_ar1_recovers_decay_and_floors_sigma() {
        // Arrange
        let dt = 1.0 / 30.0;
        let a_true = 0.88;
        let (calcium, spikes) = ar1_pair(120, a_true);
        let trace = FluorTrace::new(calcium.clone(), dt).unwrap();
        let mut params = DeconvParams::new(0.2, 5.0, 0.05, 0.0).unwrap();
        let options = DeconvOptions::default();

        // Act
        estimate_params(&trace, calcium.view(), spikes.view(), &mut params, &options);

        // Assert
        let a_hat = 1.0 - dt / params.tau;
        assert_relative_eq!(a_hat, a_true, epsilon = 1e-10);
        assert_eq!(params.sig, options.sigma_floor);
        // Baseline untouched without the opt-in.
        assert_eq!(params.mu, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // The opt-in baseline update must return mean(F − C), and the noise
    // update must then see the refreshed offset.
    fn baseline_opt_in_recenters_before_sigma() {
        // Arrange
        let dt = 0.05;
        let (calcium, spikes) = ar1_pair(80, 0.7);
        let fluor = calcium.mapv(|v| v + 1.25);
        let trace = FluorTrace::new(fluor, dt).unwrap();
        let mut params = DeconvParams::new(0.2, 5.0, 0.05, 0.0).unwrap();
        let mut options = DeconvOptions::default();
        options.estimate_mu = true;

        // Act
        estimate_params(&trace, calcium.view(), spikes.view(), &mut params, &options);

        // Assert
        assert_relative_eq!(params.mu, 1.25, epsilon = 1e-12);
        assert_eq!(params.sig, options.sigma_floor);
    }

    #[test]
    // Purpose
    // -------
    // A flat calcium estimate makes the regression degenerate (W·W = 0);
    // tau must pass through unchanged rather than becoming NaN.
    fn degenerate_regression_leaves_tau_unchanged() {
        // Arrange
        let trace = FluorTrace::from_slice(&[1.0, 1.1, 0.9, 1.0, 1.05], 0.1).unwrap();
        let calcium = Array1::zeros(5);
        let spikes = Array1::zeros(5);
        let mut params = DeconvParams::new(0.42, 5.0, 0.05, 0.0).unwrap();
        let options = DeconvOptions::default();

        // Act
        estimate_params(&trace, calcium.view(), spikes.view(), &mut params, &options);

        // Assert
        assert_eq!(params.tau, 0.42);
    }

    #[test]
    // Purpose
    // -------
    // The NLL must match its closed form
    // ½T·log(2πσ²) + ‖D‖²/(2σ²) − T·log(λ·dt) + λ·Σn
    // on a small hand-computable case.
    fn nll_matches_closed_form() {
        // Arrange
        let dt = 0.1;
        let trace = FluorTrace::from_slice(&[1.0, 2.0, 1.5, 1.2], dt).unwrap();
        let calcium = Array1::from(vec![0.8, 1.9, 1.6, 1.0]);
        let spikes = Array1::from(vec![0.8, 1.5, 0.65, 0.2]);
        let params = DeconvParams::new(0.5, 5.0, 0.2, 0.1).unwrap();
        let options = DeconvOptions::default();

        // Act
        let nll = neg_log_likelihood(&trace, calcium.view(), spikes.view(), &params, &options)
            .expect("valid sigma");

        // Assert
        let t = 4.0;
        let sig2 = 0.2 * 0.2;
        let ss: f64 = (0..4)
            .map(|i| {
                let r = trace.data()[i] - calcium[i] - 0.1;
                r * r
            })
            .sum();
        let expected = 0.5 * t * (2.0 * std::f64::consts::PI * sig2).ln() + ss / (2.0 * sig2)
            - t * (5.0_f64 * dt).ln()
            + 5.0 * spikes.sum();
        assert_relative_eq!(nll, expected, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // The dt-scaling switch must scale only the Σn penalty block, shifting
    // the NLL by exactly λ·(dt − 1)·Σn.
    fn dt_scaling_switch_shifts_penalty_block() {
        // Arrange
        let dt = 0.1;
        let trace = FluorTrace::from_slice(&[1.0, 2.0, 1.5, 1.2], dt).unwrap();
        let calcium = Array1::from(vec![0.8, 1.9, 1.6, 1.0]);
        let spikes = Array1::from(vec![0.8, 1.5, 0.65, 0.2]);
        let params = DeconvParams::new(0.5, 5.0, 0.2, 0.1).unwrap();
        let mut options = DeconvOptions::default();

        // Act
        let plain = neg_log_likelihood(&trace, calcium.view(), spikes.view(), &params, &options)
            .unwrap();
        options.scale_lambda_by_dt = true;
        let scaled = neg_log_likelihood(&trace, calcium.view(), spikes.view(), &params, &options)
            .unwrap();

        // Assert
        let shift = 5.0 * (dt - 1.0) * spikes.sum();
        assert_relative_eq!(scaled - plain, shift, epsilon = 1e-10);
    }
}
