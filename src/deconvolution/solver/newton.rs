//! Interior-point Newton inner solver.
//!
//! For fixed parameters the MAP calcium trace minimises the barrier-augmented
//! objective
//!
//!   L(C; η) = c·‖F − C − μ‖² + λ·Σᵢ n[i] − η·Σᵢ log n[i],   n = M·C,
//!
//! with `c = 1/(2σ²)`. The `−η·log n` term is a self-concordant barrier that
//! softens the `n ≥ 0` constraint and keeps the Hessian strictly positive
//! definite on the feasible interior, so each Newton step is well defined and
//! reduces to one O(T) tridiagonal solve.
//!
//! ## Structure
//! - **Barrier continuation.** Starting at `η = eta_init`, run the Newton
//!   loop to (loose) convergence, multiply `η` by `eta_decay`, and repeat
//!   until `η` falls below `eta_floor`. At exit the spike entries sit near
//!   the final `η`, i.e. effectively at zero where no spike is present.
//! - **Newton loop.** While the direction norm exceeds `dir_tol` and the
//!   last accepted step exceeds `step_floor`: form the residual, gradient,
//!   and tridiagonal Hessian; solve for the direction; cap the step at 99 %
//!   of the distance to the spike-positivity boundary; then backtrack by
//!   halving until the objective stops increasing beyond `armijo_slack`.
//! - A line search that collapses below the step floor without a decrease is
//!   not an error: the current iterate is kept and the continuation moves to
//!   the next barrier stage.
//!
//! ## Failure modes
//! - A pivot ≤ 0 in the tridiagonal solve surfaces as
//!   [`DeconvError::NotPositiveDefinite`].
//! - Non-finite committed objectives or iterates surface as
//!   [`DeconvError::NonFiniteObjective`] / [`DeconvError::NonFiniteIterate`].
//!
//! All length-T state lives in the caller's [`DeconvScratch`]; this module
//! allocates nothing.
use crate::deconvolution::{
    core::{
        data::FluorTrace, operator::SpikeOperator, options::DeconvOptions,
        params::DeconvParams, workspace::DeconvScratch,
    },
    errors::{DeconvError, DeconvResult},
};
use ndarray::ArrayView1;

/// Run the full barrier continuation for fixed parameters.
///
/// On entry the previous contents of the scratch iterate are discarded: the
/// spike buffer is reset to the strictly positive constant `η₀/λ` and the
/// calcium buffer to the AR(1) filter of it (the unique solution of
/// `M·C = n`). On successful return `scratch.calcium` and `scratch.spikes`
/// hold the committed MAP iterate with `spikes = M·calcium`.
///
/// # Errors
/// Propagates the numerical breakdowns documented at module level. The
/// scratch buffers then hold the last committed iterate, which the driver
/// may still report as its best-so-far.
pub fn interior_point_solve(
    trace: &FluorTrace, params: &DeconvParams, options: &DeconvOptions, op: &SpikeOperator,
    scratch: &mut DeconvScratch,
) -> DeconvResult<()> {
    let lam_eff = effective_lambda(params, trace.dt(), options);
    let c = params.residual_weight();
    let mut eta = options.barrier.eta_init;

    scratch.spikes.fill(eta / lam_eff);
    op.filter_into(scratch.spikes.view(), scratch.calcium.view_mut());

    loop {
        newton_stage(trace, params.mu, c, lam_eff, eta, op, options, scratch)?;
        eta *= options.barrier.eta_decay;
        if eta < options.barrier.eta_floor {
            break;
        }
    }
    Ok(())
}

/// Effective sparsity weight: `λ`, or `λ·dt` when the dt-scaling switch is
/// on.
pub fn effective_lambda(params: &DeconvParams, dt: f64, options: &DeconvOptions) -> f64 {
    if options.scale_lambda_by_dt { params.lam * dt } else { params.lam }
}

/// Barrier-augmented objective at a candidate iterate.
///
/// Returns `+∞` when any spike entry is on or below the boundary, so the
/// backtracking line search rejects infeasible trials without special
/// casing.
pub fn stage_objective(
    fluor: ArrayView1<f64>, calcium: ArrayView1<f64>, spikes: ArrayView1<f64>, mu: f64, c: f64,
    lam_eff: f64, eta: f64,
) -> f64 {
    let mut quad = 0.0;
    let mut penalty = 0.0;
    let mut barrier = 0.0;
    for i in 0..fluor.len() {
        let r = fluor[i] - calcium[i] - mu;
        quad += r * r;
        let n = spikes[i];
        if n <= 0.0 {
            return f64::INFINITY;
        }
        penalty += n;
        barrier += n.ln();
    }
    c * quad + lam_eff * penalty - eta * barrier
}

/// One Newton loop at a fixed barrier weight.
#[allow(clippy::too_many_arguments)]
fn newton_stage(
    trace: &FluorTrace, mu: f64, c: f64, lam_eff: f64, eta: f64, op: &SpikeOperator,
    options: &DeconvOptions, scratch: &mut DeconvScratch,
) -> DeconvResult<()> {
    let t = trace.len();
    let fluor = trace.data();
    let tols = options.newton;
    let a = op.decay();

    let mut objective = stage_objective(
        fluor,
        scratch.calcium.view(),
        scratch.spikes.view(),
        mu,
        c,
        lam_eff,
        eta,
    );
    if !objective.is_finite() {
        return Err(DeconvError::NonFiniteObjective { value: objective });
    }

    let mut dir_norm = f64::INFINITY;
    let mut step = 1.0;
    while dir_norm > tols.dir_tol && step > tols.step_floor {
        // Residual D = F − C − μ and gradient
        // g = −2c·D + λ·colsum(M) − η·M'·(1/n).
        for i in 0..t {
            scratch.resid[i] = fluor[i] - scratch.calcium[i] - mu;
        }
        for i in 0..t {
            let barrier_pull = if i + 1 < t {
                1.0 / scratch.spikes[i] - a / scratch.spikes[i + 1]
            } else {
                1.0 / scratch.spikes[i]
            };
            let g = -2.0 * c * scratch.resid[i] + lam_eff * op.col_sum(i) - eta * barrier_pull;
            if !g.is_finite() {
                return Err(DeconvError::NonFiniteIterate { index: i, value: g });
            }
            scratch.grad[i] = g;
            scratch.direction[i] = -g;
        }

        op.assemble_hessian_into(
            c,
            eta,
            scratch.spikes.view(),
            scratch.hess_diag.view_mut(),
            scratch.hess_off.view_mut(),
        )?;
        super::tridiagonal::solve_spd_tridiagonal(
            scratch.hess_diag.view_mut(),
            scratch.hess_off.view(),
            scratch.direction.view_mut(),
            scratch.tri_mult.view_mut(),
        )?;
        dir_norm = scratch.direction.dot(&scratch.direction).sqrt();

        // Feasibility cap: the largest s in (0, 1] keeping n + s·(M·d) > 0,
        // backed off to 99 % of the boundary hit.
        op.apply(scratch.direction.view(), scratch.step_spikes.view_mut());
        let mut hit = f64::INFINITY;
        for i in 0..t {
            if scratch.step_spikes[i] < 0.0 {
                let h = -scratch.spikes[i] / scratch.step_spikes[i];
                if h < hit {
                    hit = h;
                }
            }
        }
        let mut s = if hit.is_finite() { (0.99 * hit).min(1.0) } else { 1.0 };

        // Backtracking: halve until the objective stops increasing beyond
        // the slack, or the step floor is reached.
        let mut accepted = None;
        while s >= tols.step_floor {
            for i in 0..t {
                scratch.trial_calcium[i] = scratch.calcium[i] + s * scratch.direction[i];
            }
            op.apply(scratch.trial_calcium.view(), scratch.trial_spikes.view_mut());
            let trial_objective = stage_objective(
                fluor,
                scratch.trial_calcium.view(),
                scratch.trial_spikes.view(),
                mu,
                c,
                lam_eff,
                eta,
            );
            if trial_objective < objective + tols.armijo_slack {
                accepted = Some(trial_objective);
                break;
            }
            s *= 0.5;
        }
        step = s;
        let new_objective = match accepted {
            Some(value) => value,
            // Step floor reached without decrease: keep the current iterate
            // and hand control back to the continuation.
            None => break,
        };

        for i in 0..t {
            let value = scratch.trial_calcium[i];
            if !value.is_finite() {
                return Err(DeconvError::NonFiniteIterate { index: i, value });
            }
        }
        scratch.calcium.assign(&scratch.trial_calcium);
        scratch.spikes.assign(&scratch.trial_spikes);
        objective = new_objective;
        if !objective.is_finite() {
            return Err(DeconvError::NonFiniteObjective { value: objective });
        }
    }
    Ok(())
}
