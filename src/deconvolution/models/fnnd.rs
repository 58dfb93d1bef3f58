//! Fast non-negative deconvolution model: the outer inference loop.
//!
//! This module wires the interior-point inner solver and the closed-form
//! parameter estimator into an expectation–maximisation-style driver. Each
//! outer iteration runs the inner solver at the current parameters, applies
//! the selected closed-form updates, and records the negative
//! log-likelihood.
//!
//! Key ideas:
//! - The surrogate objective is **not monotone across outer iterations**:
//!   re-estimating `tau` and `sig` jointly changes the residual weight and
//!   the barrier landscape, so the driver keeps the best `(params, spikes)`
//!   pair seen at the lowest NLL rather than trusting the last iterate.
//! - Exhausting the iteration budget is advisory, not fatal: the outcome is
//!   returned with `converged = false` and a status string.
//! - A numerical breakdown mid-run truncates the loop but still returns the
//!   best iterate seen so far, with the error preserved in the outcome.
//! - All length-T state lives in the model's preallocated scratch buffers;
//!   an outer iteration allocates only when a new best iterate is copied
//!   out.
use crate::deconvolution::{
    core::{
        data::FluorTrace, operator::SpikeOperator, options::DeconvOptions,
        params::DeconvParams, workspace::DeconvScratch,
    },
    errors::{DeconvError, DeconvResult},
    solver::{
        estimator::{estimate_params, neg_log_likelihood},
        newton::{effective_lambda, interior_point_solve},
    },
};
use ndarray::Array1;

/// Result of one deconvolution run.
///
/// - `spikes` / `calcium`: the best iterate seen (lowest NLL), same length
///   as the input trace.
/// - `params`: the parameter record at that iterate.
/// - `nll`: the best negative log-likelihood.
/// - `nll_trace`: NLL per outer step, starting with the pre-solve value at
///   the initial iterate.
/// - `iterations`: number of completed outer iterations.
/// - `converged`: whether the outer stopping rule (`|ΔNLL| < tol`) fired;
///   single-run configurations report `true`.
/// - `status`: human-readable termination summary.
/// - `breakdown`: the numerical error that truncated the run, if any. The
///   returned iterate is still the best one seen before the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct InferOutcome {
    pub spikes: Array1<f64>,
    pub calcium: Array1<f64>,
    pub params: DeconvParams,
    pub nll: f64,
    pub nll_trace: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub status: String,
    pub breakdown: Option<DeconvError>,
}

/// Fast non-negative deconvolution of a fluorescence trace.
///
/// Owns the initial parameter record, the run options, and the preallocated
/// scratch buffers reused across inner iterations. After a call to
/// [`infer`], [`results`] holds the last outcome.
///
/// # Notes
/// - The model is single-threaded and pure: identical inputs produce
///   bitwise-identical outputs. Run one model per neuron for parallel
///   deployments.
/// - `infer` may be called repeatedly; buffers are resized only when the
///   trace length changes.
///
/// [`infer`]: FnndModel::infer
/// [`results`]: FnndModel::results
#[derive(Debug, Clone, PartialEq)]
pub struct FnndModel {
    /// Initial generative parameters (not mutated by `infer`).
    pub params: DeconvParams,
    /// Run options.
    pub options: DeconvOptions,
    /// Workspace buffers.
    scratch: DeconvScratch,
    /// Last inference outcome (populated after `infer`).
    pub results: Option<InferOutcome>,
}

impl FnndModel {
    /// Construct a model with scratch buffers sized for traces of length
    /// `n`.
    ///
    /// The parameter record and options are assumed to have been built
    /// through their validating constructors; the `tau > dt` cross-check
    /// happens in [`infer`] where the trace supplies `dt`.
    ///
    /// [`infer`]: FnndModel::infer
    pub fn new(n: usize, params: DeconvParams, options: DeconvOptions) -> FnndModel {
        FnndModel { params, options, scratch: DeconvScratch::new(n), results: None }
    }

    /// Infer the spike train behind `trace` and re-estimate parameters.
    ///
    /// ## Steps
    /// 1. Cross-check `params.tau` against `trace.dt()`.
    /// 2. Evaluate the NLL at the inner solver's initial iterate
    ///    (`n ≡ η₀/λ`, `C = M⁻¹·n`).
    /// 3. For each outer iteration: run the barrier continuation, apply the
    ///    selected closed-form updates, evaluate the NLL at the updated
    ///    parameters, and keep the lowest-NLL iterate.
    /// 4. Stop when `|NLL(i) − NLL(i−1)| < tol`, the iteration budget is
    ///    exhausted, or a numerical breakdown occurs.
    ///
    /// With `max_iter = 0` or all estimation flags off, the inner solver
    /// runs exactly once and the outcome reports `converged = true`.
    ///
    /// ## Errors
    /// - [`ParamError::TauNotAboveDt`] if the record is incompatible with
    ///   the trace's sample interval.
    ///
    /// Numerical breakdowns do **not** surface as `Err`: they truncate the
    /// loop and travel in [`InferOutcome::breakdown`] so the best iterate
    /// remains available.
    ///
    /// [`ParamError::TauNotAboveDt`]: crate::deconvolution::errors::ParamError::TauNotAboveDt
    pub fn infer(&mut self, trace: &FluorTrace) -> DeconvResult<InferOutcome> {
        let t = trace.len();
        let dt = trace.dt();
        self.params.check_against_dt(dt)?;
        if self.scratch.len() != t {
            self.scratch = DeconvScratch::new(t);
        }

        let mut params = self.params;
        let mut op = SpikeOperator::new(t, params.decay_factor(dt));

        // NLL at the solver's initial iterate, seeding the stopping rule.
        let lam_eff = effective_lambda(&params, dt, &self.options);
        self.scratch.spikes.fill(self.options.barrier.eta_init / lam_eff);
        op.filter_into(self.scratch.spikes.view(), self.scratch.calcium.view_mut());
        let mut prev_nll = neg_log_likelihood(
            trace,
            self.scratch.calcium.view(),
            self.scratch.spikes.view(),
            &params,
            &self.options,
        )?;
        let mut nll_trace = vec![prev_nll];
        if self.options.verbose {
            eprintln!("fnnd: initial nll = {prev_nll:.6e}");
        }

        let updates = self.options.updates_params();
        let outer_iters = if updates { self.options.max_iter } else { 1 };

        let mut best_nll = f64::INFINITY;
        let mut best_params = params;
        let mut best_spikes = Array1::zeros(t);
        let mut best_calcium = Array1::zeros(t);
        let mut iterations = 0;
        let mut converged = false;
        let mut breakdown = None;

        for i in 1..=outer_iters {
            if let Err(err) =
                interior_point_solve(trace, &params, &self.options, &op, &mut self.scratch)
            {
                breakdown = Some(err);
                break;
            }
            iterations = i;

            if updates {
                estimate_params(
                    trace,
                    self.scratch.calcium.view(),
                    self.scratch.spikes.view(),
                    &mut params,
                    &self.options,
                );
                op.set_decay(params.decay_factor(dt));
            }
            let nll = neg_log_likelihood(
                trace,
                self.scratch.calcium.view(),
                self.scratch.spikes.view(),
                &params,
                &self.options,
            )?;
            if !nll.is_finite() {
                breakdown = Some(DeconvError::NonFiniteObjective { value: nll });
                break;
            }
            nll_trace.push(nll);
            if self.options.verbose {
                eprintln!("fnnd: iteration {i}: nll = {nll:.6e}");
            }

            if nll < best_nll {
                best_nll = nll;
                best_params = params;
                best_spikes.assign(&self.scratch.spikes);
                best_calcium.assign(&self.scratch.calcium);
            }
            if (nll - prev_nll).abs() < self.options.tol {
                converged = true;
                break;
            }
            prev_nll = nll;
        }

        if !best_nll.is_finite() {
            // Nothing was committed before a first-iteration breakdown; fall
            // back to the scratch contents so the caller still gets the last
            // interior iterate.
            best_params = params;
            best_spikes.assign(&self.scratch.spikes);
            best_calcium.assign(&self.scratch.calcium);
            best_nll = prev_nll;
        }

        let status = match (&breakdown, converged, updates) {
            (Some(err), _, _) => format!("numerical breakdown: {err}"),
            (None, true, true) => "outer loop converged".to_string(),
            (None, false, true) => {
                "maximum outer iterations reached without meeting tol".to_string()
            }
            (None, _, false) => "single inner solve completed".to_string(),
        };
        // Single-run configurations have no outer stopping rule to miss.
        let converged = converged || (!updates && breakdown.is_none());

        let outcome = InferOutcome {
            spikes: best_spikes,
            calcium: best_calcium,
            params: best_params,
            nll: best_nll,
            nll_trace,
            iterations,
            converged,
            status,
            breakdown,
        };
        self.results = Some(outcome.clone());
        Ok(outcome)
    }
}

/// One-shot convenience wrapper: build an [`FnndModel`] sized for `trace`
/// and run [`FnndModel::infer`] once.
pub fn deconvolve(
    trace: &FluorTrace, params: DeconvParams, options: DeconvOptions,
) -> DeconvResult<InferOutcome> {
    let mut model = FnndModel::new(trace.len(), params, options);
    model.infer(trace)
}
