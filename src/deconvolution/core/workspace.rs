//! Preallocated solver workspace.
//!
//! Inner Newton iterations easily number in the hundreds per trace, so every
//! length-T buffer the solver touches is allocated once per model and reused:
//! the current iterate (calcium and spikes), the residual, gradient and
//! Newton direction, the step image `M·d`, the trial iterate for the line
//! search, the two Hessian bands, and the elimination multipliers of the
//! tridiagonal solve. Nothing inside the Newton loop allocates.
//!
//! ## Why a workspace?
//! Each candidate Newton step must not allocate or clone. The driver owns
//! one [`DeconvScratch`] and threads `&mut` access through the inner
//! solver; after convergence the outcome copies the final buffers once.
use ndarray::Array1;

/// Mutable, reusable buffers for one deconvolution run.
///
/// All vectors have the trace length `T`. The buffers carry no invariants of
/// their own; the solver establishes and maintains the relationship
/// `spikes = M·calcium` at every committed iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct DeconvScratch {
    /// Current calcium iterate `C`.
    pub calcium: Array1<f64>,
    /// Current spike iterate `n = M·C`.
    pub spikes: Array1<f64>,
    /// Observation residual `F − C − μ`.
    pub resid: Array1<f64>,
    /// Objective gradient `g`.
    pub grad: Array1<f64>,
    /// Newton direction `d`.
    pub direction: Array1<f64>,
    /// Spike-space step image `M·d` (feasibility cap input).
    pub step_spikes: Array1<f64>,
    /// Line-search trial calcium `C + s·d`.
    pub trial_calcium: Array1<f64>,
    /// Line-search trial spikes `M·(C + s·d)`.
    pub trial_spikes: Array1<f64>,
    /// Hessian main diagonal.
    pub hess_diag: Array1<f64>,
    /// Hessian off-diagonal (last entry unused).
    pub hess_off: Array1<f64>,
    /// Elimination multipliers of the tridiagonal solve.
    pub tri_mult: Array1<f64>,
}

impl DeconvScratch {
    /// Allocate zeroed buffers for a trace of length `n`.
    pub fn new(n: usize) -> Self {
        DeconvScratch {
            calcium: Array1::zeros(n),
            spikes: Array1::zeros(n),
            resid: Array1::zeros(n),
            grad: Array1::zeros(n),
            direction: Array1::zeros(n),
            step_spikes: Array1::zeros(n),
            trial_calcium: Array1::zeros(n),
            trial_spikes: Array1::zeros(n),
            hess_diag: Array1::zeros(n),
            hess_off: Array1::zeros(n),
            tri_mult: Array1::zeros(n),
        }
    }

    /// Trace length the buffers were sized for.
    pub fn len(&self) -> usize {
        self.calcium.len()
    }

    /// True only for zero-length buffers, which no validated trace produces.
    pub fn is_empty(&self) -> bool {
        self.calcium.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify all buffers are sized to the requested length and start zeroed.
    fn new_sizes_all_buffers() {
        let scratch = DeconvScratch::new(7);
        assert_eq!(scratch.len(), 7);
        assert!(!scratch.is_empty());
        for buf in [
            &scratch.calcium,
            &scratch.spikes,
            &scratch.resid,
            &scratch.grad,
            &scratch.direction,
            &scratch.step_spikes,
            &scratch.trial_calcium,
            &scratch.trial_spikes,
            &scratch.hess_diag,
            &scratch.hess_off,
            &scratch.tri_mult,
        ] {
            assert_eq!(buf.len(), 7);
            assert!(buf.iter().all(|&v| v == 0.0));
        }
    }
}
