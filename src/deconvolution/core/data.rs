//! Fluorescence trace container for deconvolution.
//!
//! Purpose
//! -------
//! Provide a small, validated container for a single-neuron fluorescence
//! series and its sample interval. This module centralizes input validation
//! for raw traces so downstream code can assume clean, finite data of
//! workable length.
//!
//! Key behaviors
//! -------------
//! - [`FluorTrace`] enforces basic data invariants (at least four samples,
//!   finite values, strictly positive sample interval).
//! - The raw samples are exposed read-only; the core never rescales or
//!   mean-subtracts them. Scale and offset of the recording are absorbed by
//!   the noise level `sig` and the baseline `mu` of the parameter record.
//!
//! Invariants & assumptions
//! ------------------------
//! - `data.len() >= 4` and every sample is finite.
//! - `dt` is finite and strictly positive, in seconds.
//!
//! Downstream usage
//! ----------------
//! - Construct [`FluorTrace`] at the Rust boundary where raw fluorescence
//!   enters the deconvolution stack; consumers may rely on its invariants
//!   without re-validating.
use crate::deconvolution::{
    core::validation::{validate_sample_interval, validate_trace},
    errors::DeconvResult,
};
use ndarray::{Array1, ArrayView1};

/// Validated single-neuron fluorescence series plus its sample interval.
///
/// Stores raw fluorescence observations as an `ndarray::Array1<f64>` along
/// with the uniform sample interval `dt` (seconds). Construction via
/// [`FluorTrace::new`] enforces finiteness and a minimum length of four
/// samples; after that this type is a lightweight read-only container.
#[derive(Debug, Clone, PartialEq)]
pub struct FluorTrace {
    /// Observed fluorescence samples (finite, length ≥ 4).
    data: Array1<f64>,
    /// Uniform sample interval in seconds (finite, > 0).
    dt: f64,
}

impl FluorTrace {
    /// Construct a validated [`FluorTrace`] from a raw series.
    ///
    /// # Arguments
    /// - `data`: raw fluorescence samples; must be finite with length ≥ 4.
    /// - `dt`: uniform sample interval in seconds; must be finite and > 0.
    ///
    /// # Errors
    /// - [`DeconvError::EmptyTrace`] / [`DeconvError::TraceTooShort`] /
    ///   [`DeconvError::NonFiniteSample`] on data violations,
    /// - [`DeconvError::InvalidSampleInterval`] if `dt` is out of domain.
    ///
    /// [`DeconvError::EmptyTrace`]: crate::deconvolution::errors::DeconvError::EmptyTrace
    /// [`DeconvError::TraceTooShort`]: crate::deconvolution::errors::DeconvError::TraceTooShort
    /// [`DeconvError::NonFiniteSample`]: crate::deconvolution::errors::DeconvError::NonFiniteSample
    /// [`DeconvError::InvalidSampleInterval`]: crate::deconvolution::errors::DeconvError::InvalidSampleInterval
    pub fn new(data: Array1<f64>, dt: f64) -> DeconvResult<Self> {
        validate_trace(data.view())?;
        validate_sample_interval(dt)?;
        Ok(FluorTrace { data, dt })
    }

    /// Construct a validated trace from a slice, copying the samples once.
    pub fn from_slice(data: &[f64], dt: f64) -> DeconvResult<Self> {
        FluorTrace::new(Array1::from(data.to_vec()), dt)
    }

    /// Read-only view of the samples.
    pub fn data(&self) -> ArrayView1<'_, f64> {
        self.data.view()
    }

    /// Number of samples `T`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false` for a constructed trace; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify the happy path: a finite series of length ≥ 4 with a positive
    // sample interval constructs, and the accessors echo the inputs.
    fn new_accepts_valid_series() {
        // Arrange
        let raw = array![1.0, 2.0, 1.5, 1.25, 1.1];

        // Act
        let trace = FluorTrace::new(raw.clone(), 1.0 / 30.0)
            .expect("construction should succeed for finite data and positive dt");

        // Assert
        assert_eq!(trace.len(), 5);
        assert!(!trace.is_empty());
        assert_eq!(trace.data(), raw.view());
        assert_eq!(trace.dt(), 1.0 / 30.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that short series, non-finite samples, and non-positive sample
    // intervals are rejected rather than silently accepted.
    fn new_rejects_invalid_inputs() {
        assert!(FluorTrace::new(array![1.0, 2.0, 3.0], 0.1).is_err());
        assert!(FluorTrace::new(array![1.0, f64::INFINITY, 3.0, 4.0], 0.1).is_err());
        assert!(FluorTrace::new(array![1.0, 2.0, 3.0, 4.0], 0.0).is_err());
        assert!(FluorTrace::new(array![1.0, 2.0, 3.0, 4.0], -0.1).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Verify that `from_slice` copies the data and applies the same checks
    // as `new`.
    fn from_slice_round_trips() {
        let trace = FluorTrace::from_slice(&[0.5, 0.4, 0.3, 0.2], 0.05)
            .expect("slice construction should succeed");
        assert_eq!(trace.data().to_vec(), vec![0.5, 0.4, 0.3, 0.2]);
        assert!(FluorTrace::from_slice(&[0.5, f64::NAN, 0.3, 0.2], 0.05).is_err());
    }
}
