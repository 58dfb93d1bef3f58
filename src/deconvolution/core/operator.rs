//! Bidiagonal spike operator and tridiagonal Hessian assembly.
//!
//! The spike-from-calcium linear map `n = M·C` has unit diagonal and `−a` on
//! the sub-diagonal, so the whole operator is two scalars plus a length. All
//! products (`M·v`, `M'·v`), the column sums, the AR(1) filter (`M⁻¹·n`), and
//! the Newton Hessian diagonals are specialised O(T) loops over `ndarray`
//! views; no sparse-matrix machinery is involved.
//!
//! ## Hessian
//! The barrier-augmented objective has Hessian
//! `H = 2c·I + 2η·M'·diag(n⁻²)·M`, which is symmetric tridiagonal:
//! - main diagonal `d[i] = 2c + 2η·(n[i]⁻² + a²·n[i+1]⁻²)`, the `a²` term
//!   dropped at `i = T−1`;
//! - off-diagonal  `e[i] = −2η·a·n[i+1]⁻²` for `i = 0..T−2`.
//!
//! Both bands are written analytically into caller-owned buffers so a Newton
//! step stays O(T) with zero allocation.
//!
//! ## Invariants (enforced here)
//! - All outputs are finite whenever the inputs are finite and every spike
//!   entry is strictly positive; assembly refuses non-positive spikes.
use crate::deconvolution::errors::{DeconvError, DeconvResult};
use ndarray::{ArrayView1, ArrayViewMut1};

/// The T×T bidiagonal map from calcium to spikes, stored as two scalars.
///
/// `M[i, i] = 1`, `M[i, i−1] = −decay`, all other entries zero. Replacing
/// the sub-diagonal scalar is O(1) via [`set_decay`], which the outer driver
/// uses after re-estimating the time constant.
///
/// [`set_decay`]: SpikeOperator::set_decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeOperator {
    /// Per-step decay factor `a` (in [0, 1) for a valid model).
    decay: f64,
    /// Order `T` of the operator.
    len: usize,
}

impl SpikeOperator {
    /// Construct the operator for a trace of length `len` with decay factor
    /// `decay`.
    pub fn new(len: usize, decay: f64) -> Self {
        SpikeOperator { decay, len }
    }

    /// Current decay factor.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Order of the operator.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True only for the degenerate zero-length operator, which no validated
    /// trace can produce.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the sub-diagonal scalar.
    pub fn set_decay(&mut self, decay: f64) {
        self.decay = decay;
    }

    /// Forward product `out ← M·v`: `out[0] = v[0]`,
    /// `out[i] = v[i] − a·v[i−1]` for `i ≥ 1`.
    pub fn apply(&self, v: ArrayView1<f64>, mut out: ArrayViewMut1<f64>) {
        debug_assert_eq!(v.len(), self.len);
        debug_assert_eq!(out.len(), self.len);
        out[0] = v[0];
        for i in 1..self.len {
            out[i] = v[i] - self.decay * v[i - 1];
        }
    }

    /// Transpose product `out ← M'·v`: `out[i] = v[i] − a·v[i+1]` for
    /// `i < T−1`, `out[T−1] = v[T−1]`.
    pub fn apply_transpose(&self, v: ArrayView1<f64>, mut out: ArrayViewMut1<f64>) {
        debug_assert_eq!(v.len(), self.len);
        debug_assert_eq!(out.len(), self.len);
        for i in 0..self.len - 1 {
            out[i] = v[i] - self.decay * v[i + 1];
        }
        out[self.len - 1] = v[self.len - 1];
    }

    /// Column sum of column `i`: `1 − a` everywhere except the last column,
    /// which has no row below and sums to `1`.
    pub fn col_sum(&self, i: usize) -> f64 {
        debug_assert!(i < self.len);
        if i == self.len - 1 { 1.0 } else { 1.0 - self.decay }
    }

    /// Solve `M·C = n` in place via the AR(1) recurrence
    /// `C[0] = n[0]`, `C[i] = a·C[i−1] + n[i]`.
    pub fn filter_into(&self, spikes: ArrayView1<f64>, mut calcium: ArrayViewMut1<f64>) {
        debug_assert_eq!(spikes.len(), self.len);
        debug_assert_eq!(calcium.len(), self.len);
        calcium[0] = spikes[0];
        for i in 1..self.len {
            calcium[i] = self.decay * calcium[i - 1] + spikes[i];
        }
    }

    /// Assemble the tridiagonal Newton Hessian
    /// `H = 2c·I + 2η·M'·diag(n⁻²)·M` into `diag` (length T) and `off`
    /// (length T, last entry unused and zeroed).
    ///
    /// # Errors
    /// [`DeconvError::SpikeNotPositive`] if any spike entry is ≤ 0; the
    /// barrier keeps iterates strictly interior, so this indicates a caller
    /// bug rather than an expected runtime condition.
    pub fn assemble_hessian_into(
        &self, c: f64, eta: f64, spikes: ArrayView1<f64>, mut diag: ArrayViewMut1<f64>,
        mut off: ArrayViewMut1<f64>,
    ) -> DeconvResult<()> {
        debug_assert_eq!(spikes.len(), self.len);
        debug_assert_eq!(diag.len(), self.len);
        debug_assert_eq!(off.len(), self.len);
        for (index, &value) in spikes.iter().enumerate() {
            if value <= 0.0 {
                return Err(DeconvError::SpikeNotPositive { index, value });
            }
        }
        let a = self.decay;
        let a2 = a * a;
        let last = self.len - 1;
        for i in 0..last {
            let w_i = 1.0 / (spikes[i] * spikes[i]);
            let w_next = 1.0 / (spikes[i + 1] * spikes[i + 1]);
            diag[i] = 2.0 * c + 2.0 * eta * (w_i + a2 * w_next);
            off[i] = -2.0 * eta * a * w_next;
        }
        let w_last = 1.0 / (spikes[last] * spikes[last]);
        diag[last] = 2.0 * c + 2.0 * eta * w_last;
        off[last] = 0.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward/transpose products and the AR(1) filter against hand-expanded
    //   small cases.
    // - The filter as an exact right-inverse of the forward product.
    // - Analytic Hessian bands against an explicit M'·diag(w)·M expansion.
    // - Refusal of non-positive spikes during assembly.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify `apply` matches the banded definition on a length-4 vector.
    fn apply_matches_banded_definition() {
        // Arrange
        let op = SpikeOperator::new(4, 0.5);
        let v = array![1.0, 2.0, 3.0, 4.0];
        let mut out = Array1::zeros(4);

        // Act
        op.apply(v.view(), out.view_mut());

        // Assert: out[i] = v[i] − 0.5·v[i−1]
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-15);
        assert_relative_eq!(out[1], 2.0 - 0.5, epsilon = 1e-15);
        assert_relative_eq!(out[2], 3.0 - 1.0, epsilon = 1e-15);
        assert_relative_eq!(out[3], 4.0 - 1.5, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Verify `apply_transpose` agrees with the forward product through the
    // bilinear identity u'·(M·v) = (M'·u)'·v on fixed vectors.
    fn transpose_satisfies_bilinear_identity() {
        // Arrange
        let op = SpikeOperator::new(5, 0.8);
        let u = array![0.3, -1.0, 2.0, 0.7, 1.1];
        let v = array![1.0, 0.5, -0.2, 0.9, -1.4];
        let mut mv = Array1::zeros(5);
        let mut mtu = Array1::zeros(5);

        // Act
        op.apply(v.view(), mv.view_mut());
        op.apply_transpose(u.view(), mtu.view_mut());

        // Assert
        assert_relative_eq!(u.dot(&mv), mtu.dot(&v), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify `filter_into` inverts `apply`: filtering a spike vector and
    // re-applying the operator recovers the spikes to machine precision.
    fn filter_is_right_inverse_of_apply() {
        // Arrange
        let op = SpikeOperator::new(6, 0.9);
        let spikes = array![0.2, 0.0, 1.0, 0.0, 0.5, 0.1];
        let mut calcium = Array1::zeros(6);
        let mut recovered = Array1::zeros(6);

        // Act
        op.filter_into(spikes.view(), calcium.view_mut());
        op.apply(calcium.view(), recovered.view_mut());

        // Assert
        for i in 0..6 {
            assert_relative_eq!(recovered[i], spikes[i], epsilon = 1e-12);
        }
        // The filter accumulates: calcium[2] = 0.9²·0.2 + 0.9·0.0 + 1.0.
        assert_relative_eq!(calcium[2], 0.81 * 0.2 + 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the column sums: 1 − a for interior columns, 1 for the last.
    fn col_sums_are_constant_with_unit_tail() {
        let op = SpikeOperator::new(4, 0.25);
        assert_relative_eq!(op.col_sum(0), 0.75, epsilon = 1e-15);
        assert_relative_eq!(op.col_sum(2), 0.75, epsilon = 1e-15);
        assert_relative_eq!(op.col_sum(3), 1.0, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Verify the analytic Hessian bands against the explicit expansion of
    // 2c·I + 2η·M'·diag(n⁻²)·M for a length-4 case.
    fn hessian_bands_match_explicit_expansion() {
        // Arrange
        let op = SpikeOperator::new(4, 0.6);
        let spikes = array![0.5, 0.25, 1.0, 2.0];
        let (c, eta) = (3.0, 0.1);
        let mut diag = Array1::zeros(4);
        let mut off = Array1::zeros(4);
        let w: Vec<f64> = spikes.iter().map(|n| 1.0 / (n * n)).collect();

        // Act
        op.assemble_hessian_into(c, eta, spikes.view(), diag.view_mut(), off.view_mut())
            .expect("strictly positive spikes should assemble");

        // Assert: (M'·W·M)[i,i] = w[i] + a²·w[i+1] (w[T−1] alone at the end),
        // (M'·W·M)[i,i+1] = −a·w[i+1].
        let a2 = 0.36;
        for i in 0..3 {
            assert_relative_eq!(diag[i], 2.0 * c + 2.0 * eta * (w[i] + a2 * w[i + 1]), epsilon = 1e-12);
            assert_relative_eq!(off[i], -2.0 * eta * 0.6 * w[i + 1], epsilon = 1e-12);
        }
        assert_relative_eq!(diag[3], 2.0 * c + 2.0 * eta * w[3], epsilon = 1e-12);
        assert_relative_eq!(off[3], 0.0, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Verify assembly refuses spikes on or below the boundary.
    fn hessian_assembly_refuses_nonpositive_spikes() {
        let op = SpikeOperator::new(4, 0.6);
        let spikes = array![0.5, 0.0, 1.0, 2.0];
        let mut diag = Array1::zeros(4);
        let mut off = Array1::zeros(4);

        let result =
            op.assemble_hessian_into(1.0, 0.1, spikes.view(), diag.view_mut(), off.view_mut());

        assert_eq!(result, Err(DeconvError::SpikeNotPositive { index: 1, value: 0.0 }));
    }
}
