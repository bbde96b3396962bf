//! # Adagrad Optimizer

use super::penalty::penalty;
use super::{
    check_same_shape, validate_eta, validate_lmbda, validate_unit_interval, Optimizer,
    OptimizerError,
};
use crate::tensor::{Tensor, TensorData};

/// Adagrad-style adaptive gradient descent.
///
/// The per-element rate is recomputed from the instantaneous gradient on
/// every call; no squared-gradient history is kept across calls, unlike
/// the textbook rule.
///
/// Reference: Adaptive Subgradient Methods for Online Learning and Stochastic Optimization - http://jmlr.org/papers/v12/duchi11a.html
#[derive(Debug)]
pub struct Adagrad {
    eta: TensorData,
    momentum: TensorData,
    lmbda: TensorData,
    lp: u32,
    // Last adaptive rate, kept for inspection only; cleared by `reset`.
    adaptive_rate: Option<Tensor>,
}

impl Adagrad {
    /// Stability floor added to the gradient magnitude in the denominator.
    pub const EPSILON: TensorData = 1e-7;

    /// Creates a new Adagrad rule.
    ///
    /// # Arguments
    /// * `learning_rate`: base step size (default: 0.01, must be > 0).
    /// * `momentum`: velocity coefficient (default: 0.0, in [0, 1)).
    /// * `lmbda`: penalty coefficient (default: 0.0, must be >= 0).
    /// * `lp`: penalty order 0, 1 or 2 (default: 0; checked on each `update`).
    pub fn new(
        learning_rate: Option<TensorData>,
        momentum: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> Result<Self, OptimizerError> {
        let eta = learning_rate.unwrap_or(0.01);
        let momentum = momentum.unwrap_or(0.0);
        let lmbda = lmbda.unwrap_or(0.0);
        let lp = lp.unwrap_or(0);

        // --- Input Validation ---
        validate_eta(eta)?;
        validate_unit_interval("momentum", momentum)?;
        validate_lmbda(lmbda)?;

        Ok(Adagrad {
            eta,
            momentum,
            lmbda,
            lp,
            adaptive_rate: None,
        })
    }

    /// Adaptive rate computed by the most recent `update`, if any.
    ///
    /// Diagnostic only: the next `update` recomputes it from scratch and
    /// it never enters [`Optimizer::state_dict`].
    pub fn adaptive_learning_rate(&self) -> Option<&Tensor> {
        self.adaptive_rate.as_ref()
    }
}

impl Optimizer for Adagrad {
    fn update(
        &mut self,
        gradient: &Tensor,
        previous_update: &Tensor,
    ) -> Result<Tensor, OptimizerError> {
        check_same_shape(gradient, previous_update)?;
        // Penalty order is rejected before the diagnostic is replaced.
        let reg = penalty(previous_update, self.lmbda, self.lp)?;

        let eta = self.eta;
        let momentum = self.momentum;
        // Recomputed from the instantaneous gradient alone; nothing is
        // carried over from earlier calls.
        let rate = gradient.mapv(|g| eta / (Self::EPSILON + (g * g).sqrt()));

        let mut next = gradient * &rate;
        next.zip_mut_with(previous_update, |u, &p| *u += momentum * p);
        if let Some(term) = reg {
            next += &term;
        }
        self.adaptive_rate = Some(rate);
        Ok(next)
    }

    fn reset(&mut self) {
        // Clears the diagnostic only; the next `update` is unaffected.
        self.adaptive_rate = None;
    }

    fn learning_rate(&self) -> TensorData {
        self.eta
    }

    fn name(&self) -> &'static str {
        "adagrad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn zero_gradient_stays_finite() {
        let mut opt = Adagrad::new(Some(0.01), None, None, None).expect("construct");
        let gradient = tensor::zeros(&[4]);
        let prev = tensor::zeros(&[4]);

        let update = opt.update(&gradient, &prev).expect("update");
        assert!(update.iter().all(|&v| v == 0.0));

        // eta / (eps + 0): the floor alone caps the rate.
        let rate = opt.adaptive_learning_rate().expect("diagnostic");
        assert!(rate.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(rate[[0]], 0.01 / Adagrad::EPSILON, epsilon = 1.0);
    }

    #[test]
    fn unit_gradient_steps_by_roughly_eta() {
        let mut opt = Adagrad::new(Some(0.01), None, None, None).expect("construct");
        let gradient = arr1(&[1.0, -1.0]).into_dyn();
        let prev = tensor::zeros_like(&gradient);

        // g * eta / (eps + |g|) with |g| = 1.
        let update = opt.update(&gradient, &prev).expect("update");
        assert_abs_diff_eq!(
            update[[0]],
            0.01 / (Adagrad::EPSILON + 1.0),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            update[[1]],
            -0.01 / (Adagrad::EPSILON + 1.0),
            epsilon = 1e-15
        );
    }

    #[test]
    fn rate_ignores_earlier_gradients() {
        // Two calls with very different magnitudes: the second call's
        // result depends only on the second gradient.
        let mut opt = Adagrad::new(Some(0.01), None, None, None).expect("construct");
        let prev = tensor::zeros(&[1]);

        opt.update(&arr1(&[100.0]).into_dyn(), &prev).expect("first");
        let update = opt.update(&arr1(&[1.0]).into_dyn(), &prev).expect("second");

        let mut fresh = Adagrad::new(Some(0.01), None, None, None).expect("fresh");
        let expected = fresh.update(&arr1(&[1.0]).into_dyn(), &prev).expect("fresh update");
        assert_eq!(update, expected);
    }

    #[test]
    fn momentum_term_adds_scaled_previous_update() {
        let mut with = Adagrad::new(Some(0.01), Some(0.5), None, None).expect("construct");
        let mut without = Adagrad::new(Some(0.01), None, None, None).expect("construct");
        let gradient = arr1(&[2.0, -3.0]).into_dyn();
        let prev = arr1(&[0.4, 0.8]).into_dyn();

        let a = with.update(&gradient, &prev).expect("with momentum");
        let b = without.update(&gradient, &prev).expect("without momentum");
        assert_abs_diff_eq!(a[[0]] - b[[0]], 0.5 * 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(a[[1]] - b[[1]], 0.5 * 0.8, epsilon = 1e-12);
    }

    #[test]
    fn unsupported_order_fails_without_touching_the_diagnostic() {
        let mut opt = Adagrad::new(Some(0.01), None, Some(0.1), Some(3)).expect("construct");
        let gradient = tensor::ones(&[2]);
        let prev = tensor::ones(&[2]);

        let err = opt.update(&gradient, &prev).unwrap_err();
        assert_eq!(
            err,
            OptimizerError::UnsupportedRegularizationOrder { order: 3 }
        );
        assert!(opt.adaptive_learning_rate().is_none());

        // The failure is stable call after call.
        let again = opt.update(&gradient, &prev).unwrap_err();
        assert_eq!(again, err);
        assert!(opt.adaptive_learning_rate().is_none());
    }

    #[test]
    fn reset_clears_the_diagnostic_only() {
        let mut opt = Adagrad::new(Some(0.01), None, None, None).expect("construct");
        let gradient = tensor::ones(&[2]);
        let prev = tensor::zeros(&[2]);

        let before = opt.update(&gradient, &prev).expect("before reset");
        assert!(opt.adaptive_learning_rate().is_some());
        opt.reset();
        assert!(opt.adaptive_learning_rate().is_none());

        let after = opt.update(&gradient, &prev).expect("after reset");
        assert_eq!(before, after);
    }
}
