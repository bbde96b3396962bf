//! # Momentum Gradient Descent

use super::penalty::penalty;
use super::{
    check_same_shape, validate_eta, validate_lmbda, validate_unit_interval, Optimizer,
    OptimizerError,
};
use crate::tensor::{Tensor, TensorData};

/// Gradient descent with momentum:
/// `new_update = eta * gradient + momentum * previous_update + penalty(previous_update)`.
///
/// The velocity is threaded externally through `previous_update`, so the
/// rule itself stays stateless and `reset` is a no-op.
#[derive(Debug)]
pub struct MomentumGD {
    eta: TensorData,
    momentum: TensorData,
    lmbda: TensorData,
    lp: u32,
}

impl MomentumGD {
    /// Creates a momentum gradient-descent rule.
    ///
    /// # Arguments
    /// * `learning_rate`: step size `eta` (default: 0.01, must be > 0).
    /// * `momentum`: velocity coefficient (default: 0.0, in [0, 1)).
    /// * `lmbda`: penalty coefficient (default: 0.0, must be >= 0).
    /// * `lp`: penalty order 0/1/2 (default: 0; range-checked per `update`).
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
        validate_eta(eta)?;
        validate_unit_interval("momentum", momentum)?;
        validate_lmbda(lmbda)?;
        Ok(MomentumGD {
            eta,
            momentum,
            lmbda,
            lp,
        })
    }
}

impl Optimizer for MomentumGD {
    fn update(
        &mut self,
        gradient: &Tensor,
        previous_update: &Tensor,
    ) -> Result<Tensor, OptimizerError> {
        check_same_shape(gradient, previous_update)?;
        let reg = penalty(previous_update, self.lmbda, self.lp)?;

        let eta = self.eta;
        let momentum = self.momentum;
        let mut next = gradient.mapv(|g| eta * g);
        next.zip_mut_with(previous_update, |u, &p| *u += momentum * p);
        if let Some(term) = reg {
            next += &term;
        }
        Ok(next)
    }

    fn reset(&mut self) {}

    fn learning_rate(&self) -> TensorData {
        self.eta
    }

    fn name(&self) -> &'static str {
        "momentum_gd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn velocity_term_is_added_to_scaled_gradient() {
        let mut gd = MomentumGD::new(Some(0.1), Some(0.9), None, None).expect("construct");
        let gradient = arr1(&[1.0, -2.0]).into_dyn();
        let prev = arr1(&[0.5, 0.25]).into_dyn();

        let update = gd.update(&gradient, &prev).expect("update");
        assert_abs_diff_eq!(update[[0]], 0.1 * 1.0 + 0.9 * 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(update[[1]], 0.1 * -2.0 + 0.9 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn zero_momentum_collapses_to_plain_descent() {
        let mut with_zero = MomentumGD::new(Some(0.05), Some(0.0), None, None).expect("construct");
        let gradient = arr1(&[2.0, -1.0]).into_dyn();
        let prev = arr1(&[10.0, 10.0]).into_dyn();

        let update = with_zero.update(&gradient, &prev).expect("update");
        assert_eq!(update, gradient.mapv(|g| 0.05 * g));
    }

    #[test]
    fn momentum_of_one_is_rejected() {
        assert!(matches!(
            MomentumGD::new(None, Some(1.0), None, None).unwrap_err(),
            OptimizerError::InvalidHyperparameter(_)
        ));
    }

    #[test]
    fn repeated_updates_are_deterministic() {
        // Stateless rule: the same inputs give the same output, before and
        // after reset.
        let mut gd = MomentumGD::new(Some(0.1), Some(0.5), Some(0.01), Some(2)).expect("construct");
        let gradient = tensor::ones(&[3]);
        let prev = tensor::full(&[3], 0.2);

        let first = gd.update(&gradient, &prev).expect("first");
        gd.reset();
        let second = gd.update(&gradient, &prev).expect("second");
        assert_eq!(first, second);
    }
}
