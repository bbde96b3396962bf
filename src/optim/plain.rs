//! # Plain Gradient Descent

use super::penalty::penalty;
use super::{check_same_shape, validate_eta, validate_lmbda, Optimizer, OptimizerError};
use crate::tensor::{Tensor, TensorData};

/// Fixed-rate gradient descent:
/// `new_update = eta * gradient + penalty(previous_update)`.
///
/// Carries no internal state; `reset` is a no-op.
#[derive(Debug)]
pub struct PlainGD {
    eta: TensorData,
    lmbda: TensorData,
    lp: u32,
}

impl PlainGD {
    /// Creates a plain gradient-descent rule.
    ///
    /// # Arguments
    /// * `learning_rate`: step size `eta` (default: 0.01, must be > 0).
    /// * `lmbda`: penalty coefficient (default: 0.0, must be >= 0).
    /// * `lp`: penalty order 0/1/2 (default: 0; range-checked per `update`).
    pub fn new(
        learning_rate: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> Result<Self, OptimizerError> {
        let eta = learning_rate.unwrap_or(0.01);
        let lmbda = lmbda.unwrap_or(0.0);
        let lp = lp.unwrap_or(0);
        validate_eta(eta)?;
        validate_lmbda(lmbda)?;
        Ok(PlainGD { eta, lmbda, lp })
    }
}

impl Optimizer for PlainGD {
    fn update(
        &mut self,
        gradient: &Tensor,
        previous_update: &Tensor,
    ) -> Result<Tensor, OptimizerError> {
        check_same_shape(gradient, previous_update)?;
        let reg = penalty(previous_update, self.lmbda, self.lp)?;

        let eta = self.eta;
        let mut next = gradient.mapv(|g| eta * g);
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
        "plain_gd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn order_zero_output_is_exactly_scaled_gradient() {
        let mut gd = PlainGD::new(Some(0.05), None, None).expect("construct");
        let gradient = arr1(&[1.25, -3.0, 0.0]).into_dyn();
        let prev = tensor::zeros_like(&gradient);

        let update = gd.update(&gradient, &prev).expect("update");
        let expected = gradient.mapv(|g| 0.05 * g);
        // Bit-exact: no zero-valued penalty term is added.
        assert_eq!(update, expected);
    }

    #[test]
    fn l1_and_l2_differ_by_prev_minus_sign() {
        let gradient = arr1(&[1.0, 1.0, 1.0]).into_dyn();
        let prev = arr1(&[0.5, -2.0, 3.0]).into_dyn();
        let lmbda = 0.1;

        let mut l1 = PlainGD::new(Some(0.01), Some(lmbda), Some(1)).expect("l1");
        let mut l2 = PlainGD::new(Some(0.01), Some(lmbda), Some(2)).expect("l2");
        let u1 = l1.update(&gradient, &prev).expect("l1 update");
        let u2 = l2.update(&gradient, &prev).expect("l2 update");

        for i in 0..3 {
            let expected = lmbda * (prev[[i]] - crate::tensor::sign(prev[[i]]));
            assert_abs_diff_eq!(u2[[i]] - u1[[i]], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_hyperparameters_fail_construction() {
        assert!(matches!(
            PlainGD::new(Some(0.0), None, None).unwrap_err(),
            OptimizerError::InvalidHyperparameter(_)
        ));
        assert!(matches!(
            PlainGD::new(None, Some(-0.1), None).unwrap_err(),
            OptimizerError::InvalidHyperparameter(_)
        ));
    }

    #[test]
    fn shape_disagreement_is_rejected() {
        let mut gd = PlainGD::new(None, None, None).expect("construct");
        let err = gd
            .update(&tensor::ones(&[2]), &tensor::ones(&[3]))
            .unwrap_err();
        assert!(matches!(err, OptimizerError::ShapeMismatch { .. }));
    }

    #[test]
    fn defaults_match_documented_values() {
        let gd = PlainGD::new(None, None, None).expect("construct");
        assert_abs_diff_eq!(gd.learning_rate(), 0.01, epsilon = 1e-12);
        assert!(gd.state_dict().is_empty());
    }
}
