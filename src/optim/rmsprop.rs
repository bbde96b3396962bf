//! # RMSProp Optimizer

use super::accumulator::Accumulator;
use super::{
    check_same_shape, reject_unknown_keys, take_state_key, validate_eta, validate_lmbda,
    validate_unit_interval, Optimizer, OptimizerError,
};
use crate::tensor::{Tensor, TensorData};
use ndarray::Zip;
use std::collections::BTreeMap;

/// RMSProp with an exponential moving average of squared gradients.
///
/// Reference: Lecture 6.5 - rmsprop, COURSERA Neural Networks for Machine Learning (Tieleman & Hinton, 2012)
#[derive(Debug)]
pub struct RMSProp {
    eta: TensorData,
    decay: TensorData,
    lmbda: TensorData,
    lp: u32,
    square_avg: Accumulator,
}

impl RMSProp {
    /// Stability term added under the square root in the denominator.
    pub const EPSILON: TensorData = 1e-8;

    /// Smoothing factor used when the constructor is given none.
    pub const DEFAULT_DECAY: TensorData = 0.9;

    /// Creates a new RMSProp rule.
    ///
    /// # Arguments
    /// * `learning_rate`: base step size (default: 0.01, must be > 0).
    /// * `decay`: smoothing factor for the squared-gradient average
    ///   (default: 0.9, in [0, 1)).
    /// * `lmbda`: penalty coefficient (default: 0.0, must be >= 0).
    /// * `lp`: recorded penalty order (default: 0). See
    ///   [`RMSProp::regularization_order`].
    pub fn new(
        learning_rate: Option<TensorData>,
        decay: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> Result<Self, OptimizerError> {
        let eta = learning_rate.unwrap_or(0.01);
        let decay = decay.unwrap_or(Self::DEFAULT_DECAY);
        let lmbda = lmbda.unwrap_or(0.0);
        let lp = lp.unwrap_or(0);

        // --- Input Validation ---
        validate_eta(eta)?;
        validate_unit_interval("decay", decay)?;
        validate_lmbda(lmbda)?;

        Ok(RMSProp {
            eta,
            decay,
            lmbda,
            lp,
            square_avg: Accumulator::zero(),
        })
    }

    /// The `lp` value this rule was built with.
    ///
    /// Recorded but never consulted: `update` always adds the L2-shaped
    /// term `lmbda * previous_update`, whatever order was requested.
    pub fn regularization_order(&self) -> u32 {
        self.lp
    }

    /// Smoothing factor of the squared-gradient average.
    pub fn decay(&self) -> TensorData {
        self.decay
    }
}

impl Optimizer for RMSProp {
    fn update(
        &mut self,
        gradient: &Tensor,
        previous_update: &Tensor,
    ) -> Result<Tensor, OptimizerError> {
        check_same_shape(gradient, previous_update)?;
        // Gate on shape before folding, so a bad call leaves the average
        // exactly as it was.
        self.square_avg.check_shape(gradient)?;

        let eta = self.eta;
        let lmbda = self.lmbda;
        let grad_sq = gradient * gradient;
        let avg = self.square_avg.ema(self.decay, &grad_sq)?;

        let mut next = Zip::from(gradient)
            .and(avg)
            .map_collect(|&g, &sq| eta / (sq + Self::EPSILON).sqrt() * g);
        // Added unconditionally: with lmbda = 0 the term is zero but a
        // non-finite previous_update still propagates into the result.
        next.zip_mut_with(previous_update, |u, &p| *u += lmbda * p);
        Ok(next)
    }

    fn reset(&mut self) {
        self.square_avg.reset();
    }

    fn learning_rate(&self) -> TensorData {
        self.eta
    }

    fn name(&self) -> &'static str {
        "rmsprop"
    }

    fn state_dict(&self) -> BTreeMap<String, Accumulator> {
        let mut state = BTreeMap::new();
        state.insert("square_avg".to_string(), self.square_avg.clone());
        state
    }

    fn load_state_dict(
        &mut self,
        mut state: BTreeMap<String, Accumulator>,
    ) -> Result<(), OptimizerError> {
        let square_avg = take_state_key(&mut state, "square_avg", self.name())?;
        reject_unknown_keys(&state, self.name())?;
        self.square_avg = square_avg;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn first_step_uses_a_fresh_average() {
        let mut opt = RMSProp::new(Some(0.01), Some(0.9), None, None).expect("construct");
        let gradient = arr1(&[2.0]).into_dyn();
        let prev = tensor::zeros(&[1]);

        // avg = 0.1 * 4 = 0.4; update = 0.01 / sqrt(0.4 + eps) * 2
        let update = opt.update(&gradient, &prev).expect("update");
        let expected = 0.01 / (0.4f64 + RMSProp::EPSILON).sqrt() * 2.0;
        assert_abs_diff_eq!(update[[0]], expected, epsilon = 1e-12);
    }

    #[test]
    fn average_decays_across_steps() {
        let mut opt = RMSProp::new(Some(0.01), Some(0.5), None, None).expect("construct");
        let gradient = arr1(&[1.0]).into_dyn();
        let prev = tensor::zeros(&[1]);

        opt.update(&gradient, &prev).expect("first");
        let second = opt.update(&gradient, &prev).expect("second");

        // avg after two folds of g^2 = 1: 0.5 * 0.5 + 0.5 = 0.75
        let expected = 0.01 / (0.75f64 + RMSProp::EPSILON).sqrt();
        assert_abs_diff_eq!(second[[0]], expected, epsilon = 1e-12);
    }

    #[test]
    fn penalty_stays_l2_shaped_for_any_recorded_order() {
        // Same inputs, orders 0/1/2: the penalty term never changes shape.
        let gradient = arr1(&[1.0, -1.0]).into_dyn();
        let prev = arr1(&[0.5, -0.25]).into_dyn();

        let mut updates = Vec::new();
        for lp in [0, 1, 2] {
            let mut opt =
                RMSProp::new(Some(0.01), Some(0.9), Some(0.1), Some(lp)).expect("construct");
            assert_eq!(opt.regularization_order(), lp);
            updates.push(opt.update(&gradient, &prev).expect("update"));
        }
        assert_eq!(updates[0], updates[1]);
        assert_eq!(updates[1], updates[2]);
        // And the term really is lmbda * prev, not absent.
        let mut plain = RMSProp::new(Some(0.01), Some(0.9), Some(0.0), None).expect("construct");
        let base = plain.update(&gradient, &prev).expect("base");
        assert_abs_diff_eq!(updates[0][[0]] - base[[0]], 0.1 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn failed_shape_check_leaves_the_average_untouched() {
        let mut opt = RMSProp::new(Some(0.01), Some(0.9), None, None).expect("construct");
        let gradient = tensor::ones(&[3]);
        let prev = tensor::zeros(&[3]);
        opt.update(&gradient, &prev).expect("seed the average");

        let err = opt.update(&tensor::ones(&[2]), &tensor::zeros(&[2])).unwrap_err();
        assert!(matches!(err, OptimizerError::ShapeMismatch { .. }));

        // Follow-up with the original shape behaves as if the bad call
        // never happened.
        let after = opt.update(&gradient, &prev).expect("after mismatch");
        let mut fresh = RMSProp::new(Some(0.01), Some(0.9), None, None).expect("fresh");
        fresh.update(&gradient, &prev).expect("seed");
        let expected = fresh.update(&gradient, &prev).expect("second");
        assert_eq!(after, expected);
    }

    #[test]
    fn reset_restores_the_first_step() {
        let mut opt = RMSProp::new(Some(0.01), Some(0.9), None, None).expect("construct");
        let gradient = tensor::ones(&[2]);
        let prev = tensor::zeros(&[2]);

        let first = opt.update(&gradient, &prev).expect("first");
        opt.update(&gradient, &prev).expect("second");
        opt.reset();
        let restart = opt.update(&gradient, &prev).expect("after reset");
        assert_eq!(first, restart);
    }

    #[test]
    fn state_dict_round_trips_through_load() {
        let mut opt = RMSProp::new(Some(0.01), Some(0.9), None, None).expect("construct");
        let gradient = arr1(&[1.0, 2.0]).into_dyn();
        let prev = tensor::zeros(&[2]);
        opt.update(&gradient, &prev).expect("seed");

        let state = opt.state_dict();
        let mut other = RMSProp::new(Some(0.01), Some(0.9), None, None).expect("other");
        other.load_state_dict(state).expect("load");

        let a = opt.update(&gradient, &prev).expect("original");
        let b = other.update(&gradient, &prev).expect("restored");
        assert_eq!(a, b);
    }

    #[test]
    fn load_rejects_missing_and_unknown_keys() {
        let mut opt = RMSProp::new(None, None, None, None).expect("construct");

        let err = opt.load_state_dict(BTreeMap::new()).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidStateDict(_)));

        let mut state = opt.state_dict();
        state.insert("velocity".to_string(), Accumulator::zero());
        let err = opt.load_state_dict(state).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidStateDict(_)));
    }
}
