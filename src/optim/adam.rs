//! # Adam Optimizer

use super::accumulator::Accumulator;
use super::{
    check_same_shape, reject_unknown_keys, take_state_key, validate_eta, validate_lmbda,
    validate_unit_interval, Optimizer, OptimizerError,
};
use crate::tensor::{Tensor, TensorData};
use ndarray::Zip;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What `reset` does to the bias-correction counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetPolicy {
    /// Clear both moments and advance the counter by one.
    #[default]
    CarryStep,
    /// Clear both moments and restart the counter at 1, as a fresh run
    /// conventionally would.
    RestartSchedule,
}

/// Implements the Adam algorithm.
///
/// Reference: Adam: A Method for Stochastic Optimization - https://arxiv.org/abs/1412.6980
#[derive(Debug)]
pub struct Adam {
    eta: TensorData,
    decay_rates: (TensorData, TensorData), // (beta1, beta2)
    lmbda: TensorData,
    reset_policy: ResetPolicy,

    exp_avg: Accumulator,    // 1st moment estimate - m_t
    exp_avg_sq: Accumulator, // 2nd moment estimate - v_t
    // Bias-correction step. Only `reset` moves it; `update` reads it as-is.
    t: u32,
}

impl Adam {
    /// Stability term added to the denominator.
    pub const EPSILON: TensorData = 1e-8;

    /// `(beta1, beta2)` used when the constructor is given none.
    pub const DEFAULT_DECAY_RATES: (TensorData, TensorData) = (0.9, 0.99);

    /// Creates a new Adam rule with the default [`ResetPolicy::CarryStep`].
    ///
    /// # Arguments
    /// * `learning_rate`: step size (default: 0.01, must be > 0).
    /// * `decay_rates`: coefficients for the running averages of the
    ///   gradient and its square (default: (0.9, 0.99), each in [0, 1)).
    /// * `lmbda`: penalty coefficient on `previous_update`
    ///   (default: 0.0, must be >= 0).
    pub fn new(
        learning_rate: Option<TensorData>,
        decay_rates: Option<(TensorData, TensorData)>,
        lmbda: Option<TensorData>,
    ) -> Result<Self, OptimizerError> {
        Self::with_reset_policy(learning_rate, decay_rates, lmbda, ResetPolicy::default())
    }

    /// Creates a new Adam rule with an explicit [`ResetPolicy`].
    pub fn with_reset_policy(
        learning_rate: Option<TensorData>,
        decay_rates: Option<(TensorData, TensorData)>,
        lmbda: Option<TensorData>,
        reset_policy: ResetPolicy,
    ) -> Result<Self, OptimizerError> {
        let eta = learning_rate.unwrap_or(0.01);
        let decay_rates = decay_rates.unwrap_or(Self::DEFAULT_DECAY_RATES);
        let lmbda = lmbda.unwrap_or(0.0);

        // --- Input Validation ---
        validate_eta(eta)?;
        validate_unit_interval("decay_rates.0", decay_rates.0)?;
        validate_unit_interval("decay_rates.1", decay_rates.1)?;
        validate_lmbda(lmbda)?;

        Ok(Adam {
            eta,
            decay_rates,
            lmbda,
            reset_policy,
            exp_avg: Accumulator::zero(),
            exp_avg_sq: Accumulator::zero(),
            t: 1,
        })
    }

    /// Current bias-correction step.
    pub fn step(&self) -> u32 {
        self.t
    }

    /// The counter behavior applied by `reset`.
    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }
}

impl Optimizer for Adam {
    fn update(
        &mut self,
        gradient: &Tensor,
        previous_update: &Tensor,
    ) -> Result<Tensor, OptimizerError> {
        check_same_shape(gradient, previous_update)?;
        // Both moments move in lockstep: gate on shape before touching
        // either one.
        self.exp_avg.check_shape(gradient)?;
        self.exp_avg_sq.check_shape(gradient)?;

        let eta = self.eta;
        let lmbda = self.lmbda;
        let (beta1, beta2) = self.decay_rates;
        let correction1 = 1.0 - beta1.powi(self.t as i32);
        let correction2 = 1.0 - beta2.powi(self.t as i32);

        let grad_sq = gradient * gradient;
        let first = self.exp_avg.ema(beta1, gradient)?;
        let second = self.exp_avg_sq.ema(beta2, &grad_sq)?;

        let mut next = Zip::from(first)
            .and(second)
            .map_collect(|&m, &v| eta * (m / correction1) / ((v / correction2).sqrt() + Self::EPSILON));
        // Added unconditionally, as in the other EMA-based rule.
        next.zip_mut_with(previous_update, |u, &p| *u += lmbda * p);
        Ok(next)
    }

    fn reset(&mut self) {
        self.exp_avg.reset();
        self.exp_avg_sq.reset();
        self.t = match self.reset_policy {
            ResetPolicy::CarryStep => self.t + 1,
            ResetPolicy::RestartSchedule => 1,
        };
    }

    fn learning_rate(&self) -> TensorData {
        self.eta
    }

    fn name(&self) -> &'static str {
        "adam"
    }

    fn state_dict(&self) -> BTreeMap<String, Accumulator> {
        let mut state = BTreeMap::new();
        state.insert("exp_avg".to_string(), self.exp_avg.clone());
        state.insert("exp_avg_sq".to_string(), self.exp_avg_sq.clone());
        state.insert("step".to_string(), Accumulator::Scalar(self.t as TensorData));
        state
    }

    fn load_state_dict(
        &mut self,
        mut state: BTreeMap<String, Accumulator>,
    ) -> Result<(), OptimizerError> {
        let exp_avg = take_state_key(&mut state, "exp_avg", self.name())?;
        let exp_avg_sq = take_state_key(&mut state, "exp_avg_sq", self.name())?;
        let step = take_state_key(&mut state, "step", self.name())?;
        reject_unknown_keys(&state, self.name())?;

        let step = match step {
            Accumulator::Scalar(v)
                if v.fract() == 0.0 && v >= 1.0 && v <= u32::MAX as TensorData =>
            {
                v as u32
            }
            other => {
                return Err(OptimizerError::InvalidStateDict(format!(
                    "adam state key 'step' must be an integer scalar >= 1, got {:?}",
                    other
                )))
            }
        };
        if exp_avg.shape() != exp_avg_sq.shape() {
            return Err(OptimizerError::InvalidStateDict(
                "adam state keys 'exp_avg' and 'exp_avg_sq' disagree on shape".to_string(),
            ));
        }

        // All checks passed; commit atomically.
        self.exp_avg = exp_avg;
        self.exp_avg_sq = exp_avg_sq;
        self.t = step;
        Ok(())
    }
}
