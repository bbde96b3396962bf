//! # Optimization Algorithms (`optim`)
//!
//! The gradient-based parameter-update engine. Each variant turns a loss
//! gradient and the previous update ("velocity") into the next update
//! delta; the training loop applies that delta as `parameters -= delta`
//! and threads it back in on the following step.
//!
//! Regularization is keyed on the previous update, not on the parameter
//! value; see [`penalty`] for the policy and its orders.

use std::collections::BTreeMap;

use crate::tensor::{Tensor, TensorData};

// --- Submodules ---
pub mod accumulator;
pub mod adagrad;
pub mod adam;
pub mod config;
pub mod momentum;
pub mod penalty;
pub mod plain;
pub mod rmsprop;

// Re-export optimizers and support types
pub use accumulator::Accumulator;
pub use adagrad::Adagrad;
pub use adam::{Adam, ResetPolicy};
pub use config::OptimizerConfig;
pub use momentum::MomentumGD;
pub use plain::PlainGD;
pub use rmsprop::RMSProp;

// --- Error Handling ---

/// Errors surfaced by optimizer construction, updates, state loading and
/// gradient aggregation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("unsupported regularization order {order}: expected 0 (none), 1 (L1) or 2 (L2)")]
    UnsupportedRegularizationOrder { order: u32 },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),
    #[error("invalid state dict: {0}")]
    InvalidStateDict(String),
    #[error("cannot aggregate an empty set of gradients")]
    EmptyAggregation,
}

// --- Optimizer Trait ---

/// Base trait for all update rules.
///
/// `update` consumes one gradient per training step together with the
/// update returned by the previous step (zero-filled on the first step,
/// e.g. via [`crate::tensor::zeros_like`]) and produces the delta the
/// training loop subtracts from the parameters. `reset` marks an epoch
/// boundary or restart.
///
/// One instance serves one parameter group. Reusing an instance across
/// groups is only well-defined while every group shares one shape: once a
/// variant holds tensor state, a differently shaped gradient fails with
/// [`OptimizerError::ShapeMismatch`].
pub trait Optimizer: std::fmt::Debug {
    /// Computes the next update delta.
    ///
    /// Fails fast, leaving all state untouched, when the regularization
    /// order is unsupported or any shape disagrees.
    fn update(
        &mut self,
        gradient: &Tensor,
        previous_update: &Tensor,
    ) -> Result<Tensor, OptimizerError>;

    /// Clears accumulated state at an epoch boundary or restart.
    fn reset(&mut self);

    /// The configured learning rate `eta`.
    fn learning_rate(&self) -> TensorData;

    /// Short identifier used by checkpoints and diagnostics.
    fn name(&self) -> &'static str;

    /// Functional state as named accumulators; empty for stateless
    /// variants.
    fn state_dict(&self) -> BTreeMap<String, Accumulator> {
        BTreeMap::new()
    }

    /// Replaces state with a dict produced by [`Optimizer::state_dict`] on
    /// a same-configured instance.
    ///
    /// The whole dict is validated before any of it is applied; stateless
    /// variants accept only an empty dict.
    fn load_state_dict(
        &mut self,
        state: BTreeMap<String, Accumulator>,
    ) -> Result<(), OptimizerError> {
        if state.is_empty() {
            Ok(())
        } else {
            Err(OptimizerError::InvalidStateDict(format!(
                "{} carries no state, got keys {:?}",
                self.name(),
                state.keys().collect::<Vec<_>>()
            )))
        }
    }
}

// --- Shared Checks ---

/// Shape precondition common to every `update`: gradient and previous
/// update must agree.
pub(crate) fn check_same_shape(
    gradient: &Tensor,
    previous_update: &Tensor,
) -> Result<(), OptimizerError> {
    if gradient.shape() == previous_update.shape() {
        Ok(())
    } else {
        Err(OptimizerError::ShapeMismatch {
            expected: gradient.shape().to_vec(),
            got: previous_update.shape().to_vec(),
        })
    }
}

// --- Hyperparameter Validation ---
// Constructors range-check everything except `lp`, which is checked per
// `update` call by the penalty policy.

pub(crate) fn validate_eta(eta: TensorData) -> Result<(), OptimizerError> {
    if !(eta > 0.0) {
        return Err(OptimizerError::InvalidHyperparameter(format!(
            "learning rate must be > 0, got {}",
            eta
        )));
    }
    Ok(())
}

pub(crate) fn validate_unit_interval(
    name: &str,
    value: TensorData,
) -> Result<(), OptimizerError> {
    if !(0.0 <= value && value < 1.0) {
        return Err(OptimizerError::InvalidHyperparameter(format!(
            "{} must lie in [0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn validate_lmbda(lmbda: TensorData) -> Result<(), OptimizerError> {
    if !(lmbda >= 0.0) {
        return Err(OptimizerError::InvalidHyperparameter(format!(
            "regularization coefficient must be >= 0, got {}",
            lmbda
        )));
    }
    Ok(())
}

// --- State-Dict Helpers ---

pub(crate) fn take_state_key(
    state: &mut BTreeMap<String, Accumulator>,
    key: &str,
    owner: &str,
) -> Result<Accumulator, OptimizerError> {
    state.remove(key).ok_or_else(|| {
        OptimizerError::InvalidStateDict(format!("{} state requires key '{}'", owner, key))
    })
}

pub(crate) fn reject_unknown_keys(
    state: &BTreeMap<String, Accumulator>,
    owner: &str,
) -> Result<(), OptimizerError> {
    if let Some(key) = state.keys().next() {
        return Err(OptimizerError::InvalidStateDict(format!(
            "unexpected key '{}' in {} state",
            key, owner
        )));
    }
    Ok(())
}
