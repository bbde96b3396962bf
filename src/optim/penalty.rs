//! # Regularization Policy
//!
//! The penalty term added to an update. The penalty is keyed on the
//! *previous update* rather than the current parameter value; that
//! coupling is deliberate and kept in one visible place here instead of
//! inside the individual rules.

use super::OptimizerError;
use crate::tensor::{sign, Tensor, TensorData};

/// Computes the regularization term for one update step.
///
/// * `lp = 0`: no penalty. Returns `None` so zero-order callers add
///   nothing at all and stay bit-exact.
/// * `lp = 1`: `lmbda * sign(previous_update)`, with `sign(0) = 0`.
/// * `lp = 2`: `lmbda * previous_update`.
///
/// Any other order fails with
/// [`OptimizerError::UnsupportedRegularizationOrder`]. The order is
/// checked here, per call, so a failing order leaves optimizer state
/// untouched.
pub fn penalty(
    previous_update: &Tensor,
    lmbda: TensorData,
    lp: u32,
) -> Result<Option<Tensor>, OptimizerError> {
    match lp {
        0 => Ok(None),
        1 => Ok(Some(previous_update.mapv(|p| lmbda * sign(p)))),
        2 => Ok(Some(previous_update.mapv(|p| lmbda * p))),
        order => Err(OptimizerError::UnsupportedRegularizationOrder { order }),
    }
}
