//! # Accumulator State
//!
//! Scalar-or-tensor numeric state for the stateful update rules. State
//! starts life as the scalar `0.0` and adopts the shape of the first
//! gradient folded into it, so the rules themselves never branch on shape.

use super::OptimizerError;
use crate::tensor::{Tensor, TensorData};

/// Moving-average state that broadcasts from a scalar into the shape of
/// the first sample it meets.
#[derive(Clone, Debug, PartialEq)]
pub enum Accumulator {
    /// Unmaterialized state, broadcast-compatible with any sample shape.
    Scalar(TensorData),
    /// Materialized elementwise state; later samples must keep this shape.
    Tensor(Tensor),
}

impl Accumulator {
    /// Fresh zero state.
    pub fn zero() -> Self {
        Accumulator::Scalar(0.0)
    }

    /// True until the first sample materializes tensor state.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Accumulator::Scalar(_))
    }

    /// Shape of materialized state, if any.
    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Accumulator::Scalar(_) => None,
            Accumulator::Tensor(state) => Some(state.shape()),
        }
    }

    /// Scalar state, if not yet materialized.
    pub fn as_scalar(&self) -> Option<TensorData> {
        match self {
            Accumulator::Scalar(v) => Some(*v),
            Accumulator::Tensor(_) => None,
        }
    }

    /// Materialized tensor state, if any.
    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Accumulator::Scalar(_) => None,
            Accumulator::Tensor(state) => Some(state),
        }
    }

    /// Checks that `sample` could be folded into this state, without
    /// changing anything.
    pub fn check_shape(&self, sample: &Tensor) -> Result<(), OptimizerError> {
        match self {
            Accumulator::Tensor(state) if state.shape() != sample.shape() => {
                Err(OptimizerError::ShapeMismatch {
                    expected: state.shape().to_vec(),
                    got: sample.shape().to_vec(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Exponential-moving-average fold:
    /// `state <- decay * state + (1 - decay) * sample`.
    ///
    /// Scalar state is broadcast to the sample's shape on first contact.
    /// Returns the state after the fold; on a shape disagreement nothing
    /// is touched.
    pub fn ema(
        &mut self,
        decay: TensorData,
        sample: &Tensor,
    ) -> Result<&Tensor, OptimizerError> {
        let state = self.materialize(sample)?;
        state.zip_mut_with(sample, |s, &x| *s = decay * *s + (1.0 - decay) * x);
        Ok(state)
    }

    /// Returns state to the fresh scalar zero.
    pub fn reset(&mut self) {
        *self = Accumulator::Scalar(0.0);
    }

    /// Broadcasts scalar state to the sample's shape on first contact and
    /// hands out the tensor state, or fails without touching anything.
    fn materialize(&mut self, sample: &Tensor) -> Result<&mut Tensor, OptimizerError> {
        if let Accumulator::Scalar(v) = *self {
            *self = Accumulator::Tensor(Tensor::from_elem(sample.raw_dim(), v));
        }
        match self {
            Accumulator::Tensor(state) => {
                if state.shape() == sample.shape() {
                    Ok(state)
                } else {
                    Err(OptimizerError::ShapeMismatch {
                        expected: state.shape().to_vec(),
                        got: sample.shape().to_vec(),
                    })
                }
            }
            Accumulator::Scalar(_) => unreachable!("scalar state was materialized above"),
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator::zero()
    }
}
