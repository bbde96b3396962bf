//! # Parallelism Utilities (CPU Threading)
//!
//! Gradient aggregation helpers built on `rayon`, for collocation batches
//! whose per-sample gradients are evaluated independently and then folded
//! into a single update step.

use crate::optim::OptimizerError;
use crate::tensor::{Tensor, TensorData};
use rayon::prelude::*;

/// Sums a slice of same-shaped gradient tensors in parallel.
///
/// The shapes are verified up front, so the parallel fold itself cannot
/// fail part-way through.
pub fn sum_gradients(gradients: &[Tensor]) -> Result<Tensor, OptimizerError> {
    let (first, rest) = gradients
        .split_first()
        .ok_or(OptimizerError::EmptyAggregation)?;
    for gradient in rest {
        if gradient.shape() != first.shape() {
            return Err(OptimizerError::ShapeMismatch {
                expected: first.shape().to_vec(),
                got: gradient.shape().to_vec(),
            });
        }
    }

    let sum = gradients
        .par_iter()
        .fold(
            || Tensor::zeros(first.raw_dim()),
            |mut acc, partial| {
                acc += partial;
                acc
            },
        )
        .reduce(
            || Tensor::zeros(first.raw_dim()),
            |mut a, b| {
                a += &b;
                a
            },
        );
    Ok(sum)
}

/// Averages a slice of same-shaped gradient tensors in parallel.
///
/// This is the usual reduction for a minibatch of per-sample gradients.
pub fn aggregate_gradients(gradients: &[Tensor]) -> Result<Tensor, OptimizerError> {
    let mut mean = sum_gradients(gradients)?;
    let scale = 1.0 / gradients.len() as TensorData;
    mean.mapv_inplace(|x| x * scale);
    Ok(mean)
}
