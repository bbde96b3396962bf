//! # Tensor Primitives
//!
//! Type aliases and constructors for the dynamic-dimension arrays the rest
//! of the crate computes with. There is no autograd wrapper here: gradients
//! are produced by an external collaborator and enter this crate as plain
//! `ndarray` values.

use ndarray::{ArrayD, IxDyn};
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Define a type alias for the underlying data type. Training math runs in
// f64, matching the float64 convention of the scientific stack this crate
// exchanges gradients with.
pub type TensorData = f64;

/// Dynamic-dimension tensor of [`TensorData`].
pub type Tensor = ArrayD<TensorData>;

/// Creates a tensor of zeros with the given shape.
pub fn zeros(shape: &[usize]) -> Tensor {
    ArrayD::zeros(IxDyn(shape))
}

/// Creates a tensor of ones with the given shape.
pub fn ones(shape: &[usize]) -> Tensor {
    ArrayD::ones(IxDyn(shape))
}

/// Creates a tensor filled with `value`.
pub fn full(shape: &[usize], value: TensorData) -> Tensor {
    ArrayD::from_elem(IxDyn(shape), value)
}

/// Creates a zero tensor shaped like `reference`.
///
/// The usual way to seed the `previous_update` argument on the first
/// training step.
pub fn zeros_like(reference: &Tensor) -> Tensor {
    ArrayD::zeros(reference.raw_dim())
}

/// Creates a tensor with elements drawn uniformly from `[0, 1)`.
pub fn uniform(shape: &[usize]) -> Tensor {
    ArrayD::random(IxDyn(shape), Uniform::new(0.0, 1.0))
}

/// Creates a tensor with elements drawn from the standard normal
/// distribution.
pub fn randn(shape: &[usize]) -> Tensor {
    ArrayD::random(IxDyn(shape), StandardNormal)
}

/// Like [`uniform`], but drawn from a fixed-seed generator so runs can be
/// replayed.
pub fn uniform_seeded(shape: &[usize], seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    ArrayD::random_using(IxDyn(shape), Uniform::new(0.0, 1.0), &mut rng)
}

/// Like [`randn`], but drawn from a fixed-seed generator.
pub fn randn_seeded(shape: &[usize], seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    ArrayD::random_using(IxDyn(shape), StandardNormal, &mut rng)
}

/// Elementwise sign with `sign(0) = 0`.
///
/// `f64::signum` maps `0.0` to `1.0`; the L1 penalty needs the zero-at-zero
/// convention so an all-zero previous update draws no penalty. NaN fails
/// both comparisons and passes through unchanged.
pub fn sign(x: TensorData) -> TensorData {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x
    }
}
