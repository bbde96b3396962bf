//! # Activation Functions (`nn::functional`)
//!
//! Stateless elementwise maps used by the network layer that feeds the
//! update engine. Every function is total: there are no error paths, and
//! non-finite inputs travel through the arithmetic per IEEE-754.

use crate::tensor::{Tensor, TensorData};

/// Default negative slope for [`leaky_relu`].
pub const DEFAULT_LEAKY_SLOPE: TensorData = 0.01;

/// Default saturation scale for [`elu`].
pub const DEFAULT_ELU_ALPHA: TensorData = 1.0;

// --- Activation Functions ---

/// Identity map, `identity(z) = z`. The usual output-layer activation.
pub fn identity(input: &Tensor) -> Tensor {
    input.clone()
}

/// Logistic sigmoid element-wise.
/// `sigmoid(z) = 1 / (1 + exp(-z))`
pub fn sigmoid(input: &Tensor) -> Tensor {
    input.mapv(sigmoid_scalar)
}

/// Hyperbolic tangent element-wise.
pub fn tanh(input: &Tensor) -> Tensor {
    input.mapv(TensorData::tanh)
}

/// Rectified linear unit element-wise: `z` where `z > 0`, else `0`.
///
/// NaN fails the comparison and maps to `0`.
pub fn relu(input: &Tensor) -> Tensor {
    input.mapv(|z| if z > 0.0 { z } else { 0.0 })
}

/// Leaky rectified linear unit: `z` where `z > 0`, else `alpha * z`.
pub fn leaky_relu(input: &Tensor, alpha: TensorData) -> Tensor {
    input.mapv(|z| if z > 0.0 { z } else { alpha * z })
}

/// Exponential linear unit: `z` where `z > 0`, else `alpha * (exp(z) - 1)`.
pub fn elu(input: &Tensor, alpha: TensorData) -> Tensor {
    input.mapv(|z| if z > 0.0 { z } else { alpha * (z.exp() - 1.0) })
}

/// Gaussian error linear unit, tanh approximation:
/// `gelu(z) = 0.5 * z * (1 + tanh(sqrt(2/pi) * (z + 0.044715 * z^3)))`
pub fn gelu(input: &Tensor) -> Tensor {
    let c = (2.0 / std::f64::consts::PI).sqrt();
    input.mapv(|z| 0.5 * z * (1.0 + (c * (z + 0.044715 * z.powi(3))).tanh()))
}

/// Sigmoid-weighted linear unit (swish), `silu(z) = z * sigmoid(z)`.
pub fn silu(input: &Tensor) -> Tensor {
    input.mapv(|z| z * sigmoid_scalar(z))
}

fn sigmoid_scalar(z: TensorData) -> TensorData {
    1.0 / (1.0 + (-z).exp())
}
