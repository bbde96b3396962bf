//! # Neural Network Building Blocks (`nn`)
//!
//! The activation library used by the network layer sitting in front of
//! the optimizer engine. Activations are pure elementwise maps; the
//! [`Activation`] enum is the serializable, data-driven way to pick one.

use serde::{Deserialize, Serialize};

use crate::tensor::{Tensor, TensorData};

// --- Submodules ---
pub mod functional;

// --- Activation Selection ---

/// Selects one of the activation functions in [`functional`].
///
/// The parameterized variants carry their slope; when deserialized without
/// one, the conventional defaults apply (`LeakyReLU` 0.01, `ELU` 1.0).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    Sigmoid,
    Tanh,
    ReLU,
    LeakyReLU {
        #[serde(default = "default_leaky_slope")]
        alpha: TensorData,
    },
    ELU {
        #[serde(default = "default_elu_alpha")]
        alpha: TensorData,
    },
    GELU,
    SiLU,
}

fn default_leaky_slope() -> TensorData {
    functional::DEFAULT_LEAKY_SLOPE
}

fn default_elu_alpha() -> TensorData {
    functional::DEFAULT_ELU_ALPHA
}

impl Activation {
    /// `LeakyReLU` with the default 0.01 negative slope.
    pub fn leaky_relu() -> Self {
        Activation::LeakyReLU {
            alpha: functional::DEFAULT_LEAKY_SLOPE,
        }
    }

    /// `ELU` with the default unit alpha.
    pub fn elu() -> Self {
        Activation::ELU {
            alpha: functional::DEFAULT_ELU_ALPHA,
        }
    }

    /// Applies the selected function element-wise.
    pub fn apply(&self, input: &Tensor) -> Tensor {
        match *self {
            Activation::Identity => functional::identity(input),
            Activation::Sigmoid => functional::sigmoid(input),
            Activation::Tanh => functional::tanh(input),
            Activation::ReLU => functional::relu(input),
            Activation::LeakyReLU { alpha } => functional::leaky_relu(input, alpha),
            Activation::ELU { alpha } => functional::elu(input, alpha),
            Activation::GELU => functional::gelu(input),
            Activation::SiLU => functional::silu(input),
        }
    }

    /// Short identifier, mostly for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::ReLU => "relu",
            Activation::LeakyReLU { .. } => "leaky_relu",
            Activation::ELU { .. } => "elu",
            Activation::GELU => "gelu",
            Activation::SiLU => "silu",
        }
    }
}
