//! # Optimizer Configuration
//!
//! A serializable description of an update rule and its hyperparameters,
//! so training setups can be stored alongside checkpoints and rebuilt
//! later with `build`.

use super::adagrad::Adagrad;
use super::adam::{Adam, ResetPolicy};
use super::momentum::MomentumGD;
use super::plain::PlainGD;
use super::rmsprop::RMSProp;
use super::{Optimizer, OptimizerError};
use crate::tensor::TensorData;
use serde::{Deserialize, Serialize};

/// Which update rule to build, with its hyperparameters.
///
/// Absent optional fields fall back to the same defaults the constructors
/// use, so a config written by an older run keeps loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptimizerConfig {
    PlainGD {
        learning_rate: TensorData,
        #[serde(default)]
        lmbda: TensorData,
        #[serde(default)]
        lp: u32,
    },
    MomentumGD {
        learning_rate: TensorData,
        #[serde(default)]
        momentum: TensorData,
        #[serde(default)]
        lmbda: TensorData,
        #[serde(default)]
        lp: u32,
    },
    Adagrad {
        learning_rate: TensorData,
        #[serde(default)]
        momentum: TensorData,
        #[serde(default)]
        lmbda: TensorData,
        #[serde(default)]
        lp: u32,
    },
    RMSProp {
        learning_rate: TensorData,
        #[serde(default = "default_decay")]
        decay: TensorData,
        #[serde(default)]
        lmbda: TensorData,
        #[serde(default)]
        lp: u32,
    },
    Adam {
        learning_rate: TensorData,
        #[serde(default = "default_decay_rates")]
        decay_rates: (TensorData, TensorData),
        #[serde(default)]
        lmbda: TensorData,
        #[serde(default)]
        reset_policy: Option<ResetPolicy>,
    },
}

fn default_decay() -> TensorData {
    RMSProp::DEFAULT_DECAY
}

fn default_decay_rates() -> (TensorData, TensorData) {
    Adam::DEFAULT_DECAY_RATES
}

impl OptimizerConfig {
    /// Instantiates the described rule.
    ///
    /// Hyperparameter validation happens here, through the same
    /// constructors a direct caller would use.
    pub fn build(&self) -> Result<Box<dyn Optimizer + Send>, OptimizerError> {
        match *self {
            OptimizerConfig::PlainGD {
                learning_rate,
                lmbda,
                lp,
            } => Ok(Box::new(PlainGD::new(
                Some(learning_rate),
                Some(lmbda),
                Some(lp),
            )?)),
            OptimizerConfig::MomentumGD {
                learning_rate,
                momentum,
                lmbda,
                lp,
            } => Ok(Box::new(MomentumGD::new(
                Some(learning_rate),
                Some(momentum),
                Some(lmbda),
                Some(lp),
            )?)),
            OptimizerConfig::Adagrad {
                learning_rate,
                momentum,
                lmbda,
                lp,
            } => Ok(Box::new(Adagrad::new(
                Some(learning_rate),
                Some(momentum),
                Some(lmbda),
                Some(lp),
            )?)),
            OptimizerConfig::RMSProp {
                learning_rate,
                decay,
                lmbda,
                lp,
            } => Ok(Box::new(RMSProp::new(
                Some(learning_rate),
                Some(decay),
                Some(lmbda),
                Some(lp),
            )?)),
            OptimizerConfig::Adam {
                learning_rate,
                decay_rates,
                lmbda,
                reset_policy,
            } => Ok(Box::new(Adam::with_reset_policy(
                Some(learning_rate),
                Some(decay_rates),
                Some(lmbda),
                reset_policy.unwrap_or_default(),
            )?)),
        }
    }

    /// Renders the config as pretty-printed JSON, the form used for
    /// experiment files a person edits by hand.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a config from JSON. Omitted optional fields take the
    /// constructor defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
