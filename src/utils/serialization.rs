//! # Checkpoint Serialization Utilities
//!
//! Functions for saving and loading optimizer state across process
//! restarts. Uses `serde` for serialization and `bincode` as the binary
//! format.

use crate::optim::{Accumulator, Optimizer, OptimizerError};
use crate::tensor::{Tensor, TensorData};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// --- Error Type ---
#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error (Bincode): {0}")]
    Bincode(#[from] bincode::Error),
    #[error("checkpoint belongs to optimizer '{got}', expected '{expected}'")]
    OptimizerMismatch { expected: String, got: String },
    #[error("malformed tensor for key '{key}': shape {shape:?} does not hold {len} elements")]
    MalformedTensor {
        key: String,
        shape: Vec<usize>,
        len: usize,
    },
    #[error(transparent)]
    State(#[from] OptimizerError),
}

// --- Serializable State Wrapper ---
// Accumulator holds an ArrayD, which does not derive Serialize without an
// extra ndarray feature, so tensors travel as a flat Vec plus shape.

#[derive(Serialize, Deserialize, Debug)]
enum SerializableAccumulator {
    Scalar(TensorData),
    Tensor {
        shape: Vec<usize>,
        data: Vec<TensorData>,
    },
}

impl SerializableAccumulator {
    fn from_accumulator(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Scalar(v) => SerializableAccumulator::Scalar(*v),
            Accumulator::Tensor(t) => SerializableAccumulator::Tensor {
                shape: t.shape().to_vec(),
                // Flatten through `iter` for portability across layouts.
                data: t.iter().cloned().collect(),
            },
        }
    }

    fn into_accumulator(self, key: &str) -> Result<Accumulator, SerializationError> {
        match self {
            SerializableAccumulator::Scalar(v) => Ok(Accumulator::Scalar(v)),
            SerializableAccumulator::Tensor { shape, data } => {
                let len = data.len();
                let tensor = Tensor::from_shape_vec(ndarray::IxDyn(&shape), data).map_err(|_| {
                    SerializationError::MalformedTensor {
                        key: key.to_string(),
                        shape: shape.clone(),
                        len,
                    }
                })?;
                Ok(Accumulator::Tensor(tensor))
            }
        }
    }
}

// --- Checkpoint Layout ---
// The optimizer name travels with the state so a checkpoint cannot be
// loaded into a different rule by accident.

#[derive(Serialize, Deserialize, Debug)]
struct OptimizerCheckpoint {
    optimizer: String,
    state: BTreeMap<String, SerializableAccumulator>,
}

// --- Save Function ---

/// Saves an optimizer's state dictionary to a file.
///
/// # Arguments
/// * `optimizer`: the rule whose state should be captured.
/// * `path`: destination file, created or truncated.
pub fn save_state<P: AsRef<Path>>(
    optimizer: &dyn Optimizer,
    path: P,
) -> Result<(), SerializationError> {
    let state = optimizer
        .state_dict()
        .iter()
        .map(|(key, acc)| (key.clone(), SerializableAccumulator::from_accumulator(acc)))
        .collect();
    let checkpoint = OptimizerCheckpoint {
        optimizer: optimizer.name().to_string(),
        state,
    };

    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, &checkpoint)?;
    Ok(())
}

// --- Load Function ---

/// Loads a state dictionary from a file into an optimizer.
///
/// The checkpoint must have been written by an optimizer with the same
/// `name`; the optimizer's own `load_state_dict` then validates keys and
/// shapes before anything is committed.
pub fn load_state<P: AsRef<Path>>(
    optimizer: &mut dyn Optimizer,
    path: P,
) -> Result<(), SerializationError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let checkpoint: OptimizerCheckpoint = bincode::deserialize_from(reader)?;

    if checkpoint.optimizer != optimizer.name() {
        return Err(SerializationError::OptimizerMismatch {
            expected: optimizer.name().to_string(),
            got: checkpoint.optimizer,
        });
    }

    let mut state = BTreeMap::new();
    for (key, acc) in checkpoint.state {
        let restored = acc.into_accumulator(&key)?;
        state.insert(key, restored);
    }
    optimizer.load_state_dict(state)?;
    Ok(())
}
