//! # pdeflow Core Library
//!
//! This crate provides the training core for physics-informed neural
//! networks (PINNs): the gradient-based parameter-update engine with its
//! five update rules, the small activation library their callers use, and
//! utilities for checkpointing and data-parallel gradient aggregation.
//! It's designed to be used both directly in Rust and via the optional
//! Python bindings.
//!
//! The training loop itself lives outside this crate. Each step it hands
//! the active optimizer a loss gradient together with the previous update
//! ("velocity"), receives the next update delta, and applies it as
//! `parameters -= delta`.

// Re-export key components for easier use, especially from Python bindings
pub mod tensor;
pub mod nn;
pub mod optim;
pub mod utils;
#[cfg(feature = "python")]
pub mod bindings; // Module specifically for PyO3 bindings setup

pub use optim::{Optimizer, OptimizerError};
pub use tensor::{Tensor, TensorData};
