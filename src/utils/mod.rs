//! # Utility Functions (`utils`)
//!
//! Provides helper functions and structures for checkpoint serialization
//! and batch-gradient aggregation.

pub mod parallel;
pub mod serialization;

pub use parallel::{aggregate_gradients, sum_gradients};
pub use serialization::{load_state, save_state, SerializationError};
