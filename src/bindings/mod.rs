//! # Language Bindings
//!
//! Compiled only with the `python` feature enabled.

pub mod python;
