//! # Python Bindings (`pdeflow`)
//!
//! This module uses PyO3 to expose the update engine to Python, so the
//! research-side training loops can drive it without leaving NumPy.
//! Arrays cross the boundary as `float64`; every output is a freshly
//! allocated array.

use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::nn::functional::{DEFAULT_ELU_ALPHA, DEFAULT_LEAKY_SLOPE};
use crate::nn::Activation;
use crate::optim::{
    Adagrad, Adam, MomentumGD, Optimizer, OptimizerError, PlainGD, RMSProp, ResetPolicy,
};
use crate::tensor::TensorData;

// --- Error Translation ---

impl std::convert::From<OptimizerError> for PyErr {
    fn from(err: OptimizerError) -> PyErr {
        match err {
            OptimizerError::UnsupportedRegularizationOrder { .. }
            | OptimizerError::ShapeMismatch { .. }
            | OptimizerError::InvalidHyperparameter(_)
            | OptimizerError::EmptyAggregation => PyValueError::new_err(err.to_string()),
            OptimizerError::InvalidStateDict(_) => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

// --- Optimizer Wrapper (`pdeflow.Optimizer`) ---

/// One update rule behind a uniform Python surface.
#[pyclass(name = "Optimizer", module = "pdeflow")]
pub struct PyOptimizer {
    inner: Box<dyn Optimizer + Send>,
}

#[pymethods]
impl PyOptimizer {
    /// Plain gradient descent.
    #[staticmethod]
    #[pyo3(signature = (learning_rate=None, lmbda=None, lp=None))]
    fn plain_gd(
        learning_rate: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> PyResult<Self> {
        Ok(PyOptimizer {
            inner: Box::new(PlainGD::new(learning_rate, lmbda, lp)?),
        })
    }

    /// Gradient descent with a velocity term.
    #[staticmethod]
    #[pyo3(signature = (learning_rate=None, momentum=None, lmbda=None, lp=None))]
    fn momentum_gd(
        learning_rate: Option<TensorData>,
        momentum: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> PyResult<Self> {
        Ok(PyOptimizer {
            inner: Box::new(MomentumGD::new(learning_rate, momentum, lmbda, lp)?),
        })
    }

    /// Adagrad-style adaptive stepping.
    #[staticmethod]
    #[pyo3(signature = (learning_rate=None, momentum=None, lmbda=None, lp=None))]
    fn adagrad(
        learning_rate: Option<TensorData>,
        momentum: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> PyResult<Self> {
        Ok(PyOptimizer {
            inner: Box::new(Adagrad::new(learning_rate, momentum, lmbda, lp)?),
        })
    }

    /// RMSProp.
    #[staticmethod]
    #[pyo3(signature = (learning_rate=None, decay=None, lmbda=None, lp=None))]
    fn rmsprop(
        learning_rate: Option<TensorData>,
        decay: Option<TensorData>,
        lmbda: Option<TensorData>,
        lp: Option<u32>,
    ) -> PyResult<Self> {
        Ok(PyOptimizer {
            inner: Box::new(RMSProp::new(learning_rate, decay, lmbda, lp)?),
        })
    }

    /// Adam. Pass `restart_schedule_on_reset=True` to restart bias
    /// correction at step 1 whenever `reset` is called.
    #[staticmethod]
    #[pyo3(signature = (learning_rate=None, decay_rates=None, lmbda=None, restart_schedule_on_reset=false))]
    fn adam(
        learning_rate: Option<TensorData>,
        decay_rates: Option<(TensorData, TensorData)>,
        lmbda: Option<TensorData>,
        restart_schedule_on_reset: bool,
    ) -> PyResult<Self> {
        let policy = if restart_schedule_on_reset {
            ResetPolicy::RestartSchedule
        } else {
            ResetPolicy::CarryStep
        };
        Ok(PyOptimizer {
            inner: Box::new(Adam::with_reset_policy(
                learning_rate,
                decay_rates,
                lmbda,
                policy,
            )?),
        })
    }

    /// Computes the next update step. The caller applies it as
    /// `parameters -= update`.
    fn update<'py>(
        &mut self,
        py: Python<'py>,
        gradient: PyReadonlyArrayDyn<'py, TensorData>,
        previous_update: PyReadonlyArrayDyn<'py, TensorData>,
    ) -> PyResult<Bound<'py, PyArrayDyn<TensorData>>> {
        let gradient = gradient.as_array().to_owned();
        let previous_update = previous_update.as_array().to_owned();
        let next = self.inner.update(&gradient, &previous_update)?;
        Ok(next.into_pyarray_bound(py))
    }

    /// Clears accumulated state, e.g. at an epoch boundary.
    fn reset(&mut self) {
        self.inner.reset();
    }

    #[getter]
    fn learning_rate(&self) -> TensorData {
        self.inner.learning_rate()
    }

    #[getter]
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn __repr__(&self) -> String {
        format!(
            "Optimizer(name='{}', learning_rate={})",
            self.inner.name(),
            self.inner.learning_rate()
        )
    }
}

// --- Activation Wrapper (`pdeflow.Activation`) ---

/// An elementwise activation selected by name.
#[pyclass(name = "Activation", module = "pdeflow")]
pub struct PyActivation {
    inner: Activation,
}

#[pymethods]
impl PyActivation {
    /// # Arguments
    /// * `kind`: one of `identity`, `sigmoid`, `tanh`, `relu`,
    ///   `leaky_relu`, `elu`, `gelu`, `silu`.
    /// * `alpha`: slope (`leaky_relu`) or saturation scale (`elu`);
    ///   ignored by the other kinds.
    #[new]
    #[pyo3(signature = (kind, alpha=None))]
    fn new(kind: &str, alpha: Option<TensorData>) -> PyResult<Self> {
        let inner = match kind {
            "identity" => Activation::Identity,
            "sigmoid" => Activation::Sigmoid,
            "tanh" => Activation::Tanh,
            "relu" => Activation::ReLU,
            "leaky_relu" => Activation::LeakyReLU {
                alpha: alpha.unwrap_or(DEFAULT_LEAKY_SLOPE),
            },
            "elu" => Activation::ELU {
                alpha: alpha.unwrap_or(DEFAULT_ELU_ALPHA),
            },
            "gelu" => Activation::GELU,
            "silu" => Activation::SiLU,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown activation kind '{other}'"
                )))
            }
        };
        Ok(PyActivation { inner })
    }

    fn __call__<'py>(
        &self,
        py: Python<'py>,
        z: PyReadonlyArrayDyn<'py, TensorData>,
    ) -> Bound<'py, PyArrayDyn<TensorData>> {
        self.inner.apply(&z.as_array().to_owned()).into_pyarray_bound(py)
    }

    fn __repr__(&self) -> String {
        format!("Activation(kind='{}')", self.inner.name())
    }
}

// --- Main Python Module Definition (`pdeflow`) ---

#[pymodule]
fn pdeflow(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyOptimizer>()?;
    m.add_class::<PyActivation>()?;
    Ok(())
}
