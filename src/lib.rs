//! Iterative numerical optimization methods.
//!
//! The crate covers three layers that build on each other:
//!
//! - [`linesearch`]: one-dimensional minimization oracles (dichotomy,
//!   golden section, Fibonacci) plus Svenn bracketing of a unimodal
//!   interval.
//! - [`unconstrained`]: multivariate descent methods driven by those
//!   oracles (steepest descent, Fletcher-Reeves conjugate gradient, DFP
//!   quasi-Newton, Nelder-Mead, pattern search).
//! - [`constrained`]: inequality-constrained solvers, centered on the
//!   active-set gradient projection method, with penalty and modified
//!   Lagrangian orchestrations on top.
//!
//! Objectives are supplied through the [`ObjectiveFunction`] trait;
//! gradients and constraint Jacobians are opaque callables, nothing is
//! differentiated symbolically. All matrices are dense and small: the
//! crate targets problems whose dimension fits in the low double digits.

pub mod constrained;
pub mod error;
pub mod linesearch;
pub mod unconstrained;

pub use constrained::ConstraintSet;
pub use error::{Error, Result};
pub use linesearch::{Interval, LineSearchMethod, LineSearchResult};

use num_traits::Float;
use std::fmt::Debug;

/// A scalar objective function over points in `R^n`.
pub trait ObjectiveFunction<T>
where
    T: Float + Debug,
{
    /// Evaluates the objective function at the given point.
    fn evaluate(&self, point: &[T]) -> T;

    /// Computes the gradient of the objective function at the given point.
    /// Returns None if the gradient is not available.
    fn gradient(&self, _point: &[T]) -> Option<Vec<T>> {
        None
    }
}

/// Result of an optimization process.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T>
where
    T: Float + Debug,
{
    /// The optimal point found
    pub optimal_point: Vec<T>,
    /// The value of the objective function at the optimal point
    pub optimal_value: T,
    /// Number of iterations performed
    pub iterations: usize,
    /// Whether the optimization converged within the iteration budget
    pub converged: bool,
}
