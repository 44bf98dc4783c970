//! Unconstrained multivariate minimization.
//!
//! The gradient-driven methods (steepest descent, conjugate gradient, DFP)
//! pick their step lengths with the one-dimensional oracles from
//! [`crate::linesearch`]; Nelder-Mead and pattern search are
//! derivative-free. The penalty and Lagrangian orchestrations in
//! [`crate::constrained`] use these methods as their inner solvers.

pub mod conjugate_gradient;
pub mod dfp;
pub mod gradient_descent;
pub mod nelder_mead;
pub mod pattern_search;

pub use conjugate_gradient::ConjugateGradientConfig;
pub use dfp::DfpConfig;
pub use gradient_descent::GradientDescentConfig;
pub use nelder_mead::NelderMeadConfig;
pub use pattern_search::PatternSearchConfig;

use num_traits::Float;

use crate::error::{Error, Result};

fn require_positive<T>(value: T, name: &'static str) -> Result<()>
where
    T: Float,
{
    if value > T::zero() {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            name,
            reason: "must be positive",
        })
    }
}

fn require_iterations(max_iterations: usize) -> Result<()> {
    if max_iterations > 0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            name: "max_iterations",
            reason: "must be positive",
        })
    }
}

fn dot<T>(a: &[T], b: &[T]) -> T
where
    T: Float,
{
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&ai, &bi)| acc + ai * bi)
}

fn norm<T>(v: &[T]) -> T
where
    T: Float,
{
    dot(v, v).sqrt()
}

fn offset<T>(x: &[T], direction: &[T], alpha: T) -> Vec<T>
where
    T: Float,
{
    x.iter()
        .zip(direction.iter())
        .map(|(&xi, &di)| xi + alpha * di)
        .collect()
}

fn distance<T>(a: &[T], b: &[T]) -> T
where
    T: Float,
{
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&ai, &bi)| acc + (ai - bi) * (ai - bi))
        .sqrt()
}
