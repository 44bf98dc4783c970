//! Inequality-constrained minimization.
//!
//! [`ConstraintSet`] wraps an ordered list of scalar constraints
//! `g_i(x) <= 0` together with their Jacobian. The
//! [`gradient_projection`] solver works directly on the constraint
//! geometry through [`active_set`] resolution, while [`penalty`] and
//! [`lagrangian`] fold the constraints into the objective and drive an
//! unconstrained inner solver instead.

pub mod active_set;
pub mod gradient_projection;
pub mod lagrangian;
pub mod penalty;

pub use gradient_projection::GradientProjectionConfig;
pub use lagrangian::LagrangianConfig;
pub use penalty::{PenaltyConfig, PenaltyKind};

use num_traits::Float;
use std::fmt::Debug;

/// A scalar inequality constraint `g(x) <= 0`.
pub type ConstraintFn<T> = Box<dyn Fn(&[T]) -> T>;

/// Produces the full constraint Jacobian at a point, one row per constraint.
pub type JacobianFn<T> = Box<dyn Fn(&[T]) -> Vec<Vec<T>>>;

/// An ordered set of inequality constraints `g_i(x) <= 0` and their
/// Jacobian.
///
/// A constraint's position in the set is its identity: evaluation order,
/// Jacobian row order and the multiplier order of the solvers all follow
/// it. Gradients are supplied by the caller through the Jacobian callable,
/// typically from closed-form derivatives of each constraint.
pub struct ConstraintSet<T> {
    constraints: Vec<ConstraintFn<T>>,
    jacobian: JacobianFn<T>,
}

impl<T> ConstraintSet<T>
where
    T: Float + Debug,
{
    /// Creates a constraint set from constraint functions and a callable
    /// producing all Jacobian rows at once.
    pub fn new(constraints: Vec<ConstraintFn<T>>, jacobian: JacobianFn<T>) -> Self {
        Self {
            constraints,
            jacobian,
        }
    }

    /// Number of constraints in the set.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set holds no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluates every constraint at `x`, preserving index order.
    pub fn evaluate(&self, x: &[T]) -> Vec<T> {
        self.constraints.iter().map(|g| g(x)).collect()
    }

    /// Evaluates the single constraint `index` at `x`.
    pub fn evaluate_one(&self, index: usize, x: &[T]) -> T {
        (self.constraints[index])(x)
    }

    /// Full constraint Jacobian at `x`; row `i` is the gradient of
    /// constraint `i`.
    pub fn jacobian(&self, x: &[T]) -> Vec<Vec<T>> {
        (self.jacobian)(x)
    }

    /// Whether every constraint named in `indices` holds (`g <= 0`) at `x`.
    pub fn satisfied(&self, indices: &[usize], x: &[T]) -> bool {
        indices
            .iter()
            .all(|&i| (self.constraints[i])(x) <= T::zero())
    }
}
