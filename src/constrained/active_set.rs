use num_traits::Float;
use std::fmt::Debug;

use crate::constrained::ConstraintSet;

/// Finds the indices of the constraints active at `x`, in index order.
///
/// A constraint is active when its value lies within `epsilon` of the
/// boundary or is positive (violated); strictly interior constraints are
/// passive.
///
/// # Examples
///
/// ```
/// use descent::constrained::{active_set, ConstraintFn, ConstraintSet};
///
/// // g(x) = x1 + x2 - 1 <= 0
/// let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| x[0] + x[1] - 1.0)];
/// let set = ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![1.0, 1.0]]));
///
/// assert_eq!(active_set::find_active(&set, &[0.5, 0.5], 1e-6), vec![0]);
/// assert!(active_set::find_active(&set, &[0.0, 0.0], 1e-6).is_empty());
/// ```
pub fn find_active<T>(set: &ConstraintSet<T>, x: &[T], epsilon: T) -> Vec<usize>
where
    T: Float + Debug,
{
    set.evaluate(x)
        .iter()
        .enumerate()
        .filter(|&(_, &g)| g.abs() <= epsilon || g > T::zero())
        .map(|(i, _)| i)
        .collect()
}

/// Selects the Jacobian rows named by `indices` at `x`, in the given
/// order.
///
/// Row order matters: it fixes which multiplier belongs to which
/// constraint in the computations downstream.
pub fn submatrix<T>(set: &ConstraintSet<T>, indices: &[usize], x: &[T]) -> Vec<Vec<T>>
where
    T: Float + Debug,
{
    let full = set.jacobian(x);
    indices.iter().map(|&i| full[i].clone()).collect()
}

/// Complement of `indices` within the constraint set, in index order.
pub fn passive_indices<T>(set: &ConstraintSet<T>, indices: &[usize]) -> Vec<usize>
where
    T: Float + Debug,
{
    (0..set.len()).filter(|i| !indices.contains(i)).collect()
}
