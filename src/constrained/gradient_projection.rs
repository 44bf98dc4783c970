use log::{debug, trace};
use num_traits::Float;
use std::fmt::Debug;

use crate::constrained::{active_set, ConstraintSet};
use crate::error::{Error, Result};
use crate::linesearch::{Interval, LineSearchMethod};
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for the gradient projection solver.
#[derive(Debug, Clone)]
pub struct GradientProjectionConfig<T>
where
    T: Float + Debug,
{
    /// Near-activity tolerance of the active-set test.
    pub eps1: T,
    /// Convergence tolerance on gradient, direction and value-change norms.
    pub eps2: T,
    /// Seed step length of the feasibility bracketing.
    pub alpha0: T,
    /// Upper bound on the feasibility bracketing expansion.
    pub alpha_max: T,
    /// Bisection tolerance of the feasible step bound and the line search.
    pub alpha_precision: T,
    /// Step-norm convergence tolerance.
    pub sigma: T,
    /// Hard iteration cap.
    pub max_iterations: usize,
    /// One-dimensional minimizer used for the step-length search.
    pub line_search: LineSearchMethod,
}

impl<T> Default for GradientProjectionConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            eps1: T::from(1e-4).unwrap(),
            eps2: T::from(1e-6).unwrap(),
            alpha0: T::from(0.1).unwrap(),
            alpha_max: T::from(100.0).unwrap(),
            alpha_precision: T::from(1e-6).unwrap(),
            sigma: T::from(1e-6).unwrap(),
            max_iterations: 200,
            line_search: LineSearchMethod::Dichotomy,
        }
    }
}

impl<T> GradientProjectionConfig<T>
where
    T: Float + Debug,
{
    /// Validates the configuration, failing fast before any iteration.
    pub fn validate(&self) -> Result<()> {
        require_positive(self.eps1, "eps1")?;
        require_positive(self.eps2, "eps2")?;
        require_positive(self.alpha0, "alpha0")?;
        require_positive(self.alpha_precision, "alpha_precision")?;
        require_positive(self.sigma, "sigma")?;

        if self.alpha_max <= self.alpha0 {
            return Err(Error::InvalidConfig {
                name: "alpha_max",
                reason: "must exceed alpha0",
            });
        }

        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig {
                name: "max_iterations",
                reason: "must be positive",
            });
        }

        Ok(())
    }
}

/// Minimizes an objective subject to inequality constraints `g_i(x) <= 0`
/// by active-set gradient projection.
///
/// Each iteration projects the negated gradient onto the tangent space of
/// the currently active constraints. When the projected direction
/// vanishes, the Lagrange multiplier estimates decide between declaring
/// the point a KKT candidate and dropping the constraint with the most
/// negative multiplier; when a direction survives, the step length is
/// bounded by the feasibility of the passive constraints and chosen by
/// the configured line search. An exhausted iteration budget is reported
/// through `converged: false` on the returned result, not as an error.
///
/// # Arguments
///
/// * `f` - The objective function; its gradient is required
/// * `constraints` - The inequality constraint set
/// * `initial_point` - The starting point, expected feasible
/// * `config` - Configuration options for the solver
///
/// # Errors
///
/// [`Error::MissingGradient`] when the objective has no gradient,
/// [`Error::SingularActiveSet`] when the active constraint gradients are
/// linearly dependent, [`Error::InvalidConfig`] on a malformed
/// configuration, and any line-search error encountered during the
/// step-length search.
///
/// # Examples
///
/// ```
/// use descent::constrained::gradient_projection::{self, GradientProjectionConfig};
/// use descent::constrained::{ConstraintFn, ConstraintSet};
/// use descent::ObjectiveFunction;
///
/// struct Sphere;
///
/// impl ObjectiveFunction<f64> for Sphere {
///     fn evaluate(&self, point: &[f64]) -> f64 {
///         point.iter().map(|x| x * x).sum()
///     }
///
///     fn gradient(&self, point: &[f64]) -> Option<Vec<f64>> {
///         Some(point.iter().map(|x| 2.0 * x).collect())
///     }
/// }
///
/// // feasible region: x + y >= 2
/// let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| -(x[0] + x[1] - 2.0))];
/// let set = ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![-1.0, -1.0]]));
///
/// let result = gradient_projection::minimize(
///     &Sphere,
///     &set,
///     &[3.0, 3.0],
///     &GradientProjectionConfig::default(),
/// )
/// .unwrap();
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 1.0).abs() < 1e-3);
/// assert!((result.optimal_point[1] - 1.0).abs() < 1e-3);
/// ```
pub fn minimize<T, F>(
    f: &F,
    constraints: &ConstraintSet<T>,
    initial_point: &[T],
    config: &GradientProjectionConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate()?;

    let mut x = initial_point.to_vec();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        let gradient = f.gradient(&x).ok_or(Error::MissingGradient)?;

        if norm(&gradient) < config.eps2 {
            converged = true;
            break;
        }

        let mut active = active_set::find_active(constraints, &x, config.eps1);
        trace!("iteration {}: x = {:?}, active = {:?}", iterations, x, active);

        // Look for a descent direction on the active constraint surface.
        // A vanishing projection makes the point a stationary candidate:
        // the multiplier signs then either certify it or name the
        // constraint to drop. Constraints are only ever removed here.
        let mut direction = None;
        while !active.is_empty() {
            let mat_a = active_set::submatrix(constraints, &active, &x);
            let w = solve_gram(&mat_a, &gradient, x.len())?;
            let candidate = projected_direction(&mat_a, &w, &gradient);

            if norm(&candidate) > config.eps2 {
                direction = Some(candidate);
                break;
            }

            let lambda: Vec<T> = w.iter().map(|&wi| -wi).collect();
            if lambda.iter().all(|&l| l >= T::zero()) {
                debug!("KKT point reached, multipliers {:?}", lambda);
                converged = true;
                break;
            }

            let weakest = weakest_index(&lambda);
            debug!(
                "dropping constraint {} (multiplier {:?})",
                active[weakest], lambda[weakest]
            );
            active.remove(weakest);
        }

        if converged {
            break;
        }

        let direction =
            direction.unwrap_or_else(|| gradient.iter().map(|&g| -g).collect());

        let passive = active_set::passive_indices(constraints, &active);
        let alpha_bound = max_feasible_step(constraints, &passive, &x, &direction, config)?;

        if alpha_bound <= config.alpha_precision {
            // jammed against the passive boundary, no room to move
            converged = true;
            break;
        }

        let line = config.line_search.minimize(
            |alpha| f.evaluate(&offset(&x, &direction, alpha)),
            Interval::new(T::zero(), alpha_bound),
            config.alpha_precision,
        )?;

        let next = offset(&x, &direction, line.x_min);
        iterations += 1;

        let step_norm = distance(&next, &x);
        let value_change = (f.evaluate(&next) - f.evaluate(&x)).abs();
        x = next;

        if step_norm < config.sigma && value_change < config.eps2 {
            converged = true;
            break;
        }
    }

    Ok(OptimizationResult {
        optimal_value: f.evaluate(&x),
        optimal_point: x,
        iterations,
        converged,
    })
}

/// Largest step along `direction` from `x` keeping every constraint named
/// in `indices` satisfied.
///
/// Expands geometrically from `config.alpha0` (doubling while feasible,
/// halving while infeasible) to bracket the feasibility boundary, then
/// bisects the bracket down to `config.alpha_precision` and returns its
/// certified feasible end. Returns `config.alpha_max` when the whole
/// expansion range stays feasible, and zero when no feasible step above
/// `config.alpha_precision` exists.
pub fn max_feasible_step<T>(
    constraints: &ConstraintSet<T>,
    indices: &[usize],
    x: &[T],
    direction: &[T],
    config: &GradientProjectionConfig<T>,
) -> Result<T>
where
    T: Float + Debug,
{
    config.validate()?;

    if indices.is_empty() {
        return Ok(config.alpha_max);
    }

    let two = T::from(2.0).unwrap();
    let feasible = |alpha: T| constraints.satisfied(indices, &offset(x, direction, alpha));

    let mut alpha = config.alpha0;

    // bracket the boundary: lo feasible, hi infeasible
    let (mut lo, mut hi) = if feasible(alpha) {
        loop {
            if alpha >= config.alpha_max {
                return Ok(config.alpha_max);
            }
            let next = (alpha * two).min(config.alpha_max);
            if !feasible(next) {
                break (alpha, next);
            }
            alpha = next;
        }
    } else {
        loop {
            let next = alpha / two;
            if next <= config.alpha_precision {
                return Ok(T::zero());
            }
            if feasible(next) {
                break (next, alpha);
            }
            alpha = next;
        }
    };

    while hi - lo > config.alpha_precision {
        let mid = (lo + hi) / two;
        if feasible(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(lo)
}

/// Lagrange multiplier estimates for the constraints `indices` at `x`:
/// `lambda = -(A A^T)^-1 A grad`, with `A` the sub-Jacobian of the named
/// constraints. The estimate order follows `indices`.
///
/// # Errors
///
/// [`Error::SingularActiveSet`] when the named constraint gradients are
/// linearly dependent.
pub fn multiplier_estimates<T>(
    constraints: &ConstraintSet<T>,
    indices: &[usize],
    x: &[T],
    gradient: &[T],
) -> Result<Vec<T>>
where
    T: Float + Debug,
{
    let mat_a = active_set::submatrix(constraints, indices, x);
    let w = solve_gram(&mat_a, gradient, x.len())?;
    Ok(w.iter().map(|&wi| -wi).collect())
}

/// Solves the Gram system `(A A^T) w = A g`.
fn solve_gram<T>(mat_a: &[Vec<T>], gradient: &[T], dimension: usize) -> Result<Vec<T>>
where
    T: Float + Debug,
{
    let m = mat_a.len();
    let mut gram = vec![vec![T::zero(); m]; m];
    for (i, row_i) in mat_a.iter().enumerate() {
        for (j, row_j) in mat_a.iter().enumerate() {
            gram[i][j] = dot(row_i, row_j);
        }
    }

    let rhs: Vec<T> = mat_a.iter().map(|row| dot(row, gradient)).collect();

    solve_linear_system(gram, rhs).ok_or(Error::SingularActiveSet {
        active: m,
        dimension,
    })
}

/// The projected direction `d = A^T w - g`, equal to
/// `-(I - A^T (A A^T)^-1 A) g` for `w` solving the Gram system.
fn projected_direction<T>(mat_a: &[Vec<T>], w: &[T], gradient: &[T]) -> Vec<T>
where
    T: Float + Debug,
{
    (0..gradient.len())
        .map(|j| {
            let at_w = mat_a
                .iter()
                .zip(w.iter())
                .fold(T::zero(), |acc, (row, &wi)| acc + row[j] * wi);
            at_w - gradient[j]
        })
        .collect()
}

/// Gaussian elimination with partial pivoting; `None` on a vanishing
/// pivot.
fn solve_linear_system<T>(mut matrix: Vec<Vec<T>>, mut rhs: Vec<T>) -> Option<Vec<T>>
where
    T: Float + Debug,
{
    let n = rhs.len();
    let tiny = T::from(1e-12).unwrap();

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if matrix[row][col].abs() > matrix[pivot][col].abs() {
                pivot = row;
            }
        }
        if matrix[pivot][col].abs() < tiny {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..n {
                matrix[row][k] = matrix[row][k] - factor * matrix[col][k];
            }
            rhs[row] = rhs[row] - factor * rhs[col];
        }
    }

    let mut solution = vec![T::zero(); n];
    for row in (0..n).rev() {
        let mut sum = rhs[row];
        for k in (row + 1)..n {
            sum = sum - matrix[row][k] * solution[k];
        }
        solution[row] = sum / matrix[row][row];
    }

    Some(solution)
}

fn weakest_index<T>(lambda: &[T]) -> usize
where
    T: Float,
{
    let mut weakest = 0;
    for (i, &value) in lambda.iter().enumerate().skip(1) {
        if value < lambda[weakest] {
            weakest = i;
        }
    }
    weakest
}

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained::ConstraintFn;
    use approx::assert_relative_eq;

    // f(x, y) = x^2 + y^2
    struct Sphere;

    impl ObjectiveFunction<f64> for Sphere {
        fn evaluate(&self, point: &[f64]) -> f64 {
            point.iter().map(|x| x * x).sum()
        }

        fn gradient(&self, point: &[f64]) -> Option<Vec<f64>> {
            Some(point.iter().map(|x| 2.0 * x).collect())
        }
    }

    // f(x, y) = (x - 1)^2 + y^2
    struct ShiftedSphere;

    impl ObjectiveFunction<f64> for ShiftedSphere {
        fn evaluate(&self, point: &[f64]) -> f64 {
            (point[0] - 1.0).powi(2) + point[1].powi(2)
        }

        fn gradient(&self, point: &[f64]) -> Option<Vec<f64>> {
            Some(vec![2.0 * (point[0] - 1.0), 2.0 * point[1]])
        }
    }

    struct NoGradient;

    impl ObjectiveFunction<f64> for NoGradient {
        fn evaluate(&self, point: &[f64]) -> f64 {
            point.iter().map(|x| x * x).sum()
        }
    }

    // feasible region: x + y >= 2
    fn halfplane() -> ConstraintSet<f64> {
        let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| -(x[0] + x[1] - 2.0))];
        ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![-1.0, -1.0]]))
    }

    // feasible region: x + y >= -10, never binding near the origin
    fn distant_halfplane() -> ConstraintSet<f64> {
        let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| -(x[0] + x[1] + 10.0))];
        ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![-1.0, -1.0]]))
    }

    // feasible region: x >= 0
    fn right_halfplane() -> ConstraintSet<f64> {
        let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| -x[0])];
        ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![-1.0, 0.0]]))
    }

    fn config() -> GradientProjectionConfig<f64> {
        GradientProjectionConfig {
            eps1: 1e-4,
            eps2: 1e-6,
            alpha0: 0.1,
            alpha_max: 100.0,
            alpha_precision: 1e-6,
            sigma: 1e-6,
            max_iterations: 200,
            line_search: LineSearchMethod::Dichotomy,
        }
    }

    #[test]
    fn test_converges_to_constraint_boundary() {
        let set = halfplane();
        let result = minimize(&Sphere, &set, &[3.0, 3.0], &config()).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_value, 2.0, epsilon = 1e-3);

        // the constraint is active at the solution with a nonnegative
        // multiplier, so the KKT conditions hold
        let active = active_set::find_active(&set, &result.optimal_point, 1e-4);
        assert_eq!(active, vec![0]);
        let gradient = Sphere.gradient(&result.optimal_point).unwrap();
        let lambda =
            multiplier_estimates(&set, &active, &result.optimal_point, &gradient).unwrap();
        assert!(lambda[0] >= 0.0);
        assert_relative_eq!(lambda[0], 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_unconstrained_fallback_when_never_binding() {
        let set = distant_halfplane();
        let result = minimize(&Sphere, &set, &[3.0, 3.0], &config()).unwrap();

        assert!(result.converged);
        assert!(result.optimal_point[0].abs() < 1e-4);
        assert!(result.optimal_point[1].abs() < 1e-4);
        assert!(result.optimal_value < 1e-8);
        assert!(active_set::find_active(&set, &result.optimal_point, 1e-4).is_empty());
    }

    #[test]
    fn test_restart_from_solution_terminates_quickly() {
        let set = halfplane();
        let first = minimize(&Sphere, &set, &[3.0, 3.0], &config()).unwrap();
        let second = minimize(&Sphere, &set, &first.optimal_point, &config()).unwrap();

        assert!(second.converged);
        assert!(second.iterations <= 2);
        assert_relative_eq!(second.optimal_value, first.optimal_value, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_multiplier_drops_constraint() {
        // the boundary start is not optimal: the constraint's multiplier
        // comes out negative, the set empties and the raw gradient leads
        // to the interior minimum at (1, 0)
        let set = right_halfplane();
        let result = minimize(&ShiftedSphere, &set, &[0.0, 0.0], &config()).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-4);
        assert!(result.optimal_point[1].abs() < 1e-4);
        assert!(result.optimal_value < 1e-8);
    }

    #[test]
    fn test_duplicate_constraints_are_singular() {
        let constraints: Vec<ConstraintFn<f64>> = vec![
            Box::new(|x| -(x[0] + x[1] - 2.0)),
            Box::new(|x| -(x[0] + x[1] - 2.0)),
        ];
        let set = ConstraintSet::new(
            constraints,
            Box::new(|_: &[f64]| vec![vec![-1.0, -1.0], vec![-1.0, -1.0]]),
        );

        let result = minimize(&Sphere, &set, &[1.0, 1.0], &config());
        assert_eq!(
            result.unwrap_err(),
            Error::SingularActiveSet {
                active: 2,
                dimension: 2
            }
        );
    }

    #[test]
    fn test_iteration_budget_reported_not_an_error() {
        let mut c = config();
        c.max_iterations = 1;
        let result = minimize(&Sphere, &halfplane(), &[3.0, 3.0], &c).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_missing_gradient_is_surfaced() {
        let result = minimize(&NoGradient, &halfplane(), &[3.0, 3.0], &config());
        assert_eq!(result.unwrap_err(), Error::MissingGradient);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut c = config();
        c.eps2 = 0.0;
        let result = minimize(&Sphere, &halfplane(), &[3.0, 3.0], &c);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let mut c = config();
        c.max_iterations = 0;
        let result = minimize(&Sphere, &halfplane(), &[3.0, 3.0], &c);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let mut c = config();
        c.alpha_max = c.alpha0;
        let result = minimize(&Sphere, &halfplane(), &[3.0, 3.0], &c);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_max_feasible_step_localizes_boundary() {
        // from (3, 3) along -(6, 6) the boundary x + y = 2 sits at
        // alpha = 1/3
        let set = halfplane();
        let c = config();
        let x = [3.0, 3.0];
        let d = [-6.0, -6.0];

        let bound = max_feasible_step(&set, &[0], &x, &d, &c).unwrap();
        assert_relative_eq!(bound, 1.0 / 3.0, epsilon = 1e-5);

        let before = offset(&x, &d, bound - c.alpha_precision);
        let after = offset(&x, &d, bound + 2.0 * c.alpha_precision);
        assert!(set.satisfied(&[0], &before));
        assert!(!set.satisfied(&[0], &after));
    }

    #[test]
    fn test_max_feasible_step_caps_at_alpha_max() {
        // moving away from the boundary never becomes infeasible
        let set = halfplane();
        let c = config();
        let bound = max_feasible_step(&set, &[0], &[3.0, 3.0], &[1.0, 1.0], &c).unwrap();
        assert_eq!(bound, c.alpha_max);
    }

    #[test]
    fn test_max_feasible_step_with_no_room() {
        // the direction leaves the feasible half-plane immediately
        let set = right_halfplane();
        let c = config();
        let bound = max_feasible_step(&set, &[0], &[0.0, 0.0], &[-1.0, 0.0], &c).unwrap();
        assert_eq!(bound, 0.0);
    }

    #[test]
    fn test_multiplier_estimates_on_boundary() {
        let set = halfplane();
        let gradient = Sphere.gradient(&[1.0, 1.0]).unwrap();
        let lambda = multiplier_estimates(&set, &[0], &[1.0, 1.0], &gradient).unwrap();
        assert_eq!(lambda.len(), 1);
        assert_relative_eq!(lambda[0], 2.0, epsilon = 1e-12);
    }
}
