use log::trace;
use num_traits::Float;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::linesearch::{Interval, LineSearchMethod};
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for the nonlinear conjugate gradient method.
#[derive(Debug, Clone)]
pub struct ConjugateGradientConfig<T>
where
    T: Float + Debug,
{
    /// Direction-norm convergence tolerance.
    pub direction_tolerance: T,
    /// Step-norm convergence tolerance.
    pub sigma: T,
    /// Upper bound of the step-length search interval.
    pub max_step: T,
    /// Tolerance of the one-dimensional step-length search.
    pub step_tolerance: T,
    /// Hard iteration cap.
    pub max_iterations: usize,
    /// One-dimensional minimizer for the step length.
    pub line_search: LineSearchMethod,
}

impl<T> Default for ConjugateGradientConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            direction_tolerance: T::from(1e-6).unwrap(),
            sigma: T::from(1e-8).unwrap(),
            max_step: T::from(10.0).unwrap(),
            step_tolerance: T::from(1e-8).unwrap(),
            max_iterations: 500,
            line_search: LineSearchMethod::GoldenSection,
        }
    }
}

impl<T> ConjugateGradientConfig<T>
where
    T: Float + Debug,
{
    /// Validates the configuration, failing fast before any iteration.
    pub fn validate(&self) -> Result<()> {
        super::require_positive(self.direction_tolerance, "direction_tolerance")?;
        super::require_positive(self.sigma, "sigma")?;
        super::require_positive(self.max_step, "max_step")?;
        super::require_positive(self.step_tolerance, "step_tolerance")?;
        super::require_iterations(self.max_iterations)
    }
}

/// Minimizes an objective function by Fletcher-Reeves nonlinear conjugate
/// gradient.
///
/// The search direction combines the fresh negated gradient with the
/// previous direction, weighted by the ratio of consecutive squared
/// gradient norms. Step lengths come from the configured line search over
/// `[0, max_step]`. Terminates when the conjugate direction collapses
/// below `direction_tolerance`, when the step norm falls below `sigma`,
/// or when the iteration budget runs out (reported through
/// `converged: false`, not as an error).
///
/// # Examples
///
/// ```
/// use descent::unconstrained::conjugate_gradient::{self, ConjugateGradientConfig};
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
/// let result =
///     conjugate_gradient::minimize(&Sphere, &[1.0, 1.0], &ConjugateGradientConfig::default())
///         .unwrap();
/// assert!(result.converged);
/// assert!(result.optimal_value < 1e-8);
/// ```
pub fn minimize<T, F>(
    f: &F,
    initial_point: &[T],
    config: &ConjugateGradientConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate()?;

    let mut x = initial_point.to_vec();
    let mut gradient = f.gradient(&x).ok_or(Error::MissingGradient)?;
    let mut direction: Vec<T> = gradient.iter().map(|&g| -g).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        if super::norm(&gradient) < config.direction_tolerance {
            converged = true;
            break;
        }

        let line = config.line_search.minimize(
            |alpha| f.evaluate(&super::offset(&x, &direction, alpha)),
            Interval::new(T::zero(), config.max_step),
            config.step_tolerance,
        )?;

        let next = super::offset(&x, &direction, line.x_min);
        let next_gradient = f.gradient(&next).ok_or(Error::MissingGradient)?;
        iterations += 1;

        // Fletcher-Reeves weight
        let beta = super::dot(&next_gradient, &next_gradient) / super::dot(&gradient, &gradient);
        direction = next_gradient
            .iter()
            .zip(direction.iter())
            .map(|(&g, &d)| -g + beta * d)
            .collect();
        trace!("iteration {}: beta {:?}", iterations, beta);

        let step_norm = super::distance(&next, &x);
        x = next;
        gradient = next_gradient;

        if super::norm(&direction) < config.direction_tolerance || step_norm < config.sigma {
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

#[cfg(test)]
mod tests {
    use super::*;

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

    // f(x, y) = x^2 + 4 y^2 + x y, a correlated convex quadratic
    struct Elliptic;

    impl ObjectiveFunction<f64> for Elliptic {
        fn evaluate(&self, point: &[f64]) -> f64 {
            let (x, y) = (point[0], point[1]);
            x * x + 4.0 * y * y + x * y
        }

        fn gradient(&self, point: &[f64]) -> Option<Vec<f64>> {
            let (x, y) = (point[0], point[1]);
            Some(vec![2.0 * x + y, 8.0 * y + x])
        }
    }

    #[test]
    fn test_sphere() {
        let result = minimize(&Sphere, &[1.0, 1.0], &ConjugateGradientConfig::default()).unwrap();
        assert!(result.converged);
        assert!(result.optimal_value < 1e-8);
        for x in result.optimal_point {
            assert!(x.abs() < 1e-4);
        }
    }

    #[test]
    fn test_correlated_quadratic() {
        let result = minimize(&Elliptic, &[2.0, -1.5], &ConjugateGradientConfig::default()).unwrap();
        assert!(result.converged);
        assert!(result.optimal_value.abs() < 1e-6);
        assert!(result.optimal_point[0].abs() < 1e-3);
        assert!(result.optimal_point[1].abs() < 1e-3);
    }

    #[test]
    fn test_iteration_budget_reported() {
        let config = ConjugateGradientConfig {
            max_iterations: 1,
            ..ConjugateGradientConfig::default()
        };
        let result = minimize(&Elliptic, &[2.0, -1.5], &config).unwrap();
        assert_eq!(result.iterations, 1);
    }
}
