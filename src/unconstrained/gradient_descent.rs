use log::trace;
use num_traits::Float;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::linesearch::{Interval, LineSearchMethod};
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for steepest descent.
#[derive(Debug, Clone)]
pub struct GradientDescentConfig<T>
where
    T: Float + Debug,
{
    /// Gradient-norm convergence tolerance.
    pub gradient_tolerance: T,
    /// Step-norm convergence tolerance.
    pub sigma: T,
    /// Objective-value-change convergence tolerance.
    pub value_tolerance: T,
    /// Upper bound of the step-length search interval.
    pub max_step: T,
    /// Tolerance of the one-dimensional step-length search.
    pub step_tolerance: T,
    /// Hard iteration cap.
    pub max_iterations: usize,
    /// One-dimensional minimizer for the step length.
    pub line_search: LineSearchMethod,
}

impl<T> Default for GradientDescentConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            gradient_tolerance: T::from(1e-6).unwrap(),
            sigma: T::from(1e-6).unwrap(),
            value_tolerance: T::from(1e-6).unwrap(),
            max_step: T::from(10.0).unwrap(),
            step_tolerance: T::from(1e-8).unwrap(),
            max_iterations: 1000,
            line_search: LineSearchMethod::GoldenSection,
        }
    }
}

impl<T> GradientDescentConfig<T>
where
    T: Float + Debug,
{
    /// Validates the configuration, failing fast before any iteration.
    pub fn validate(&self) -> Result<()> {
        super::require_positive(self.gradient_tolerance, "gradient_tolerance")?;
        super::require_positive(self.sigma, "sigma")?;
        super::require_positive(self.value_tolerance, "value_tolerance")?;
        super::require_positive(self.max_step, "max_step")?;
        super::require_positive(self.step_tolerance, "step_tolerance")?;
        super::require_iterations(self.max_iterations)
    }
}

/// Minimizes an objective function by steepest descent.
///
/// Each iteration follows the negated gradient, with the step length
/// chosen by the configured line search over `[0, max_step]`. Terminates
/// when the gradient norm falls below `gradient_tolerance`, when both the
/// step norm and the objective-value change fall below their tolerances,
/// or when the iteration budget runs out (reported through
/// `converged: false`, not as an error).
///
/// # Examples
///
/// ```
/// use descent::unconstrained::gradient_descent::{self, GradientDescentConfig};
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
///     gradient_descent::minimize(&Sphere, &[3.0, -2.0], &GradientDescentConfig::default())
///         .unwrap();
/// assert!(result.converged);
/// assert!(result.optimal_value < 1e-8);
/// ```
pub fn minimize<T, F>(
    f: &F,
    initial_point: &[T],
    config: &GradientDescentConfig<T>,
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

        if super::norm(&gradient) < config.gradient_tolerance {
            converged = true;
            break;
        }

        let direction: Vec<T> = gradient.iter().map(|&g| -g).collect();
        let line = config.line_search.minimize(
            |alpha| f.evaluate(&super::offset(&x, &direction, alpha)),
            Interval::new(T::zero(), config.max_step),
            config.step_tolerance,
        )?;
        trace!("iteration {}: step {:?}", iterations, line.x_min);

        let next = super::offset(&x, &direction, line.x_min);
        iterations += 1;

        let step_norm = super::distance(&next, &x);
        let value_change = (f.evaluate(&next) - f.evaluate(&x)).abs();
        x = next;

        if step_norm < config.sigma && value_change < config.value_tolerance {
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

    // f(x) = (x - 2)^2
    struct QuadraticWithMinimum;

    impl ObjectiveFunction<f64> for QuadraticWithMinimum {
        fn evaluate(&self, point: &[f64]) -> f64 {
            (point[0] - 2.0).powi(2)
        }

        fn gradient(&self, point: &[f64]) -> Option<Vec<f64>> {
            Some(vec![2.0 * (point[0] - 2.0)])
        }
    }

    struct NoGradient;

    impl ObjectiveFunction<f64> for NoGradient {
        fn evaluate(&self, point: &[f64]) -> f64 {
            point[0] * point[0]
        }
    }

    #[test]
    fn test_sphere() {
        let result = minimize(&Sphere, &[3.0, 3.0], &GradientDescentConfig::default()).unwrap();
        assert!(result.converged);
        assert!(result.optimal_value < 1e-8);
        for x in result.optimal_point {
            assert!(x.abs() < 1e-4);
        }
    }

    #[test]
    fn test_shifted_quadratic() {
        let result = minimize(
            &QuadraticWithMinimum,
            &[-1.0],
            &GradientDescentConfig::default(),
        )
        .unwrap();
        assert!(result.converged);
        assert!((result.optimal_point[0] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_gradient() {
        let result = minimize(&NoGradient, &[1.0], &GradientDescentConfig::default());
        assert_eq!(result.unwrap_err(), Error::MissingGradient);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GradientDescentConfig::default();
        config.max_step = 0.0;
        let result = minimize(&Sphere, &[1.0, 1.0], &config);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
