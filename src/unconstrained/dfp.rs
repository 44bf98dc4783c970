use log::trace;
use num_traits::Float;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::linesearch::{Interval, LineSearchMethod};
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for the Davidon-Fletcher-Powell quasi-Newton method.
#[derive(Debug, Clone)]
pub struct DfpConfig<T>
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
    /// Iterations between resets of the inverse-Hessian estimate.
    pub reset_interval: usize,
    /// Hard iteration cap.
    pub max_iterations: usize,
    /// One-dimensional minimizer for the step length.
    pub line_search: LineSearchMethod,
}

impl<T> Default for DfpConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            gradient_tolerance: T::from(1e-6).unwrap(),
            sigma: T::from(1e-8).unwrap(),
            value_tolerance: T::from(1e-9).unwrap(),
            max_step: T::from(10.0).unwrap(),
            step_tolerance: T::from(1e-8).unwrap(),
            reset_interval: 50,
            max_iterations: 500,
            line_search: LineSearchMethod::GoldenSection,
        }
    }
}

impl<T> DfpConfig<T>
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

        if self.reset_interval == 0 {
            return Err(Error::InvalidConfig {
                name: "reset_interval",
                reason: "must be positive",
            });
        }

        super::require_iterations(self.max_iterations)
    }
}

/// Minimizes an objective function with the Davidon-Fletcher-Powell
/// quasi-Newton method.
///
/// Maintains an estimate `H` of the inverse Hessian, searched along
/// `-H * grad` with the configured line search, and updated after each
/// step by the DFP rank-two formula. The estimate is reset to the
/// identity every `reset_interval` iterations and whenever the update
/// denominators degenerate. Terminates when the gradient norm falls below
/// `gradient_tolerance`, when both the step norm and the value change
/// fall below their tolerances, or when the iteration budget runs out
/// (reported through `converged: false`, not as an error).
pub fn minimize<T, F>(
    f: &F,
    initial_point: &[T],
    config: &DfpConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate()?;

    let n = initial_point.len();
    let mut x = initial_point.to_vec();
    let mut h = identity(n);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        let gradient = f.gradient(&x).ok_or(Error::MissingGradient)?;

        if super::norm(&gradient) < config.gradient_tolerance {
            converged = true;
            break;
        }

        let direction: Vec<T> = h.iter().map(|row| -super::dot(row, &gradient)).collect();
        let line = config.line_search.minimize(
            |alpha| f.evaluate(&super::offset(&x, &direction, alpha)),
            Interval::new(T::zero(), config.max_step),
            config.step_tolerance,
        )?;

        let next = super::offset(&x, &direction, line.x_min);
        let next_gradient = f.gradient(&next).ok_or(Error::MissingGradient)?;
        iterations += 1;

        let delta_x: Vec<T> = next.iter().zip(x.iter()).map(|(&a, &b)| a - b).collect();
        let delta_g: Vec<T> = next_gradient
            .iter()
            .zip(gradient.iter())
            .map(|(&a, &b)| a - b)
            .collect();

        if iterations % config.reset_interval == 0 {
            h = identity(n);
            trace!("iteration {}: inverse-Hessian estimate reset", iterations);
        } else {
            update_inverse_hessian(&mut h, &delta_x, &delta_g);
        }

        let step_norm = super::norm(&delta_x);
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

/// DFP rank-two update
/// `H <- H + (dx dx^T)/(dx . dg) - (H dg)(H dg)^T/(dg . H dg)`,
/// falling back to the identity when either denominator degenerates.
fn update_inverse_hessian<T>(h: &mut Vec<Vec<T>>, delta_x: &[T], delta_g: &[T])
where
    T: Float,
{
    let n = delta_x.len();
    let tiny = T::from(1e-12).unwrap();

    let xg = super::dot(delta_x, delta_g);
    let h_dg: Vec<T> = h.iter().map(|row| super::dot(row, delta_g)).collect();
    let g_h_g = super::dot(delta_g, &h_dg);

    if xg.abs() < tiny || g_h_g.abs() < tiny {
        *h = identity(n);
        return;
    }

    for i in 0..n {
        for j in 0..n {
            h[i][j] = h[i][j] + delta_x[i] * delta_x[j] / xg - h_dg[i] * h_dg[j] / g_h_g;
        }
    }
}

fn identity<T>(n: usize) -> Vec<Vec<T>>
where
    T: Float,
{
    let mut matrix = vec![vec![T::zero(); n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = T::one();
    }
    matrix
}
