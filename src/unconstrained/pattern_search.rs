use log::trace;
use num_traits::Float;
use std::fmt::Debug;

use crate::error::Result;
use crate::linesearch::{Interval, LineSearchMethod};
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for pattern search.
#[derive(Debug, Clone)]
pub struct PatternSearchConfig<T>
where
    T: Float + Debug,
{
    /// Initial exploring step, applied to every coordinate.
    pub step: T,
    /// Factor applied to the steps when exploration fails.
    pub beta: T,
    /// Step and pattern-move termination tolerance.
    pub tolerance: T,
    /// Upper bound of the pattern-move search interval.
    pub pattern_bound: T,
    /// Tolerance of the one-dimensional pattern-move search.
    pub pattern_tolerance: T,
    /// Hard iteration cap.
    pub max_iterations: usize,
    /// One-dimensional minimizer for the pattern move.
    pub line_search: LineSearchMethod,
}

impl<T> Default for PatternSearchConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            step: T::from(1.0).unwrap(),
            beta: T::from(0.5).unwrap(),
            tolerance: T::from(1e-6).unwrap(),
            pattern_bound: T::from(2.0).unwrap(),
            pattern_tolerance: T::from(1e-8).unwrap(),
            max_iterations: 1000,
            line_search: LineSearchMethod::Dichotomy,
        }
    }
}

impl<T> PatternSearchConfig<T>
where
    T: Float + Debug,
{
    /// Validates the configuration, failing fast before any iteration.
    pub fn validate(&self) -> Result<()> {
        super::require_positive(self.step, "step")?;
        super::require_positive(self.tolerance, "tolerance")?;
        super::require_positive(self.pattern_bound, "pattern_bound")?;
        super::require_positive(self.pattern_tolerance, "pattern_tolerance")?;

        if self.beta <= T::zero() || self.beta >= T::one() {
            return Err(crate::error::Error::InvalidConfig {
                name: "beta",
                reason: "must lie strictly between 0 and 1",
            });
        }

        super::require_iterations(self.max_iterations)
    }
}

/// Minimizes an objective function by pattern search.
///
/// Alternates an exploring search, probing each coordinate in both
/// directions with the current steps, with a pattern move along the
/// direction the exploration uncovered, accelerated by the configured
/// line search over `[0, pattern_bound]`. When exploration fails the
/// steps shrink by `beta`. Derivative-free. Terminates once the pattern
/// move collapses below `tolerance` or every step has shrunk below it;
/// an exhausted iteration budget is reported through `converged: false`,
/// not as an error.
pub fn minimize<T, F>(
    f: &F,
    initial_point: &[T],
    config: &PatternSearchConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate()?;

    let mut x = initial_point.to_vec();
    let mut steps = vec![config.step; x.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        let probe = exploring_search(f, &x, &steps);
        if f.evaluate(&probe) < f.evaluate(&x) {
            let direction: Vec<T> = probe
                .iter()
                .zip(x.iter())
                .map(|(&p, &c)| p - c)
                .collect();
            let line = config.line_search.minimize(
                |t| f.evaluate(&super::offset(&x, &direction, t)),
                Interval::new(T::zero(), config.pattern_bound),
                config.pattern_tolerance,
            )?;
            trace!("iteration {}: pattern move {:?}", iterations, line.x_min);

            x = super::offset(&x, &direction, line.x_min);
            if line.x_min < config.tolerance {
                converged = true;
                break;
            }
        } else {
            let mut reducible = false;
            for step in steps.iter_mut() {
                if *step >= config.tolerance {
                    *step = *step * config.beta;
                    reducible = true;
                }
            }
            if !reducible {
                converged = true;
                break;
            }
        }
    }

    Ok(OptimizationResult {
        optimal_value: f.evaluate(&x),
        optimal_point: x,
        iterations,
        converged,
    })
}

/// Probes each coordinate in both directions, keeping the first improving
/// move per coordinate.
fn exploring_search<T, F>(f: &F, x: &[T], steps: &[T]) -> Vec<T>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    let mut probe = x.to_vec();

    for i in 0..x.len() {
        let current = f.evaluate(&probe);

        probe[i] = x[i] + steps[i];
        if f.evaluate(&probe) < current {
            continue;
        }

        probe[i] = x[i] - steps[i];
        if f.evaluate(&probe) < current {
            continue;
        }

        probe[i] = x[i];
    }

    probe
}
