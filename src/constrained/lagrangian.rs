use log::debug;
use num_traits::Float;
use std::fmt::Debug;

use crate::constrained::ConstraintSet;
use crate::error::{Error, Result};
use crate::unconstrained::pattern_search::{self, PatternSearchConfig};
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for the modified Lagrangian method.
#[derive(Debug, Clone)]
pub struct LagrangianConfig<T>
where
    T: Float + Debug,
{
    /// Initial penalty coefficient.
    pub r0: T,
    /// Growth factor of the penalty coefficient per round.
    pub beta: T,
    /// Penalty-magnitude termination tolerance.
    pub tolerance: T,
    /// Cap on the number of augmented sub-problems solved.
    pub max_rounds: usize,
    /// Inner unconstrained solver configuration.
    pub inner: PatternSearchConfig<T>,
}

impl<T> Default for LagrangianConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            r0: T::from(1.0).unwrap(),
            beta: T::from(2.0).unwrap(),
            tolerance: T::from(1e-4).unwrap(),
            max_rounds: 30,
            inner: PatternSearchConfig::default(),
        }
    }
}

impl<T> LagrangianConfig<T>
where
    T: Float + Debug,
{
    /// Validates the configuration, failing fast before any round.
    pub fn validate(&self) -> Result<()> {
        if self.r0 <= T::zero() {
            return Err(Error::InvalidConfig {
                name: "r0",
                reason: "must be positive",
            });
        }
        if self.beta <= T::one() {
            return Err(Error::InvalidConfig {
                name: "beta",
                reason: "must exceed one",
            });
        }
        if self.tolerance <= T::zero() {
            return Err(Error::InvalidConfig {
                name: "tolerance",
                reason: "must be positive",
            });
        }
        if self.max_rounds == 0 {
            return Err(Error::InvalidConfig {
                name: "max_rounds",
                reason: "must be positive",
            });
        }

        self.inner.validate()
    }
}

/// Minimizes an objective subject to inequality constraints with the
/// modified (augmented) Lagrangian method.
///
/// Each round minimizes the augmented Lagrangian
/// `f(x) + (1/2r) * sum_i (max(0, mu_i + r g_i(x))^2 - mu_i^2)`
/// with the pattern-search inner solver, then updates the multiplier
/// estimates `mu_i <- max(0, mu_i + r g_i(x))`, grows `r` by `beta` and
/// stops once the augmentation term falls below the tolerance. Unlike the
/// interior penalty barriers it tolerates infeasible iterates. An
/// exhausted round budget is reported through `converged: false`, not as
/// an error.
pub fn minimize<T, F>(
    f: &F,
    constraints: &ConstraintSet<T>,
    initial_point: &[T],
    config: &LagrangianConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate()?;

    let mut x = initial_point.to_vec();
    let mut mu = vec![T::zero(); constraints.len()];
    let mut r = config.r0;
    let mut rounds = 0;
    let mut converged = false;

    while rounds < config.max_rounds {
        let augmented = AugmentedObjective {
            inner: f,
            constraints,
            mu: &mu,
            coefficient: r,
        };
        x = pattern_search::minimize(&augmented, &x, &config.inner)?.optimal_point;
        rounds += 1;

        let penalty = augmentation(constraints, &mu, r, &x);
        debug!("round {}: r = {:?}, mu = {:?}, penalty = {:?}", rounds, r, mu, penalty);

        for (m, &g) in mu.iter_mut().zip(constraints.evaluate(&x).iter()) {
            *m = (*m + r * g).max(T::zero());
        }
        r = r * config.beta;

        if penalty.abs() <= config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(OptimizationResult {
        optimal_value: f.evaluate(&x),
        optimal_point: x,
        iterations: rounds,
        converged,
    })
}

/// The augmentation term `(1/2r) * sum_i (max(0, mu_i + r g_i)^2 - mu_i^2)`.
fn augmentation<T>(constraints: &ConstraintSet<T>, mu: &[T], r: T, x: &[T]) -> T
where
    T: Float + Debug,
{
    let two = T::from(2.0).unwrap();
    let sum = constraints
        .evaluate(x)
        .iter()
        .zip(mu.iter())
        .fold(T::zero(), |acc, (&g, &m)| {
            let shifted = (m + r * g).max(T::zero());
            acc + shifted * shifted - m * m
        });
    sum / (two * r)
}

struct AugmentedObjective<'a, T, F> {
    inner: &'a F,
    constraints: &'a ConstraintSet<T>,
    mu: &'a [T],
    coefficient: T,
}

impl<T, F> ObjectiveFunction<T> for AugmentedObjective<'_, T, F>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    fn evaluate(&self, point: &[T]) -> T {
        self.inner.evaluate(point)
            + augmentation(self.constraints, self.mu, self.coefficient, point)
    }
}
