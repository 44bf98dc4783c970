use log::debug;
use num_traits::Float;
use std::fmt::Debug;

use crate::constrained::ConstraintSet;
use crate::error::{Error, Result};
use crate::unconstrained::pattern_search::{self, PatternSearchConfig};
use crate::{ObjectiveFunction, OptimizationResult};

/// Penalty transform applied to each constraint value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyKind {
    /// `max(0, g)^2`: exterior penalty, tolerates infeasible iterates.
    External,
    /// `-1/g`: interior barrier, requires strictly feasible iterates.
    InternalHyperbolic,
    /// `-ln(-g)`: interior barrier, requires strictly feasible iterates.
    InternalLog,
    /// Logarithmic inside the feasible region, quadratic outside.
    Combined,
}

impl PenaltyKind {
    /// Applies the transform to a single constraint value.
    fn transform<T>(self, g: T) -> T
    where
        T: Float,
    {
        match self {
            Self::External => g.max(T::zero()).powi(2),
            // the barriers are defined only inside the feasible region;
            // an infeasible sample must never look attractive
            Self::InternalHyperbolic => {
                if g < T::zero() {
                    -(T::one() / g)
                } else {
                    T::infinity()
                }
            }
            Self::InternalLog => {
                if g < T::zero() {
                    -((-g).ln())
                } else {
                    T::infinity()
                }
            }
            Self::Combined => {
                if g <= T::zero() {
                    -((-g).ln())
                } else {
                    g * g
                }
            }
        }
    }

    /// Whether the transform grows the penalty coefficient (exterior) or
    /// shrinks it (interior barriers).
    fn grows_coefficient(self) -> bool {
        matches!(self, Self::External)
    }
}

/// Configuration for the penalty-function methods.
#[derive(Debug, Clone)]
pub struct PenaltyConfig<T>
where
    T: Float + Debug,
{
    /// Initial penalty coefficient.
    pub r0: T,
    /// Factor applied to the coefficient after each round; above one for
    /// the exterior penalty, below one for the interior barriers.
    pub beta: T,
    /// Penalty-magnitude termination tolerance.
    pub tolerance: T,
    /// Cap on the number of penalized sub-problems solved.
    pub max_rounds: usize,
    /// Inner unconstrained solver configuration.
    pub inner: PatternSearchConfig<T>,
}

impl<T> Default for PenaltyConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            r0: T::from(1.0).unwrap(),
            beta: T::from(4.0).unwrap(),
            tolerance: T::from(1e-4).unwrap(),
            max_rounds: 25,
            inner: PatternSearchConfig::default(),
        }
    }
}

impl<T> PenaltyConfig<T>
where
    T: Float + Debug,
{
    /// A configuration suited to the interior barriers: the coefficient
    /// shrinks every round instead of growing.
    pub fn interior() -> Self {
        Self {
            beta: T::from(0.25).unwrap(),
            ..Self::default()
        }
    }

    /// Validates the configuration, failing fast before any round.
    pub fn validate(&self, kind: PenaltyKind) -> Result<()> {
        if self.r0 <= T::zero() {
            return Err(Error::InvalidConfig {
                name: "r0",
                reason: "must be positive",
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

        let grows = self.beta > T::one();
        if kind.grows_coefficient() != grows || self.beta <= T::zero() {
            return Err(Error::InvalidConfig {
                name: "beta",
                reason: "must grow the coefficient for the exterior penalty and shrink it for interior barriers",
            });
        }

        self.inner.validate()
    }
}

/// Minimizes an objective subject to inequality constraints by the
/// penalty-function method.
///
/// Each round minimizes `f + r * P(x)` with the pattern-search inner
/// solver, where `P` sums the selected transform over the constraint
/// values, then rescales `r` by `beta` and stops once `|r * P(x)|` falls
/// below the tolerance. The interior barrier kinds require a strictly
/// feasible starting point; the exterior kind does not. An exhausted
/// round budget is reported through `converged: false`, not as an error.
///
/// # Examples
///
/// ```
/// use descent::constrained::penalty::{self, PenaltyConfig, PenaltyKind};
/// use descent::constrained::{ConstraintFn, ConstraintSet};
/// use descent::ObjectiveFunction;
///
/// struct Sphere;
///
/// impl ObjectiveFunction<f64> for Sphere {
///     fn evaluate(&self, point: &[f64]) -> f64 {
///         point.iter().map(|x| x * x).sum()
///     }
/// }
///
/// // feasible region: x + y >= 2
/// let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| -(x[0] + x[1] - 2.0))];
/// let set = ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![-1.0, -1.0]]));
///
/// let result = penalty::minimize(
///     &Sphere,
///     &set,
///     &[0.0, 0.0],
///     PenaltyKind::External,
///     &PenaltyConfig::default(),
/// )
/// .unwrap();
/// assert!((result.optimal_point[0] - 1.0).abs() < 0.05);
/// assert!((result.optimal_point[1] - 1.0).abs() < 0.05);
/// ```
pub fn minimize<T, F>(
    f: &F,
    constraints: &ConstraintSet<T>,
    initial_point: &[T],
    kind: PenaltyKind,
    config: &PenaltyConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate(kind)?;

    let mut x = initial_point.to_vec();
    let mut r = config.r0;
    let mut rounds = 0;
    let mut converged = false;

    while rounds < config.max_rounds {
        let penalized = PenalizedObjective {
            inner: f,
            constraints,
            kind,
            coefficient: r,
        };
        x = pattern_search::minimize(&penalized, &x, &config.inner)?.optimal_point;
        rounds += 1;

        let penalty = r * total_penalty(constraints, kind, &x);
        debug!("round {}: r = {:?}, penalty = {:?}", rounds, r, penalty);
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

/// Sum of the transformed constraint values at `x`.
fn total_penalty<T>(constraints: &ConstraintSet<T>, kind: PenaltyKind, x: &[T]) -> T
where
    T: Float + Debug,
{
    constraints
        .evaluate(x)
        .iter()
        .fold(T::zero(), |acc, &g| acc + kind.transform(g))
}

struct PenalizedObjective<'a, T, F> {
    inner: &'a F,
    constraints: &'a ConstraintSet<T>,
    kind: PenaltyKind,
    coefficient: T,
}

impl<T, F> ObjectiveFunction<T> for PenalizedObjective<'_, T, F>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    fn evaluate(&self, point: &[T]) -> T {
        self.inner.evaluate(point)
            + self.coefficient * total_penalty(self.constraints, self.kind, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained::ConstraintFn;

    // f(x, y) = x^2 + y^2
    struct Sphere;

    impl ObjectiveFunction<f64> for Sphere {
        fn evaluate(&self, point: &[f64]) -> f64 {
            point.iter().map(|x| x * x).sum()
        }
    }

    // feasible region: x + y >= 2
    fn halfplane() -> ConstraintSet<f64> {
        let constraints: Vec<ConstraintFn<f64>> = vec![Box::new(|x| -(x[0] + x[1] - 2.0))];
        ConstraintSet::new(constraints, Box::new(|_: &[f64]| vec![vec![-1.0, -1.0]]))
    }

    #[test]
    fn test_external_penalty_from_infeasible_start() {
        let result = minimize(
            &Sphere,
            &halfplane(),
            &[0.0, 0.0],
            PenaltyKind::External,
            &PenaltyConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert!((result.optimal_point[0] - 1.0).abs() < 0.05);
        assert!((result.optimal_point[1] - 1.0).abs() < 0.05);
        assert!((result.optimal_value - 2.0).abs() < 0.2);
    }

    #[test]
    fn test_internal_hyperbolic_stays_feasible() {
        let set = halfplane();
        let result = minimize(
            &Sphere,
            &set,
            &[3.0, 3.0],
            PenaltyKind::InternalHyperbolic,
            &PenaltyConfig::interior(),
        )
        .unwrap();

        assert!(result.converged);
        // the barrier keeps the iterate on the feasible side
        assert!(set.satisfied(&[0], &result.optimal_point));
        assert!((result.optimal_point[0] - 1.0).abs() < 0.1);
        assert!((result.optimal_point[1] - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_internal_log_barrier() {
        let set = halfplane();
        let result = minimize(
            &Sphere,
            &set,
            &[3.0, 3.0],
            PenaltyKind::InternalLog,
            &PenaltyConfig::interior(),
        )
        .unwrap();

        assert!(result.converged);
        assert!((result.optimal_point[0] - 1.0).abs() < 0.1);
        assert!((result.optimal_point[1] - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_beta_direction_is_validated() {
        // a shrinking coefficient is rejected for the exterior penalty
        let result = minimize(
            &Sphere,
            &halfplane(),
            &[0.0, 0.0],
            PenaltyKind::External,
            &PenaltyConfig {
                beta: 0.5,
                ..PenaltyConfig::default()
            },
        );
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        // and a growing one for the interior barrier
        let result = minimize(
            &Sphere,
            &halfplane(),
            &[3.0, 3.0],
            PenaltyKind::InternalLog,
            &PenaltyConfig {
                beta: 4.0,
                ..PenaltyConfig::interior()
            },
        );
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_transforms() {
        assert_eq!(PenaltyKind::External.transform(-1.0), 0.0);
        assert_eq!(PenaltyKind::External.transform(2.0), 4.0);
        assert_eq!(PenaltyKind::InternalHyperbolic.transform(-2.0), 0.5);
        assert_eq!(PenaltyKind::InternalLog.transform(-1.0), 0.0);
        assert_eq!(PenaltyKind::Combined.transform(-1.0), 0.0);
        assert_eq!(PenaltyKind::Combined.transform(3.0), 9.0);
    }
}
