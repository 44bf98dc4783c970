//! One-dimensional minimization oracles.
//!
//! Every oracle minimizes a scalar function of one real variable over a
//! bounded interval to a caller-supplied tolerance and reports the number
//! of iterations it spent. All of them assume the function is unimodal on
//! the interval and do not verify it; [`svenn::find_unimodal_interval`]
//! discovers such an interval around a seed point when none is known.

pub mod dichotomy;
pub mod fibonacci;
pub mod golden_section;
pub mod svenn;

pub use svenn::{find_unimodal_interval, UnimodalBracket};

use num_traits::{Float, ToPrimitive};
use std::fmt::Debug;

use crate::error::{Error, Result};

/// A closed search interval with ordered endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T> {
    /// Lower endpoint.
    pub lower: T,
    /// Upper endpoint.
    pub upper: T,
}

impl<T> Interval<T>
where
    T: Float + Debug,
{
    /// Creates an interval from two endpoints, in either order.
    pub fn new(a: T, b: T) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    /// Width of the interval.
    pub fn width(&self) -> T {
        self.upper - self.lower
    }

    /// Midpoint of the interval.
    pub fn midpoint(&self) -> T {
        (self.lower + self.upper) / T::from(2.0).unwrap()
    }
}

/// Result of a one-dimensional minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchResult<T> {
    /// Approximate argmin of the searched function.
    pub x_min: T,
    /// Number of iterations performed.
    pub iterations: usize,
}

/// One-dimensional minimization strategy, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearchMethod {
    /// Interval halving driven by quarter-width probes around the midpoint.
    #[default]
    Dichotomy,
    /// Golden-section search, one function evaluation per iteration.
    GoldenSection,
    /// Fibonacci search over a precomputed index window.
    Fibonacci,
}

impl LineSearchMethod {
    /// Minimizes `f` over `interval` to the given tolerance with the
    /// selected strategy.
    pub fn minimize<T, F>(self, f: F, interval: Interval<T>, tolerance: T) -> Result<LineSearchResult<T>>
    where
        T: Float + Debug,
        F: Fn(T) -> T,
    {
        match self {
            Self::Dichotomy => dichotomy::minimize(f, interval, tolerance),
            Self::GoldenSection => golden_section::minimize(f, interval, tolerance),
            Self::Fibonacci => fibonacci::minimize(f, interval, tolerance),
        }
    }
}

fn check_inputs<T>(interval: &Interval<T>, tolerance: T) -> Result<()>
where
    T: Float + Debug,
{
    if tolerance <= T::zero() {
        return Err(Error::InvalidConfig {
            name: "tolerance",
            reason: "must be positive",
        });
    }

    if interval.width() <= T::zero() {
        return Err(Error::InvalidInterval {
            lower: interval.lower.to_f64().unwrap_or(f64::NAN),
            upper: interval.upper.to_f64().unwrap_or(f64::NAN),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_orders_endpoints() {
        let interval = Interval::new(4.0, -2.0);
        assert_eq!(interval.lower, -2.0);
        assert_eq!(interval.upper, 4.0);
        assert_eq!(interval.width(), 6.0);
        assert_eq!(interval.midpoint(), 1.0);
    }

    #[test]
    fn test_every_method_finds_quadratic_minimum() {
        // f(t) = (t - t0)^2 on [-10, 10] for every strategy
        let t0 = 1.7;
        let f = |t: f64| (t - t0) * (t - t0);

        for method in [
            LineSearchMethod::Dichotomy,
            LineSearchMethod::GoldenSection,
            LineSearchMethod::Fibonacci,
        ] {
            let result = method
                .minimize(f, Interval::new(-10.0, 10.0), 1e-6)
                .expect("line search failed");
            assert!(
                (result.x_min - t0).abs() < 1e-5,
                "{:?} returned {}",
                method,
                result.x_min
            );
            assert!(result.iterations > 0);
        }
    }

    #[test]
    fn test_degenerate_interval_is_rejected() {
        for method in [
            LineSearchMethod::Dichotomy,
            LineSearchMethod::GoldenSection,
            LineSearchMethod::Fibonacci,
        ] {
            let result = method.minimize(|t: f64| t * t, Interval::new(3.0, 3.0), 1e-6);
            assert!(matches!(result, Err(Error::InvalidInterval { .. })));
        }
    }

    #[test]
    fn test_nonpositive_tolerance_is_rejected() {
        let result =
            LineSearchMethod::Dichotomy.minimize(|t: f64| t * t, Interval::new(0.0, 1.0), 0.0);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
