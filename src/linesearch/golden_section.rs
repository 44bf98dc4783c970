use num_traits::Float;
use std::fmt::Debug;

use crate::error::Result;
use crate::linesearch::{Interval, LineSearchResult};

/// Minimizes a one-dimensional function by golden-section search.
///
/// Two interior points split the interval at the golden ratio; each
/// iteration discards the sub-interval beyond the worse point and reuses
/// the surviving interior point, so after the first two evaluations every
/// iteration costs a single function evaluation. Terminates once the
/// interval width is no larger than `tolerance` and returns the midpoint.
///
/// # Arguments
///
/// * `f` - The function to minimize, assumed unimodal on `interval`
/// * `interval` - The search interval
/// * `tolerance` - Width at which the search stops
///
/// # Examples
///
/// ```
/// use descent::linesearch::{golden_section, Interval};
///
/// let result =
///     golden_section::minimize(|t: f64| t.sin(), Interval::new(3.0, 6.0), 1e-6).unwrap();
/// assert!((result.x_min - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-5);
/// ```
pub fn minimize<T, F>(f: F, interval: Interval<T>, tolerance: T) -> Result<LineSearchResult<T>>
where
    T: Float + Debug,
    F: Fn(T) -> T,
{
    super::check_inputs(&interval, tolerance)?;

    // minor golden section (3 - sqrt 5) / 2
    let tau = (T::from(3.0).unwrap() - T::from(5.0).unwrap().sqrt()) / T::from(2.0).unwrap();
    let (mut a, mut b) = (interval.lower, interval.upper);
    let mut y = a + tau * (b - a);
    let mut z = a + b - y;
    let mut f_y = f(y);
    let mut f_z = f(z);
    let mut iterations = 0;

    while b - a > tolerance {
        if f_y <= f_z {
            b = z;
            z = y;
            f_z = f_y;
            y = a + tau * (b - a);
            f_y = f(y);
        } else {
            a = y;
            y = z;
            f_y = f_z;
            z = a + b - y;
            f_z = f(z);
        }

        iterations += 1;
    }

    Ok(LineSearchResult {
        x_min: (a + b) / T::from(2.0).unwrap(),
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic() {
        let result = minimize(|t| (t - 2.0) * (t - 2.0), Interval::new(0.0, 4.0), 1e-8).unwrap();
        assert!((result.x_min - 2.0).abs() < 1e-7);
    }

    #[test]
    fn test_cubic_interior_minimum() {
        // f(t) = t^3 - t has its interior minimum at 1/sqrt(3)
        let result = minimize(|t| t * t * t - t, Interval::new(0.0, 2.0), 1e-8).unwrap();
        assert!((result.x_min - 1.0 / 3.0_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_single_evaluation_per_iteration() {
        use std::cell::Cell;

        let evaluations = Cell::new(0usize);
        let result = minimize(
            |t: f64| {
                evaluations.set(evaluations.get() + 1);
                (t - 0.5) * (t - 0.5)
            },
            Interval::new(0.0, 1.0),
            1e-6,
        )
        .unwrap();
        assert_eq!(evaluations.get(), result.iterations + 2);
    }
}
