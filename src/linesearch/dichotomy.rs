use num_traits::Float;
use std::fmt::Debug;

use crate::error::Result;
use crate::linesearch::{Interval, LineSearchResult};

/// Minimizes a one-dimensional function by repeated interval halving.
///
/// Each iteration compares the function at the interval midpoint with two
/// probes offset by a quarter of the current width, then keeps whichever
/// sub-interval holds the smaller value; when neither probe improves on the
/// midpoint the search narrows to the inner half. Terminates once the
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
/// use descent::linesearch::{dichotomy, Interval};
///
/// let result = dichotomy::minimize(|t: f64| (t - 2.0) * (t - 2.0), Interval::new(-10.0, 10.0), 1e-6)
///     .unwrap();
/// assert!((result.x_min - 2.0).abs() < 1e-5);
/// ```
pub fn minimize<T, F>(f: F, interval: Interval<T>, tolerance: T) -> Result<LineSearchResult<T>>
where
    T: Float + Debug,
    F: Fn(T) -> T,
{
    super::check_inputs(&interval, tolerance)?;

    let two = T::from(2.0).unwrap();
    let four = T::from(4.0).unwrap();
    let (mut a, mut b) = (interval.lower, interval.upper);
    let mut mid = (a + b) / two;
    let mut iterations = 0;

    while b - a > tolerance {
        let l = b - a;
        let y = a + l / four;
        let z = b - l / four;
        let f_mid = f(mid);

        if f(y) < f_mid {
            b = mid;
            mid = y;
        } else if f(z) < f_mid {
            a = mid;
            mid = z;
        } else {
            a = y;
            b = z;
        }

        iterations += 1;
    }

    Ok(LineSearchResult {
        x_min: (a + b) / two,
        iterations,
    })
}
