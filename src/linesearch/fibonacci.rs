use num_traits::Float;
use std::fmt::Debug;

use crate::error::Result;
use crate::linesearch::{Interval, LineSearchResult};

/// Minimizes a one-dimensional function by Fibonacci search.
///
/// Precomputes the shortest Fibonacci sequence whose last term exceeds
/// `width / tolerance` and places the interior points at ratios of
/// consecutive Fibonacci numbers, shrinking the index window by one each
/// iteration. On the final window the two candidate points coincide, so the
/// tie is broken by probing a fixed small perturbation. Terminates when the
/// interval width and the endpoint value gap both drop below `tolerance`,
/// or when the window is exhausted; returns the midpoint.
///
/// # Arguments
///
/// * `f` - The function to minimize, assumed unimodal on `interval`
/// * `interval` - The search interval
/// * `tolerance` - Width and value-gap band at which the search stops
///
/// # Examples
///
/// ```
/// use descent::linesearch::{fibonacci, Interval};
///
/// let result = fibonacci::minimize(|t: f64| (t - 2.0) * (t - 2.0), Interval::new(-10.0, 10.0), 1e-6)
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
    let (a0, b0) = (interval.lower, interval.upper);
    let fib = fibonacci_numbers(interval.width(), tolerance);
    let n = fib.len();

    if n <= 3 {
        // the interval is already within tolerance of the requested band
        return Ok(LineSearchResult {
            x_min: interval.midpoint(),
            iterations: 0,
        });
    }

    let (mut a, mut b) = (a0, b0);
    let mut y = a0 + fib[n - 3] / fib[n - 1] * (b0 - a0);
    let mut z = a0 + fib[n - 2] / fib[n - 1] * (b0 - a0);
    let mut k = 0;

    while b - a > tolerance || (f(b) - f(a)).abs() > tolerance {
        if f(y) <= f(z) {
            b = z;
            z = y;
            y = a + fib[n - k - 3] / fib[n - k - 1] * (b - a);
        } else {
            a = y;
            y = z;
            z = a + fib[n - k - 2] / fib[n - k - 1] * (b - a);
        }

        if k == n - 3 {
            // final window: the interior points coincide, so probe a fixed
            // perturbation to decide which half survives
            y = (a + b) / two;
            z = y + tolerance;
            if f(y) <= f(z) {
                b = z;
            } else {
                a = y;
            }
            break;
        }

        k += 1;
    }

    Ok(LineSearchResult {
        x_min: (a + b) / two,
        iterations: k,
    })
}

/// Fibonacci numbers up to the first term exceeding `width / precision`.
fn fibonacci_numbers<T>(width: T, precision: T) -> Vec<T>
where
    T: Float,
{
    let mut prev = T::one();
    let mut cur = T::one();
    let mut numbers = vec![prev, cur];

    while cur < width / precision {
        let next = prev + cur;
        prev = cur;
        cur = next;
        numbers.push(cur);
    }

    numbers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_quadratic() {
        let result = minimize(|t| (t + 1.0) * (t + 1.0), Interval::new(-4.0, 4.0), 1e-6).unwrap();
        assert!((result.x_min + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wide_interval_coarse_tolerance() {
        let result = minimize(|t| (t - 7.0) * (t - 7.0), Interval::new(0.0, 100.0), 1e-3).unwrap();
        assert!((result.x_min - 7.0).abs() < 1e-2);
    }

    #[test]
    fn test_tiny_interval_returns_midpoint() {
        // width / tolerance below 2 keeps the Fibonacci window empty
        let result = minimize(|t| t * t, Interval::new(1.0, 1.5), 1.0).unwrap();
        assert_eq!(result.x_min, 1.25);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_fibonacci_numbers_cover_requested_ratio() {
        let numbers = fibonacci_numbers(20.0, 1e-3);
        assert!(*numbers.last().unwrap() >= 20_000.0);
        assert_eq!(numbers[0], 1.0);
        assert_eq!(numbers[1], 1.0);
        for window in numbers.windows(3) {
            assert_eq!(window[0] + window[1], window[2]);
        }
    }
}
