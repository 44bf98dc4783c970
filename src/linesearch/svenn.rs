use num_traits::{Float, ToPrimitive};
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::linesearch::Interval;

/// Step doublings attempted before the probe is declared non-unimodal.
const MAX_DOUBLINGS: usize = 64;

/// A unimodal bracket located by the Svenn expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnimodalBracket<T> {
    /// Interval containing a local minimum of the probed function.
    pub interval: Interval<T>,
    /// Number of expansion steps taken.
    pub iterations: usize,
}

/// Locates an interval around `seed` containing a local minimum of `f`.
///
/// Probes the two neighbors `seed - step` and `seed + step`. A seed already
/// below both neighbors brackets immediately. Otherwise the search walks in
/// the descending direction, doubling the stride until the function value
/// stops improving, and returns the interval between the second-to-last
/// improving sample and the first non-improving one.
///
/// # Errors
///
/// Returns [`Error::NonUnimodal`] when the seed sits on a local crest
/// (neither direction ascends, so no single valley can be bracketed) or
/// when the expansion budget runs out without the function value ever
/// rising, as happens on a function that is monotonic over the probed
/// range. Returns [`Error::InvalidConfig`] when `step` is not positive.
///
/// # Examples
///
/// ```
/// use descent::linesearch::find_unimodal_interval;
///
/// let bracket = find_unimodal_interval(|t| (t - 10.0) * (t - 10.0), 0.0, 1.0).unwrap();
/// assert!(bracket.interval.lower <= 10.0 && 10.0 <= bracket.interval.upper);
///
/// // a strictly monotonic probe has no interior minimum to bracket
/// assert!(find_unimodal_interval(|t| t, 0.0, 1.0).is_err());
/// ```
pub fn find_unimodal_interval<T, F>(f: F, seed: T, step: T) -> Result<UnimodalBracket<T>>
where
    T: Float + Debug,
    F: Fn(T) -> T,
{
    if step <= T::zero() {
        return Err(Error::InvalidConfig {
            name: "step",
            reason: "must be positive",
        });
    }

    let f_left = f(seed - step);
    let f_seed = f(seed);
    let f_right = f(seed + step);

    if f_left >= f_seed && f_seed <= f_right {
        // the seed already sits below both neighbors
        return Ok(UnimodalBracket {
            interval: Interval::new(seed - step, seed + step),
            iterations: 0,
        });
    }

    if f_left <= f_seed && f_seed >= f_right {
        // both directions descend; there is no single valley to bracket
        return Err(non_unimodal(seed, step));
    }

    // walk downhill, doubling the stride
    let mut delta = if f_right < f_seed { step } else { -step };
    let mut behind = seed;
    let mut front = seed + delta;
    let mut f_front = if f_right < f_seed { f_right } else { f_left };

    for k in 1..=MAX_DOUBLINGS {
        delta = delta + delta;
        let probe = front + delta;
        let f_probe = f(probe);

        if f_probe >= f_front {
            return Ok(UnimodalBracket {
                interval: Interval::new(behind, probe),
                iterations: k,
            });
        }

        behind = front;
        front = probe;
        f_front = f_probe;
    }

    Err(non_unimodal(seed, step))
}

fn non_unimodal<T>(seed: T, step: T) -> Error
where
    T: Float,
{
    Error::NonUnimodal {
        seed: seed.to_f64().unwrap_or(f64::NAN),
        step: step.to_f64().unwrap_or(f64::NAN),
    }
}
