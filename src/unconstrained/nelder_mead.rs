use num_traits::Float;
use std::fmt::Debug;

use crate::error::Result;
use crate::{ObjectiveFunction, OptimizationResult};

/// Configuration for the Nelder-Mead simplex method.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig<T>
where
    T: Float + Debug,
{
    /// Reflection coefficient.
    pub alpha: T,
    /// Expansion coefficient.
    pub gamma: T,
    /// Contraction coefficient.
    pub beta: T,
    /// Shrink coefficient.
    pub mu: T,
    /// Edge length of the initial regular simplex.
    pub edge: T,
    /// Maximum-edge-length termination tolerance.
    pub sigma: T,
    /// Value-spread termination tolerance.
    pub eps: T,
    /// Hard iteration cap.
    pub max_iterations: usize,
}

impl<T> Default for NelderMeadConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            alpha: T::from(1.0).unwrap(),
            gamma: T::from(2.0).unwrap(),
            beta: T::from(0.5).unwrap(),
            mu: T::from(0.5).unwrap(),
            edge: T::from(1.0).unwrap(),
            sigma: T::from(1e-6).unwrap(),
            eps: T::from(1e-9).unwrap(),
            max_iterations: 1000,
        }
    }
}

impl<T> NelderMeadConfig<T>
where
    T: Float + Debug,
{
    /// Validates the configuration, failing fast before any iteration.
    pub fn validate(&self) -> Result<()> {
        super::require_positive(self.alpha, "alpha")?;
        super::require_positive(self.gamma, "gamma")?;
        super::require_positive(self.beta, "beta")?;
        super::require_positive(self.mu, "mu")?;
        super::require_positive(self.edge, "edge")?;
        super::require_positive(self.sigma, "sigma")?;
        super::require_positive(self.eps, "eps")?;
        super::require_iterations(self.max_iterations)
    }
}

/// Minimizes an objective function with the Nelder-Mead simplex method.
///
/// Builds a regular simplex of `n + 1` vertices around the starting point
/// and iterates reflection, expansion, contraction and shrink steps on
/// the worst vertex. Derivative-free. Terminates when the longest simplex
/// edge falls below `sigma`, when the spread of vertex values around the
/// best one falls below `eps`, or when the iteration budget runs out
/// (reported through `converged: false`, not as an error).
pub fn minimize<T, F>(
    f: &F,
    initial_point: &[T],
    config: &NelderMeadConfig<T>,
) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
    F: ObjectiveFunction<T>,
{
    config.validate()?;

    let n = initial_point.len();
    let mut simplex = regular_simplex(initial_point, config.edge);
    let mut values: Vec<T> = simplex.iter().map(|p| f.evaluate(p)).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        let (best, second_worst, worst) = order(&values);

        if max_edge_length(&simplex) <= config.sigma
            || value_spread(&values, best) <= config.eps
        {
            converged = true;
            break;
        }

        let centroid = centroid_excluding(&simplex, worst);
        let reflected = blend(&centroid, &simplex[worst], -config.alpha);
        let f_reflected = f.evaluate(&reflected);

        if f_reflected < values[best] {
            // promising direction, try to expand past the reflection
            let expanded = blend(&centroid, &reflected, config.gamma);
            let f_expanded = f.evaluate(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
        } else if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
        } else {
            // contract toward the better of the reflection and the worst
            // vertex; shrink the whole simplex when even that fails
            let (anchor, f_anchor) = if f_reflected < values[worst] {
                (&reflected, f_reflected)
            } else {
                (&simplex[worst], values[worst])
            };
            let contracted = blend(&centroid, anchor, config.beta);
            let f_contracted = f.evaluate(&contracted);

            if f_contracted < f_anchor {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
            } else {
                let anchor = simplex[best].clone();
                for i in 0..n + 1 {
                    if i != best {
                        simplex[i] = blend(&anchor, &simplex[i], config.mu);
                        values[i] = f.evaluate(&simplex[i]);
                    }
                }
            }
        }

        iterations += 1;
    }

    let (best, _, _) = order(&values);
    Ok(OptimizationResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    })
}

/// Indices of the best, second-worst and worst vertices.
fn order<T>(values: &[T]) -> (usize, usize, usize)
where
    T: Float,
{
    let mut best = 0;
    let mut worst = 0;
    for (i, &value) in values.iter().enumerate() {
        if value < values[best] {
            best = i;
        }
        if value > values[worst] {
            worst = i;
        }
    }

    let mut second_worst = best;
    for (i, &value) in values.iter().enumerate() {
        if i != worst && value > values[second_worst] {
            second_worst = i;
        }
    }

    (best, second_worst, worst)
}

/// A regular simplex of edge length `edge` with one vertex at `x0`.
fn regular_simplex<T>(x0: &[T], edge: T) -> Vec<Vec<T>>
where
    T: Float,
{
    let n = x0.len();
    let dim = T::from(n).unwrap();
    let sqrt2 = T::from(2.0).unwrap().sqrt();
    let root = (dim + T::one()).sqrt();
    let l1 = edge / (dim * sqrt2) * (root + dim - T::one());
    let l2 = edge / (dim * sqrt2) * (root - T::one());

    let mut vertices = vec![x0.to_vec()];
    for i in 0..n {
        let mut vertex: Vec<T> = x0.iter().map(|&c| c + l2).collect();
        vertex[i] = x0[i] + l1;
        vertices.push(vertex);
    }

    vertices
}

/// Centroid of every vertex except `skip`.
fn centroid_excluding<T>(simplex: &[Vec<T>], skip: usize) -> Vec<T>
where
    T: Float,
{
    let n = simplex[0].len();
    let count = T::from(simplex.len() - 1).unwrap();
    let mut centroid = vec![T::zero(); n];

    for (i, vertex) in simplex.iter().enumerate() {
        if i != skip {
            for (c, &v) in centroid.iter_mut().zip(vertex.iter()) {
                *c = *c + v;
            }
        }
    }

    centroid.into_iter().map(|c| c / count).collect()
}

/// The point `base + weight * (target - base)`.
fn blend<T>(base: &[T], target: &[T], weight: T) -> Vec<T>
where
    T: Float,
{
    base.iter()
        .zip(target.iter())
        .map(|(&b, &t)| b + weight * (t - b))
        .collect()
}

fn max_edge_length<T>(simplex: &[Vec<T>]) -> T
where
    T: Float,
{
    let mut longest = T::zero();
    for i in 0..simplex.len() {
        for j in (i + 1)..simplex.len() {
            longest = longest.max(super::distance(&simplex[i], &simplex[j]));
        }
    }
    longest
}

/// Root-mean-square spread of the vertex values around the best one.
fn value_spread<T>(values: &[T], best: usize) -> T
where
    T: Float,
{
    let count = T::from(values.len()).unwrap();
    let spread = values
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != best)
        .fold(T::zero(), |acc, (_, &v)| {
            acc + (v - values[best]) * (v - values[best])
        });
    (spread / count).sqrt()
}
