use thiserror::Error;

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the optimization methods.
///
/// Running out of the configured iteration budget is not an error: solvers
/// report it through [`OptimizationResult::converged`](crate::OptimizationResult)
/// being `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A line search was given an empty search interval.
    #[error("invalid search interval [{lower}, {upper}]: width must be positive")]
    InvalidInterval { lower: f64, upper: f64 },

    /// Bracketing found no unimodal structure around the seed point.
    #[error("no unimodal interval around seed {seed} with initial step {step}")]
    NonUnimodal { seed: f64, step: f64 },

    /// The gradients of the active constraints are linearly dependent, so
    /// the projector's Gram matrix cannot be inverted.
    #[error("singular active set: {active} active constraint gradients in dimension {dimension}")]
    SingularActiveSet { active: usize, dimension: usize },

    /// The objective does not supply the gradient a method requires.
    #[error("objective function does not provide a gradient")]
    MissingGradient,

    /// A configuration value failed validation before iteration started.
    #[error("invalid configuration: {name} {reason}")]
    InvalidConfig {
        name: &'static str,
        reason: &'static str,
    },
}
