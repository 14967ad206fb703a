//! Core trait for the annealing loop.

use rand::Rng;

/// A problem the annealer can drive.
///
/// The implementor supplies cost evaluation and an in-place perturbation.
/// The runner owns temperature management, the Metropolis acceptance test
/// and best-so-far tracking.
///
/// # Minimization
///
/// The annealer minimizes the cost. For maximization, negate the cost.
pub trait AnnealProblem {
    /// The solution representation type.
    type Solution: Clone;

    /// Computes the cost of a solution. Lower is better.
    fn cost(&self, solution: &Self::Solution) -> f64;

    /// Applies one random move to `solution` in place.
    ///
    /// Returns `false` when the proposed move was rejected and `solution`
    /// is unchanged.
    fn perturb<R: Rng>(&self, solution: &mut Self::Solution, rng: &mut R) -> bool;
}
