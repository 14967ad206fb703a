//! Annealing execution loop.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};
use u_numflow::random::create_rng;

use super::config::AnnealConfig;
use super::types::AnnealProblem;
use crate::error::Result;

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult<S: Clone> {
    /// The best solution found.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// Cost of the starting solution.
    pub initial_cost: f64,

    /// Total number of iterations (one move proposal each).
    pub iterations: usize,

    /// Final temperature when the loop stopped.
    pub final_temperature: f64,

    /// Number of accepted candidates (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving candidates.
    pub improving_moves: usize,

    /// Number of proposals the problem rejected as illegal. These are never
    /// counted in `accepted_moves`.
    pub rejected_moves: usize,

    /// Best cost sampled every `history_interval` iterations.
    pub cost_history: Vec<f64>,
}

/// Executes simulated annealing from a given starting solution.
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs annealing with an RNG seeded from `config.seed` (random if unset).
    pub fn run<P: AnnealProblem>(
        problem: &P,
        initial: P::Solution,
        config: &AnnealConfig,
    ) -> Result<AnnealResult<P::Solution>> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::run_with_rng(problem, initial, config, &mut rng)
    }

    /// Runs annealing with a caller-supplied RNG.
    ///
    /// Each iteration clones the current solution, perturbs the clone, and
    /// accepts it if it is strictly better or with Metropolis probability
    /// `exp((current - candidate) / T)`. A perturbation the problem rejects
    /// skips the acceptance test and only counts toward `rejected_moves`.
    /// The temperature is multiplied by `cooling_rate` after every
    /// iteration, accepted or not.
    pub fn run_with_rng<P: AnnealProblem, R: Rng>(
        problem: &P,
        initial: P::Solution,
        config: &AnnealConfig,
        rng: &mut R,
    ) -> Result<AnnealResult<P::Solution>> {
        config.validate()?;
        let started = Instant::now();

        let mut current = initial;
        let mut current_cost = problem.cost(&current);
        let initial_cost = current_cost;
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut temperature = config.initial_temperature;
        let mut total_iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut rejected_moves = 0usize;

        let mut cost_history = vec![best_cost];

        info!(
            initial_cost,
            scheduled = config.scheduled_iterations(),
            "annealing started"
        );

        while temperature > config.min_temperature {
            if config.max_iterations > 0 && total_iterations >= config.max_iterations {
                break;
            }

            let mut candidate = current.clone();
            if problem.perturb(&mut candidate, rng) {
                let candidate_cost = problem.cost(&candidate);
                let delta = candidate_cost - current_cost;

                // Metropolis acceptance criterion
                let accept = if delta < 0.0 {
                    improving_moves += 1;
                    true
                } else {
                    let probability = (-delta / temperature).exp();
                    rng.random_range(0.0..1.0) < probability
                };

                if accept {
                    current = candidate;
                    current_cost = candidate_cost;
                    accepted_moves += 1;

                    if current_cost < best_cost {
                        best = current.clone();
                        best_cost = current_cost;
                        debug!(iteration = total_iterations, best_cost, temperature, "new best");
                    }
                }
            } else {
                rejected_moves += 1;
            }

            total_iterations += 1;
            if config.history_interval > 0 && total_iterations % config.history_interval == 0 {
                cost_history.push(best_cost);
            }

            temperature *= config.cooling_rate;
        }

        if cost_history
            .last()
            .is_none_or(|&last| (last - best_cost).abs() > 1e-15)
        {
            cost_history.push(best_cost);
        }

        info!(
            iterations = total_iterations,
            best_cost,
            accepted_moves,
            rejected_moves,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "annealing finished"
        );

        Ok(AnnealResult {
            best,
            best_cost,
            initial_cost,
            iterations: total_iterations,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            rejected_moves,
            cost_history,
        })
    }
}
