use jiff::{SignedDuration, Timestamp};
use rand::{SeedableRng, rngs::SmallRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    problem::{instance::Instance, matrix::DistanceMatrix},
    solver::{
        construction::{ConstructionError, build_initial_solution},
        cost::solution_cost,
        ls::local_search,
        params::GlsParams,
        penalty::PenaltyMatrix,
        solution::Solution,
    },
};

#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("distance matrix is {got}x{got}, expected {expected}x{expected}")]
    MatrixSizeMismatch { got: usize, expected: usize },
}

/// One row per new best, enough to reconstruct a convergence curve
/// downstream.
#[derive(Debug, Clone, Serialize)]
pub struct CostEvolutionRow {
    pub iteration: usize,
    pub cost: f64,
    pub elapsed: SignedDuration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveOutcome {
    pub solution: Solution,
    /// True (unpenalized) cost of `solution`.
    pub cost: f64,
    /// When the best iterate was first seen, relative to the start of the
    /// penalization loop.
    pub time_to_best: SignedDuration,
    pub iteration_to_best: usize,
    pub iterations: usize,
    pub evolution: Vec<CostEvolutionRow>,
}

/// Guided local search over a CVRP instance.
///
/// One run is: build a random feasible solution, descend on the true
/// distances, then repeat until the time budget runs out: penalize the
/// most useful edges of the working solution, re-derive the biased matrix,
/// descend on it, and score the result against the true matrix. The working
/// solution carries forward even when its true cost got worse; that is the
/// diversification that walks the search out of local optima. A final
/// descent on the true matrix strips any leftover penalty bias from the
/// best iterate.
pub struct Gls<'a> {
    instance: &'a Instance,
    matrix: &'a DistanceMatrix,
    params: GlsParams,
}

impl<'a> Gls<'a> {
    pub fn new(
        instance: &'a Instance,
        matrix: &'a DistanceMatrix,
        params: GlsParams,
    ) -> Result<Self, SolveError> {
        let expected = instance.dimension() + 1;
        if matrix.size() != expected {
            return Err(SolveError::MatrixSizeMismatch {
                got: matrix.size(),
                expected,
            });
        }

        Ok(Gls {
            instance,
            matrix,
            params,
        })
    }

    pub fn run(&self) -> Result<SolveOutcome, SolveError> {
        let depot = self.instance.depot();
        let mut rng = match self.params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let mut penalties = PenaltyMatrix::new(self.matrix.size());
        let mut penalized = self.matrix.clone();

        let initial =
            build_initial_solution(self.instance, &mut rng, self.params.max_construction_attempts)?;
        debug_assert_eq!(initial.check_invariants(self.instance), Ok(()));

        // warm descent before any penalty signal exists
        let mut working = local_search(self.instance, &penalized, initial);

        let mut best = working.clone();
        let mut best_cost = solution_cost(&working, self.matrix, depot);
        let mut time_to_best = SignedDuration::ZERO;
        let mut iteration_to_best = 0;
        let mut iterations = 0;
        let mut evolution = vec![CostEvolutionRow {
            iteration: 0,
            cost: best_cost,
            elapsed: SignedDuration::ZERO,
        }];

        info!(cost = best_cost, "warm start complete");

        let start = Timestamp::now();
        while Timestamp::now().duration_since(start) < self.params.time_budget {
            iterations += 1;

            let features = penalties.penalize(&working, &penalized);
            debug!(iteration = iterations, penalized = features.len(), "bumped features");

            penalized =
                penalties.penalized_matrix(self.matrix, self.params.lambda, self.params.alpha);

            working = local_search(self.instance, &penalized, working);
            debug_assert_eq!(working.check_invariants(self.instance), Ok(()));

            let cost = solution_cost(&working, self.matrix, depot);
            if cost < best_cost {
                let elapsed = Timestamp::now().duration_since(start);
                best_cost = cost;
                best = working.clone();
                time_to_best = elapsed;
                iteration_to_best = iterations;
                evolution.push(CostEvolutionRow {
                    iteration: iterations,
                    cost,
                    elapsed,
                });

                info!(iteration = iterations, cost, "new best solution");
            }
        }

        // one unbiased descent over the best iterate
        let solution = local_search(self.instance, self.matrix, best);
        debug_assert_eq!(solution.check_invariants(self.instance), Ok(()));
        let cost = solution_cost(&solution, self.matrix, depot);

        info!(cost, iterations, "search finished");

        Ok(SolveOutcome {
            solution,
            cost,
            time_to_best,
            iteration_to_best,
            iterations,
            evolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::test_utils;

    fn quick_params(seed: u64) -> GlsParams {
        GlsParams {
            time_budget: SignedDuration::from_millis(50),
            seed: Some(seed),
            ..GlsParams::default()
        }
    }

    #[test]
    fn test_solves_the_two_vehicle_scenario() {
        let matrix = test_utils::matrix_from_coords(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (0.0, 1.0),
            (0.0, 2.0),
        ]);
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);

        let outcome = Gls::new(&instance, &matrix, quick_params(3))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.solution.check_invariants(&instance), Ok(()));
        assert!(outcome.cost.is_finite());
        // two customers per vehicle is forced by the demands
        assert!(outcome.solution.routes().iter().all(|r| r.len() == 2));
        // clustering each axis into one route is the optimum here
        assert_eq!(outcome.cost, 8.0);
    }

    #[test]
    fn test_outcome_is_consistent() {
        let (instance, matrix) = test_utils::random_test_problem(15, 4, 30, 11);

        let outcome = Gls::new(&instance, &matrix, quick_params(11))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.solution.check_invariants(&instance), Ok(()));
        assert_eq!(
            outcome.cost,
            solution_cost(&outcome.solution, &matrix, instance.depot())
        );
        assert!(outcome.iteration_to_best <= outcome.iterations);

        // recorded bests are strictly decreasing along the run
        for window in outcome.evolution.windows(2) {
            assert!(window[1].cost < window[0].cost);
            assert!(window[1].iteration > window[0].iteration);
        }
        // the polishing descent can only improve on the last recorded best
        assert!(outcome.cost <= outcome.evolution.last().unwrap().cost);
    }

    #[test]
    fn test_matrix_size_is_checked() {
        let matrix = test_utils::matrix_from_coords(vec![(0.0, 0.0), (1.0, 0.0)]);
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);

        assert!(matches!(
            Gls::new(&instance, &matrix, GlsParams::default()),
            Err(SolveError::MatrixSizeMismatch {
                got: 3,
                expected: 6
            })
        ));
    }

    #[test]
    fn test_infeasible_construction_aborts_the_run() {
        let matrix = test_utils::matrix_from_coords(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
        ]);
        // three demand-3 customers cannot fit two capacity-4 vehicles
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3], 4, 2);

        let result = Gls::new(&instance, &matrix, quick_params(1)).unwrap().run();

        assert!(matches!(
            result,
            Err(SolveError::Construction(ConstructionError::Infeasible { .. }))
        ));
    }
}
