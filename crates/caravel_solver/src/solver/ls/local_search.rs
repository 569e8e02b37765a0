use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

use crate::{
    problem::{
        instance::{Demand, Instance, NodeId},
        matrix::DistanceMatrix,
    },
    solver::{
        cost,
        ls::{
            cross::CrossOperator,
            exchange::ExchangeOperator,
            r#move::{LocalSearchMove, LocalSearchOperator},
            relocate::RelocateOperator,
            two_opt::TwoOptOperator,
        },
        solution::{RouteIdx, Solution},
    },
};

/// Deltas this close to zero are treated as "no improvement" so float noise
/// cannot keep the descent spinning.
const MIN_IMPROVEMENT: f64 = 1e-6;

type RoutePair = (RouteIdx, RouteIdx);

/// Immutable snapshot a pass evaluates against: the instance, the matrix in
/// play (true or penalized) and the per-route loads of the current solution.
pub struct SearchContext<'a> {
    instance: &'a Instance,
    matrix: &'a DistanceMatrix,
    loads: Vec<Demand>,
}

impl<'a> SearchContext<'a> {
    pub fn new(instance: &'a Instance, matrix: &'a DistanceMatrix, solution: &Solution) -> Self {
        let loads = solution
            .routes()
            .iter()
            .map(|route| cost::route_demand(route, instance))
            .collect();

        SearchContext {
            instance,
            matrix,
            loads,
        }
    }

    pub fn instance(&self) -> &Instance {
        self.instance
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeId, to: NodeId) -> f64 {
        self.matrix.distance(from, to)
    }

    #[inline(always)]
    pub fn demand(&self, customer: NodeId) -> Demand {
        self.instance.demand(customer)
    }

    pub fn depot(&self) -> NodeId {
        self.instance.depot()
    }

    pub fn capacity(&self) -> Demand {
        self.instance.capacity()
    }

    pub fn load(&self, route: RouteIdx) -> Demand {
        self.loads[route.get()]
    }
}

/// Position of a candidate in the canonical enumeration: operators in the
/// order two-opt, relocate, exchange, cross, then route pair, then discovery
/// sequence within the pair. Equal-delta candidates resolve to the lowest
/// rank, so the outcome matches a sequential scan no matter how the pass was
/// parallelized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MoveRank {
    operator: u8,
    first: usize,
    second: usize,
    seq: usize,
}

struct Candidate {
    delta: f64,
    rank: MoveRank,
    op: LocalSearchMove,
}

/// Best-improvement descent under the four neighborhood operators. Every
/// pass prices every candidate move over every route pair, applies the
/// single best strictly improving one, and repeats; a pass without an
/// improving move means the solution is locally optimal and is returned
/// as-is.
///
/// Candidate evaluation inside a pass is a rayon fork-join over route pairs
/// reading one shared snapshot; the apply step is a single-writer commit
/// after every evaluator has returned.
pub fn local_search(instance: &Instance, matrix: &DistanceMatrix, mut solution: Solution) -> Solution {
    let pairs = build_pairs(solution.routes().len());
    let mut passes = 0usize;

    loop {
        passes += 1;
        let ctx = SearchContext::new(instance, matrix, &solution);

        let Some(best) = best_move(&ctx, &solution, &pairs) else {
            break;
        };

        if best.delta >= -MIN_IMPROVEMENT {
            break;
        }

        debug!(
            pass = passes,
            operator = best.op.operator_name(),
            delta = best.delta,
            "applying move"
        );

        best.op.apply(&mut solution);
    }

    debug!(passes, "local optimum reached");

    solution
}

fn build_pairs(route_count: usize) -> Vec<RoutePair> {
    let mut pairs = Vec::with_capacity(route_count * route_count);

    for first in 0..route_count {
        for second in 0..route_count {
            pairs.push((RouteIdx::new(first), RouteIdx::new(second)));
        }
    }

    pairs
}

fn best_move(ctx: &SearchContext, solution: &Solution, pairs: &[RoutePair]) -> Option<Candidate> {
    pairs
        .par_iter()
        .map(|&pair| best_move_for_pair(ctx, solution, pair))
        .reduce(|| None, merge)
}

fn merge(left: Option<Candidate>, right: Option<Candidate>) -> Option<Candidate> {
    match (left, right) {
        (Some(left), Some(right)) => {
            if beats(&right, &left) {
                Some(right)
            } else {
                Some(left)
            }
        }
        (left, None) => left,
        (None, right) => right,
    }
}

fn beats(challenger: &Candidate, incumbent: &Candidate) -> bool {
    challenger.delta < incumbent.delta
        || (challenger.delta == incumbent.delta && challenger.rank < incumbent.rank)
}

/// Strictly improving and strictly better than the pair's best so far; an
/// equal-delta candidate loses to the one discovered first.
fn improves(best: &Option<Candidate>, delta: f64) -> bool {
    delta < 0.0 && best.as_ref().is_none_or(|b| delta < b.delta)
}

fn best_move_for_pair(
    ctx: &SearchContext,
    solution: &Solution,
    (r1, r2): RoutePair,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut seq = 0usize;

    let rank = |operator: u8, seq: usize| MoveRank {
        operator,
        first: r1.get(),
        second: r2.get(),
        seq,
    };

    TwoOptOperator::generate_moves(ctx, solution, (r1, r2), |op| {
        seq += 1;
        let delta = op.delta(ctx, solution);
        if improves(&best, delta) && op.is_valid(ctx, solution) {
            best = Some(Candidate {
                delta,
                rank: rank(0, seq),
                op: LocalSearchMove::TwoOpt(op),
            });
        }
    });

    RelocateOperator::generate_moves(ctx, solution, (r1, r2), |op| {
        seq += 1;
        let delta = op.delta(ctx, solution);
        if improves(&best, delta) && op.is_valid(ctx, solution) {
            best = Some(Candidate {
                delta,
                rank: rank(1, seq),
                op: LocalSearchMove::Relocate(op),
            });
        }
    });

    ExchangeOperator::generate_moves(ctx, solution, (r1, r2), |op| {
        seq += 1;
        let delta = op.delta(ctx, solution);
        if improves(&best, delta) && op.is_valid(ctx, solution) {
            best = Some(Candidate {
                delta,
                rank: rank(2, seq),
                op: LocalSearchMove::Exchange(op),
            });
        }
    });

    CrossOperator::generate_moves(ctx, solution, (r1, r2), |op| {
        seq += 1;
        let delta = op.delta(ctx, solution);
        if improves(&best, delta) && op.is_valid(ctx, solution) {
            best = Some(Candidate {
                delta,
                rank: rank(3, seq),
                op: LocalSearchMove::Cross(op),
            });
        }
    });

    best
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::{
        solver::{construction::build_initial_solution, cost::solution_cost},
        test_utils,
    };

    #[test]
    fn test_descent_never_increases_cost() {
        let (instance, matrix) = test_utils::random_test_problem(12, 3, 30, 42);
        let mut rng = SmallRng::seed_from_u64(42);
        let initial = build_initial_solution(&instance, &mut rng, 1000).unwrap();

        let initial_cost = solution_cost(&initial, &matrix, instance.depot());
        let optimized = local_search(&instance, &matrix, initial.clone());
        let optimized_cost = solution_cost(&optimized, &matrix, instance.depot());

        assert!(optimized_cost <= initial_cost);
        assert_eq!(optimized.check_invariants(&instance), Ok(()));
    }

    #[test]
    fn test_local_optimum_is_a_fixed_point() {
        let (instance, matrix) = test_utils::random_test_problem(10, 3, 20, 7);
        let mut rng = SmallRng::seed_from_u64(7);
        let initial = build_initial_solution(&instance, &mut rng, 1000).unwrap();

        let first = local_search(&instance, &matrix, initial);
        let second = local_search(&instance, &matrix, first.clone());

        assert_eq!(first, second);
    }

    #[test]
    fn test_straightens_a_single_route() {
        // customers on a line with the middle pair visited backwards; one
        // reversal yields the outward sweep
        let matrix = test_utils::matrix_from_coords(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (4.0, 0.0),
        ]);
        let instance = test_utils::create_test_instance(vec![0, 1, 1, 1, 1], 10, 1);
        let solution = test_utils::solution_from_routes(vec![vec![2, 4, 3, 5]]);

        let optimized = local_search(&instance, &matrix, solution);

        let cost = solution_cost(&optimized, &matrix, 1);
        assert_eq!(cost, 8.0);
    }

    #[test]
    fn test_moves_customer_to_its_natural_route() {
        // customer 5 sits among route 1's cluster but starts in route 2
        let matrix = test_utils::matrix_from_coords(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (11.0, 0.0),
            (0.0, 10.0),
            (12.0, 0.0),
        ]);
        let instance = test_utils::create_test_instance(vec![0, 1, 1, 1, 1], 3, 2);
        let solution = test_utils::solution_from_routes(vec![vec![2, 3], vec![4, 5]]);

        let optimized = local_search(&instance, &matrix, solution);

        assert_eq!(optimized.check_invariants(&instance), Ok(()));
        let route_of_5 = optimized
            .routes()
            .iter()
            .position(|route| route.contains(&5))
            .unwrap();
        let route_of_2 = optimized
            .routes()
            .iter()
            .position(|route| route.contains(&2))
            .unwrap();
        assert_eq!(route_of_5, route_of_2);
    }

    #[test]
    fn test_empty_neighborhood_returns_input_unchanged() {
        // one customer on each side of the depot; merging them helps nothing
        let matrix = test_utils::matrix_from_coords(vec![(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0)]);
        let instance = test_utils::create_test_instance(vec![0, 1, 1], 10, 2);
        let solution = test_utils::solution_from_routes(vec![vec![2], vec![3]]);

        let optimized = local_search(&instance, &matrix, solution.clone());

        assert_eq!(optimized, solution);
    }
}
