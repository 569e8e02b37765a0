use crate::solver::{
    ls::{SearchContext, r#move::LocalSearchOperator},
    solution::{RouteIdx, Solution},
};

/// **Inter-route relocate**
///
/// Pops one customer out of its route and pushes it onto the *front* of
/// another route.
///
/// ```text
/// BEFORE:
///    FROM: ... (prev) --x--> [c] --x--> (next) ...
///    TO:   depot --x--> (first) ...
///
/// AFTER:
///    FROM: ... (prev) -----> (next) ...
///    TO:   depot -----> [c] -----> (first) ...
/// ```
#[derive(Debug)]
pub struct RelocateOperator {
    params: RelocateParams,
}

#[derive(Debug)]
pub struct RelocateParams {
    pub from_route: RouteIdx,
    pub from_index: usize,
    pub to_route: RouteIdx,
}

impl RelocateOperator {
    pub fn new(params: RelocateParams) -> Self {
        if params.from_route == params.to_route {
            panic!("Relocate: source and destination route must differ")
        }

        RelocateOperator { params }
    }

    fn customer(&self, solution: &Solution) -> usize {
        solution.route(self.params.from_route)[self.params.from_index]
    }
}

impl LocalSearchOperator for RelocateOperator {
    fn generate_moves<C>(
        _ctx: &SearchContext,
        solution: &Solution,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        for from_index in 0..solution.route(r1).len() {
            consumer(RelocateOperator::new(RelocateParams {
                from_route: r1,
                from_index,
                to_route: r2,
            }))
        }
    }

    fn delta(&self, ctx: &SearchContext, solution: &Solution) -> f64 {
        let from = solution.route(self.params.from_route);
        let to = solution.route(self.params.to_route);
        let depot = ctx.depot();
        let customer = self.customer(solution);

        let prev = if self.params.from_index == 0 {
            depot
        } else {
            from[self.params.from_index - 1]
        };
        let next = if self.params.from_index + 1 == from.len() {
            depot
        } else {
            from[self.params.from_index + 1]
        };

        let removal =
            ctx.distance(prev, next) - ctx.distance(prev, customer) - ctx.distance(customer, next);

        let insertion = match to.first() {
            Some(&first) => {
                ctx.distance(depot, customer) + ctx.distance(customer, first)
                    - ctx.distance(depot, first)
            }
            None => ctx.distance(depot, customer) + ctx.distance(customer, depot),
        };

        removal + insertion
    }

    fn is_valid(&self, ctx: &SearchContext, solution: &Solution) -> bool {
        let demand = ctx.demand(self.customer(solution));

        ctx.load(self.params.to_route) + demand <= ctx.capacity()
    }

    fn apply(&self, solution: &mut Solution) {
        let customer = solution
            .route_mut(self.params.from_route)
            .remove(self.params.from_index);
        solution.route_mut(self.params.to_route).insert(0, customer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        solver::cost::solution_cost,
        test_utils::{self, collect_moves},
    };

    #[test]
    fn test_relocate_moves_to_front() {
        let matrix = test_utils::matrix_from_coords(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (0.0, 3.0),
        ]);
        let instance = test_utils::create_test_instance(vec![0, 1, 1, 1], 10, 2);
        let mut solution = test_utils::solution_from_routes(vec![vec![2, 3], vec![4]]);
        let ctx = SearchContext::new(&instance, &matrix, &solution);

        let operator = RelocateOperator::new(RelocateParams {
            from_route: RouteIdx::new(0),
            from_index: 1,
            to_route: RouteIdx::new(1),
        });

        let before = solution_cost(&solution, &matrix, 1);
        let delta = operator.delta(&ctx, &solution);
        assert!(operator.is_valid(&ctx, &solution));
        operator.apply(&mut solution);
        let after = solution_cost(&solution, &matrix, 1);

        assert_eq!(solution.route(RouteIdx::new(0)), &[2]);
        assert_eq!(solution.route(RouteIdx::new(1)), &[3, 4]);
        assert!((after - before - delta).abs() < 1e-9);
    }

    #[test]
    fn test_relocate_into_empty_route() {
        let matrix =
            test_utils::matrix_from_coords(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let instance = test_utils::create_test_instance(vec![0, 1, 1], 10, 2);
        let mut solution = test_utils::solution_from_routes(vec![vec![2, 3], vec![]]);
        let ctx = SearchContext::new(&instance, &matrix, &solution);

        let operator = RelocateOperator::new(RelocateParams {
            from_route: RouteIdx::new(0),
            from_index: 0,
            to_route: RouteIdx::new(1),
        });

        let before = solution_cost(&solution, &matrix, 1);
        let delta = operator.delta(&ctx, &solution);
        operator.apply(&mut solution);
        let after = solution_cost(&solution, &matrix, 1);

        assert_eq!(solution.route(RouteIdx::new(0)), &[3]);
        assert_eq!(solution.route(RouteIdx::new(1)), &[2]);
        assert!((after - before - delta).abs() < 1e-9);
    }

    #[test]
    fn test_relocate_rejects_overload() {
        let matrix =
            test_utils::matrix_from_coords(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let instance = test_utils::create_test_instance(vec![0, 4, 3], 6, 2);
        let solution = test_utils::solution_from_routes(vec![vec![2], vec![3]]);
        let ctx = SearchContext::new(&instance, &matrix, &solution);

        let operator = RelocateOperator::new(RelocateParams {
            from_route: RouteIdx::new(0),
            from_index: 0,
            to_route: RouteIdx::new(1),
        });

        assert!(!operator.is_valid(&ctx, &solution));
    }

    #[test]
    fn test_one_move_per_source_position() {
        let matrix = test_utils::matrix_from_coords(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
        ]);
        let instance = test_utils::create_test_instance(vec![0, 1, 1, 1], 10, 2);
        let solution = test_utils::solution_from_routes(vec![vec![2, 3, 4], vec![]]);
        let ctx = SearchContext::new(&instance, &matrix, &solution);

        let moves = collect_moves::<RelocateOperator>(
            &ctx,
            &solution,
            (RouteIdx::new(0), RouteIdx::new(1)),
        );

        assert_eq!(moves.len(), 3);
    }
}
