use crate::{
    problem::instance::NodeId,
    solver::{
        ls::{SearchContext, r#move::LocalSearchOperator},
        solution::{RouteIdx, Solution},
    },
};

/// **Inter-route exchange**
///
/// Swaps one customer of the first route with one customer of the second.
///
/// ```text
/// BEFORE:
///    R1: ... (p1) --x--> [a] --x--> (n1) ...
///    R2: ... (p2) --x--> [b] --x--> (n2) ...
///
/// AFTER:
///    R1: ... (p1) -----> [b] -----> (n1) ...
///    R2: ... (p2) -----> [a] -----> (n2) ...
/// ```
#[derive(Debug)]
pub struct ExchangeOperator {
    params: ExchangeParams,
}

#[derive(Debug)]
pub struct ExchangeParams {
    pub first_route: RouteIdx,
    pub first_index: usize,
    pub second_route: RouteIdx,
    pub second_index: usize,
}

impl ExchangeOperator {
    pub fn new(params: ExchangeParams) -> Self {
        if params.first_route == params.second_route {
            panic!("Exchange: routes must differ")
        }

        ExchangeOperator { params }
    }

    /// Cost change of replacing `route[index]` with `substitute`, the rest
    /// of the route untouched.
    fn replacement_delta(
        ctx: &SearchContext,
        route: &[NodeId],
        index: usize,
        substitute: NodeId,
    ) -> f64 {
        let depot = ctx.depot();
        let current = route[index];

        let prev = if index == 0 { depot } else { route[index - 1] };
        let next = if index + 1 == route.len() {
            depot
        } else {
            route[index + 1]
        };

        ctx.distance(prev, substitute) + ctx.distance(substitute, next)
            - ctx.distance(prev, current)
            - ctx.distance(current, next)
    }
}

impl LocalSearchOperator for ExchangeOperator {
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

        for first_index in 0..solution.route(r1).len() {
            for second_index in 0..solution.route(r2).len() {
                consumer(ExchangeOperator::new(ExchangeParams {
                    first_route: r1,
                    first_index,
                    second_route: r2,
                    second_index,
                }))
            }
        }
    }

    fn delta(&self, ctx: &SearchContext, solution: &Solution) -> f64 {
        let first = solution.route(self.params.first_route);
        let second = solution.route(self.params.second_route);

        let a = first[self.params.first_index];
        let b = second[self.params.second_index];

        Self::replacement_delta(ctx, first, self.params.first_index, b)
            + Self::replacement_delta(ctx, second, self.params.second_index, a)
    }

    fn is_valid(&self, ctx: &SearchContext, solution: &Solution) -> bool {
        let a = ctx.demand(solution.route(self.params.first_route)[self.params.first_index]);
        let b = ctx.demand(solution.route(self.params.second_route)[self.params.second_index]);

        ctx.load(self.params.first_route) - a + b <= ctx.capacity()
            && ctx.load(self.params.second_route) - b + a <= ctx.capacity()
    }

    fn apply(&self, solution: &mut Solution) {
        let a = solution.route(self.params.first_route)[self.params.first_index];
        let b = solution.route(self.params.second_route)[self.params.second_index];

        solution.route_mut(self.params.first_route)[self.params.first_index] = b;
        solution.route_mut(self.params.second_route)[self.params.second_index] = a;
    }
}
