use crate::solver::{
    ls::{SearchContext, r#move::LocalSearchOperator},
    solution::{RouteIdx, Solution},
};

/// **Intra-route 2-opt**
///
/// Reverses the customer sequence between `from` and `to` (inclusive).
/// This eliminates crossing edges within a single route.
///
/// ```text
/// BEFORE:
///    ... (prev) --x--> [from] -> ... -> [to] --x--> (next) ...
///
/// AFTER (segment reversed):
///    ... (prev) -----> [to] -> ... -> [from] -----> (next) ...
/// ```
///
/// The first and last customers of the route stay pinned against the depot
/// boundaries, so `prev` and `next` are always customers. Because penalized
/// matrices are directed, the interior of the segment is re-priced in the
/// reversed direction rather than assumed free.
#[derive(Debug)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug)]
pub struct TwoOptParams {
    pub route: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        if params.from >= params.to {
            panic!("TwoOpt: cannot have from >= to")
        }

        TwoOptOperator { params }
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(
        _ctx: &SearchContext,
        solution: &Solution,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let n = solution.route(r1).len();
        if n < 4 {
            return; // need at least 4 customers for a non-trivial pinned reversal
        }

        for from in 1..n - 2 {
            for to in from + 1..n - 1 {
                consumer(TwoOptOperator::new(TwoOptParams {
                    route: r1,
                    from,
                    to,
                }))
            }
        }
    }

    fn delta(&self, ctx: &SearchContext, solution: &Solution) -> f64 {
        let route = solution.route(self.params.route);
        let (from, to) = (self.params.from, self.params.to);

        let prev = route[from - 1];
        let next = route[to + 1];

        let mut removed = ctx.distance(prev, route[from]) + ctx.distance(route[to], next);
        let mut added = ctx.distance(prev, route[to]) + ctx.distance(route[from], next);

        for k in from..to {
            removed += ctx.distance(route[k], route[k + 1]);
            added += ctx.distance(route[k + 1], route[k]);
        }

        added - removed
    }

    fn is_valid(&self, _ctx: &SearchContext, _solution: &Solution) -> bool {
        true // reversal leaves the route's load untouched
    }

    fn apply(&self, solution: &mut Solution) {
        solution.route_mut(self.params.route)[self.params.from..=self.params.to].reverse();
    }
}
