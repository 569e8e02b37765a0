use crate::solver::{
    cost,
    ls::{SearchContext, r#move::LocalSearchOperator},
    solution::{RouteIdx, Solution},
};

/// **Cross (tail swap)**
///
/// Cuts two routes after `first_cut` and `second_cut` and exchanges the
/// tails.
///
/// ```text
/// BEFORE:
///    R1: ... [a_cut] --x--> (a_tail...)
///    R2: ... [b_cut] --x--> (b_tail...)
///
/// AFTER:
///    R1: ... [a_cut] -----> (b_tail...)
///    R2: ... [b_cut] -----> (a_tail...)
/// ```
///
/// Only the two cut edges change price; each tail keeps its interior edges
/// and its closing edge to the depot.
#[derive(Debug)]
pub struct CrossOperator {
    params: CrossParams,
}

#[derive(Debug)]
pub struct CrossParams {
    pub first_route: RouteIdx,
    pub first_cut: usize,
    pub second_route: RouteIdx,
    pub second_cut: usize,
}

impl CrossOperator {
    pub fn new(params: CrossParams) -> Self {
        if params.first_route == params.second_route {
            panic!("Cross: routes must differ")
        }

        CrossOperator { params }
    }
}

impl LocalSearchOperator for CrossOperator {
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

        for first_cut in 0..solution.route(r1).len() {
            for second_cut in 0..solution.route(r2).len() {
                consumer(CrossOperator::new(CrossParams {
                    first_route: r1,
                    first_cut,
                    second_route: r2,
                    second_cut,
                }))
            }
        }
    }

    fn delta(&self, ctx: &SearchContext, solution: &Solution) -> f64 {
        let first = solution.route(self.params.first_route);
        let second = solution.route(self.params.second_route);
        let depot = ctx.depot();

        let a_cut = first[self.params.first_cut];
        let b_cut = second[self.params.second_cut];

        let a_head = if self.params.first_cut + 1 < first.len() {
            first[self.params.first_cut + 1]
        } else {
            depot
        };
        let b_head = if self.params.second_cut + 1 < second.len() {
            second[self.params.second_cut + 1]
        } else {
            depot
        };

        ctx.distance(a_cut, b_head) + ctx.distance(b_cut, a_head)
            - ctx.distance(a_cut, a_head)
            - ctx.distance(b_cut, b_head)
    }

    fn is_valid(&self, ctx: &SearchContext, solution: &Solution) -> bool {
        let first = solution.route(self.params.first_route);
        let second = solution.route(self.params.second_route);

        let first_prefix = cost::route_demand(&first[..=self.params.first_cut], ctx.instance());
        let second_prefix = cost::route_demand(&second[..=self.params.second_cut], ctx.instance());

        let first_tail = ctx.load(self.params.first_route) - first_prefix;
        let second_tail = ctx.load(self.params.second_route) - second_prefix;

        first_prefix + second_tail <= ctx.capacity()
            && second_prefix + first_tail <= ctx.capacity()
    }

    fn apply(&self, solution: &mut Solution) {
        let routes = solution.routes_mut();

        let first_tail = routes[self.params.first_route].split_off(self.params.first_cut + 1);
        let second_tail = routes[self.params.second_route].split_off(self.params.second_cut + 1);

        routes[self.params.first_route].extend(second_tail);
        routes[self.params.second_route].extend(first_tail);
    }
}
