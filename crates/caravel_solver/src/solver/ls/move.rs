use crate::solver::{
    ls::{
        SearchContext, cross::CrossOperator, exchange::ExchangeOperator,
        relocate::RelocateOperator, two_opt::TwoOptOperator,
    },
    solution::{RouteIdx, Solution},
};

/// A neighborhood operator: enumerates its candidate moves for a route pair,
/// prices a candidate against the matrix in play, and applies it.
///
/// `delta` is the signed cost change of the move (negative improves). It must
/// equal the difference in [`route_cost`](crate::solver::cost::route_cost) of
/// the affected routes before and after `apply`, including under asymmetric
/// (penalized) matrices.
pub trait LocalSearchOperator: Sized {
    fn generate_moves<C>(
        ctx: &SearchContext,
        solution: &Solution,
        pair: (RouteIdx, RouteIdx),
        consumer: C,
    ) where
        C: FnMut(Self);

    fn delta(&self, ctx: &SearchContext, solution: &Solution) -> f64;

    fn is_valid(&self, ctx: &SearchContext, solution: &Solution) -> bool;

    fn apply(&self, solution: &mut Solution);
}

#[derive(Debug)]
pub enum LocalSearchMove {
    /// Reverses a segment within a single route.
    TwoOpt(TwoOptOperator),
    /// Moves one customer to the front of another route.
    Relocate(RelocateOperator),
    /// Swaps one customer of each of two routes.
    Exchange(ExchangeOperator),
    /// Swaps the tails of two routes.
    Cross(CrossOperator),
}

impl LocalSearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LocalSearchMove::TwoOpt { .. } => "Two-Opt",
            LocalSearchMove::Relocate { .. } => "Relocate",
            LocalSearchMove::Exchange { .. } => "Exchange",
            LocalSearchMove::Cross { .. } => "Cross",
        }
    }

    pub fn delta(&self, ctx: &SearchContext, solution: &Solution) -> f64 {
        match self {
            LocalSearchMove::TwoOpt(op) => op.delta(ctx, solution),
            LocalSearchMove::Relocate(op) => op.delta(ctx, solution),
            LocalSearchMove::Exchange(op) => op.delta(ctx, solution),
            LocalSearchMove::Cross(op) => op.delta(ctx, solution),
        }
    }

    pub fn is_valid(&self, ctx: &SearchContext, solution: &Solution) -> bool {
        match self {
            LocalSearchMove::TwoOpt(op) => op.is_valid(ctx, solution),
            LocalSearchMove::Relocate(op) => op.is_valid(ctx, solution),
            LocalSearchMove::Exchange(op) => op.is_valid(ctx, solution),
            LocalSearchMove::Cross(op) => op.is_valid(ctx, solution),
        }
    }

    pub fn apply(&self, solution: &mut Solution) {
        match self {
            LocalSearchMove::TwoOpt(op) => op.apply(solution),
            LocalSearchMove::Relocate(op) => op.apply(solution),
            LocalSearchMove::Exchange(op) => op.apply(solution),
            LocalSearchMove::Cross(op) => op.apply(solution),
        }
    }
}
