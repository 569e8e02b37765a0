//! Pure costing primitives. These sit on the hot path of every move
//! evaluation, so they take slices and never allocate.

use crate::{
    problem::{
        instance::{Demand, Instance, NodeId},
        matrix::DistanceMatrix,
    },
    solver::solution::Solution,
};

/// Cost of a single route, depot → customers → depot. An empty route
/// costs nothing.
pub fn route_cost(route: &[NodeId], matrix: &DistanceMatrix, depot: NodeId) -> f64 {
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return 0.0;
    };

    let mut cost = matrix.distance(depot, first);
    for pair in route.windows(2) {
        cost += matrix.distance(pair[0], pair[1]);
    }
    cost + matrix.distance(last, depot)
}

pub fn solution_cost(solution: &Solution, matrix: &DistanceMatrix, depot: NodeId) -> f64 {
    solution
        .routes()
        .iter()
        .map(|route| route_cost(route, matrix, depot))
        .sum()
}

pub fn route_demand(route: &[NodeId], instance: &Instance) -> Demand {
    route.iter().map(|&customer| instance.demand(customer)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_empty_route_costs_nothing() {
        let matrix = test_utils::matrix_from_coords(vec![(0.0, 0.0), (5.0, 0.0)]);

        assert_eq!(route_cost(&[], &matrix, 1), 0.0);
    }

    #[test]
    fn test_route_cost_closes_at_the_depot() {
        // depot at the origin, customers strung out on the x axis
        let matrix =
            test_utils::matrix_from_coords(vec![(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (6.0, 0.0)]);

        assert_eq!(route_cost(&[2], &matrix, 1), 2.0);
        assert_eq!(route_cost(&[2, 3, 4], &matrix, 1), 12.0);
    }

    #[test]
    fn test_solution_cost_sums_routes() {
        let matrix =
            test_utils::matrix_from_coords(vec![(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (6.0, 0.0)]);
        let solution = test_utils::solution_from_routes(vec![vec![2], vec![3, 4], vec![]]);

        assert_eq!(solution_cost(&solution, &matrix, 1), 2.0 + 12.0);
    }

    #[test]
    fn test_route_demand() {
        let instance = test_utils::create_test_instance(vec![0, 3, 1, 4, 2], 10, 2);

        assert_eq!(route_demand(&[2, 4], &instance), 7);
        assert_eq!(route_demand(&[], &instance), 0);
    }
}
