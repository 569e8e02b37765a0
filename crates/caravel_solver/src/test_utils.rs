use geo::Coord;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    problem::{
        instance::{Demand, Instance, InstanceBuilder},
        matrix::DistanceMatrix,
    },
    solver::{
        ls::{LocalSearchOperator, SearchContext},
        solution::{RouteIdx, Solution},
    },
};

pub fn create_test_instance(demands: Vec<Demand>, capacity: Demand, num_vehicles: usize) -> Instance {
    let mut builder = InstanceBuilder::default();
    builder.set_name("test");
    builder.set_dimension(demands.len());
    builder.set_demands(demands);
    builder.set_capacity(capacity);
    builder.set_num_vehicles(num_vehicles);
    builder.set_depot(1);

    builder.build().unwrap()
}

/// Exact Euclidean matrix over `coords`, node `id` sitting at
/// `coords[id - 1]`; the depot is node 1.
pub fn matrix_from_coords(coords: Vec<(f64, f64)>) -> DistanceMatrix {
    let coords: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();

    DistanceMatrix::from_euclidean(&coords, false)
}

/// A deliberately directed matrix: `from → to` costs `from * 10 + to`.
pub fn asymmetric_test_matrix(node_count: usize) -> DistanceMatrix {
    let size = node_count + 1;
    let rows = (0..size)
        .map(|from| {
            (0..size)
                .map(|to| if from == to { 0.0 } else { (from * 10 + to) as f64 })
                .collect()
        })
        .collect();

    DistanceMatrix::from_rows(rows)
}

pub fn solution_from_routes(routes: Vec<Vec<usize>>) -> Solution {
    Solution::new(routes)
}

/// Reproducible instance + matrix pair: customers scattered uniformly over
/// a 100x100 field with unit-to-`max_demand` demands.
pub fn random_test_problem(
    customers: usize,
    num_vehicles: usize,
    capacity: Demand,
    seed: u64,
) -> (Instance, DistanceMatrix) {
    let mut rng = SmallRng::seed_from_u64(seed);

    let coords: Vec<Coord> = (0..=customers)
        .map(|_| Coord {
            x: rng.random_range(0.0..100.0),
            y: rng.random_range(0.0..100.0),
        })
        .collect();

    let mut demands: Vec<Demand> = vec![0];
    demands.extend((0..customers).map(|_| rng.random_range(1..=5)));

    let mut builder = InstanceBuilder::default();
    builder.set_name("random");
    builder.set_dimension(customers + 1);
    builder.set_demands(demands);
    builder.set_capacity(capacity);
    builder.set_num_vehicles(num_vehicles);
    builder.set_depot(1);
    let instance = builder.build().unwrap();

    let matrix = DistanceMatrix::from_euclidean(&coords, false);

    (instance, matrix)
}

pub fn collect_moves<O: LocalSearchOperator>(
    ctx: &SearchContext,
    solution: &Solution,
    pair: (RouteIdx, RouteIdx),
) -> Vec<O> {
    let mut moves = Vec::new();
    O::generate_moves(ctx, solution, pair, |op| moves.push(op));
    moves
}
