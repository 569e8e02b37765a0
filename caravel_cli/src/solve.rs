use clap::Args;
use geo::Coord;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::info;

use caravel_solver::{
    problem::{instance::InstanceBuilder, matrix::DistanceMatrix},
    solver::{gls::Gls, params::GlsParams},
};

use crate::parsers;

#[derive(Args)]
pub struct SolveArgs {
    /// Number of customers to generate
    #[arg(short, long, default_value_t = 50)]
    customers: usize,

    /// Fleet size
    #[arg(short, long, default_value_t = 5)]
    vehicles: usize,

    /// Capacity of every vehicle
    #[arg(long, default_value_t = 100)]
    capacity: u32,

    /// Customer demands are drawn uniformly from 1..=max-demand
    #[arg(long, default_value_t = 10)]
    max_demand: u32,

    /// Penalty weight of the guided search
    #[arg(long, default_value_t = 0.3)]
    lambda: f64,

    /// Secondary penalty multiplier
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Wall-clock budget for the search (e.g., "30s", "5m")
    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "30s")]
    duration: jiff::SignedDuration,

    /// Seed for both the generator and the solver
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the full outcome as JSON on stdout
    #[arg(long)]
    json: bool,
}

pub fn run(args: SolveArgs) -> Result<(), anyhow::Error> {
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    // nodes scattered over a 100x100 field, node 1 is the depot
    let coords: Vec<Coord> = (0..=args.customers)
        .map(|_| Coord {
            x: rng.random_range(0.0..100.0),
            y: rng.random_range(0.0..100.0),
        })
        .collect();

    let mut demands = vec![0];
    demands.extend((0..args.customers).map(|_| rng.random_range(1..=args.max_demand)));

    let mut builder = InstanceBuilder::default();
    builder.set_name(format!("random-n{}-k{}", args.customers + 1, args.vehicles));
    builder.set_dimension(args.customers + 1);
    builder.set_demands(demands);
    builder.set_capacity(args.capacity);
    builder.set_num_vehicles(args.vehicles);
    builder.set_depot(1);
    let instance = builder.build()?;

    let matrix = DistanceMatrix::from_euclidean(&coords, true);

    info!(
        name = instance.name(),
        customers = instance.customer_count(),
        vehicles = instance.num_vehicles(),
        capacity = instance.capacity(),
        total_demand = instance.total_demand(),
        "generated instance"
    );

    let params = GlsParams {
        lambda: args.lambda,
        alpha: args.alpha,
        time_budget: args.duration,
        seed: args.seed,
        ..GlsParams::default()
    };

    let outcome = Gls::new(&instance, &matrix, params)?.run()?;

    info!(
        cost = outcome.cost,
        time_to_best = %outcome.time_to_best,
        iteration_to_best = outcome.iteration_to_best,
        iterations = outcome.iterations,
        "best solution"
    );

    for (vehicle, route) in outcome.solution.routes().iter().enumerate() {
        info!("vehicle {vehicle}: {route:?}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}
