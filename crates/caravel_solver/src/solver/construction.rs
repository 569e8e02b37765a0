use rand::{rngs::SmallRng, seq::SliceRandom};
use thiserror::Error;
use tracing::debug;

use crate::{
    problem::instance::{Demand, Instance, NodeId},
    solver::solution::Solution,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("no capacity-feasible assignment found after {attempts} shuffles")]
    Infeasible { attempts: usize },
}

/// Builds a feasible starting solution: shuffle the customers, then first-fit
/// each one onto the vehicles in fixed order. A shuffle that strands a
/// customer is thrown away and retried with a fresh permutation, up to
/// `max_attempts` times; tightly packed instances that defeat first-fit every
/// time surface as [`ConstructionError::Infeasible`] instead of looping
/// forever.
pub fn build_initial_solution(
    instance: &Instance,
    rng: &mut SmallRng,
    max_attempts: usize,
) -> Result<Solution, ConstructionError> {
    let attempts = max_attempts.max(1);
    let mut customers: Vec<NodeId> = instance.customers().collect();

    for attempt in 1..=attempts {
        customers.shuffle(rng);

        if let Some(solution) = first_fit(instance, &customers) {
            debug!(attempt, "initial solution placed all customers");
            return Ok(solution);
        }
    }

    Err(ConstructionError::Infeasible { attempts })
}

fn first_fit(instance: &Instance, customers: &[NodeId]) -> Option<Solution> {
    let mut routes = vec![Vec::new(); instance.num_vehicles()];
    let mut loads: Vec<Demand> = vec![0; instance.num_vehicles()];

    'customers: for &customer in customers {
        let demand = instance.demand(customer);

        for (route, load) in routes.iter_mut().zip(loads.iter_mut()) {
            if *load + demand <= instance.capacity() {
                route.push(customer);
                *load += demand;
                continue 'customers;
            }
        }

        return None;
    }

    Some(Solution::new(routes))
}
