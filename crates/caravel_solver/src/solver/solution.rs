use fxhash::FxHashSet;
use serde::Serialize;
use thiserror::Error;

use crate::{
    define_index_newtype,
    problem::instance::{Demand, Instance, NodeId},
    solver::cost,
};

define_index_newtype!(RouteIdx, Vec<NodeId>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("customer {0} appears more than once")]
    DuplicateCustomer(NodeId),

    #[error("customer {0} is not served by any route")]
    MissingCustomer(NodeId),

    #[error("node id {0} does not belong to the instance")]
    UnknownNode(NodeId),

    #[error("route {route} carries {demand}, exceeding capacity {capacity}")]
    CapacityExceeded {
        route: usize,
        demand: Demand,
        capacity: Demand,
    },
}

/// One route per vehicle, each an ordered sequence of customer ids. The
/// depot is not stored; costing treats it as the implicit start and end of
/// every route. Plain value semantics: snapshotting the best-known solution
/// is a `clone()`, never an alias of the working one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    routes: Vec<Vec<NodeId>>,
}

impl Solution {
    pub fn new(routes: Vec<Vec<NodeId>>) -> Self {
        Solution { routes }
    }

    pub fn routes(&self) -> &[Vec<NodeId>] {
        &self.routes
    }

    pub fn route(&self, index: RouteIdx) -> &[NodeId] {
        &self.routes[index]
    }

    pub(crate) fn route_mut(&mut self, index: RouteIdx) -> &mut Vec<NodeId> {
        &mut self.routes[index]
    }

    pub(crate) fn routes_mut(&mut self) -> &mut Vec<Vec<NodeId>> {
        &mut self.routes
    }

    pub fn customer_count(&self) -> usize {
        self.routes.iter().map(|route| route.len()).sum()
    }

    /// Checks the coverage and capacity invariants: every customer of the
    /// instance in exactly one route, every route within capacity.
    pub fn check_invariants(&self, instance: &Instance) -> Result<(), InvariantViolation> {
        let mut seen = FxHashSet::default();

        for (index, route) in self.routes.iter().enumerate() {
            for &node in route {
                if node == instance.depot() || node == 0 || node > instance.dimension() {
                    return Err(InvariantViolation::UnknownNode(node));
                }

                if !seen.insert(node) {
                    return Err(InvariantViolation::DuplicateCustomer(node));
                }
            }

            let demand = cost::route_demand(route, instance);
            if demand > instance.capacity() {
                return Err(InvariantViolation::CapacityExceeded {
                    route: index,
                    demand,
                    capacity: instance.capacity(),
                });
            }
        }

        for customer in instance.customers() {
            if !seen.contains(&customer) {
                return Err(InvariantViolation::MissingCustomer(customer));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_invariants_hold() {
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);
        let solution = Solution::new(vec![vec![2, 3], vec![4, 5]]);

        assert_eq!(solution.check_invariants(&instance), Ok(()));
        assert_eq!(solution.customer_count(), 4);
    }

    #[test]
    fn test_empty_route_is_legal() {
        let instance = test_utils::create_test_instance(vec![0, 1, 1], 6, 3);
        let solution = Solution::new(vec![vec![2, 3], vec![], vec![]]);

        assert_eq!(solution.check_invariants(&instance), Ok(()));
    }

    #[test]
    fn test_duplicate_customer() {
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);
        let solution = Solution::new(vec![vec![2, 3], vec![3, 5]]);

        assert_eq!(
            solution.check_invariants(&instance),
            Err(InvariantViolation::DuplicateCustomer(3))
        );
    }

    #[test]
    fn test_missing_customer() {
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);
        let solution = Solution::new(vec![vec![2, 3], vec![5]]);

        assert_eq!(
            solution.check_invariants(&instance),
            Err(InvariantViolation::MissingCustomer(4))
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);
        let solution = Solution::new(vec![vec![2, 3, 4], vec![5]]);

        assert_eq!(
            solution.check_invariants(&instance),
            Err(InvariantViolation::CapacityExceeded {
                route: 0,
                demand: 9,
                capacity: 6
            })
        );
    }

    #[test]
    fn test_depot_inside_route() {
        let instance = test_utils::create_test_instance(vec![0, 3, 3, 3, 3], 6, 2);
        let solution = Solution::new(vec![vec![2, 1], vec![3, 4, 5]]);

        assert_eq!(
            solution.check_invariants(&instance),
            Err(InvariantViolation::UnknownNode(1))
        );
    }
}
