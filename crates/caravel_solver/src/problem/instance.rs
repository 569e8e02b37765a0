use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node ids are 1-based; id 1 is conventionally the depot. They double as
/// indices into the [`DistanceMatrix`](super::matrix::DistanceMatrix), whose
/// row and column 0 are unused.
pub type NodeId = usize;
pub type Demand = u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceError {
    #[error("demand list has {got} entries, expected {expected}")]
    DemandCountMismatch { got: usize, expected: usize },

    #[error("vehicle capacity must be positive")]
    NonPositiveCapacity,

    #[error("at least one vehicle is required")]
    EmptyFleet,

    #[error("dimension {0} is too small, need the depot and at least one customer")]
    DimensionTooSmall(usize),

    #[error("depot id {depot} is outside 1..={dimension}")]
    DepotOutOfRange { depot: NodeId, dimension: usize },

    #[error("depot demand must be zero, got {0}")]
    NonZeroDepotDemand(Demand),

    #[error("customer {customer} demand {demand} exceeds vehicle capacity {capacity}")]
    DemandExceedsCapacity {
        customer: NodeId,
        demand: Demand,
        capacity: Demand,
    },
}

/// A validated CVRP instance. Immutable for the lifetime of a run; the search
/// keeps its own accumulators and never writes back here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    name: String,
    dimension: usize,
    num_vehicles: usize,
    capacity: Demand,
    demands: Vec<Demand>,
    depot: NodeId,
    optimal_value: Option<f64>,
}

impl Instance {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total node count, depot included.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    pub fn capacity(&self) -> Demand {
        self.capacity
    }

    pub fn depot(&self) -> NodeId {
        self.depot
    }

    /// Reference optimum carried from the dataset, if known.
    pub fn optimal_value(&self) -> Option<f64> {
        self.optimal_value
    }

    #[inline(always)]
    pub fn demand(&self, node: NodeId) -> Demand {
        self.demands[node - 1]
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    /// Every node id except the depot, in ascending order.
    pub fn customers(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..=self.dimension).filter(|&id| id != self.depot)
    }

    pub fn customer_count(&self) -> usize {
        self.dimension - 1
    }

    pub fn total_demand(&self) -> u64 {
        self.demands.iter().map(|&d| u64::from(d)).sum()
    }
}

#[derive(Debug, Default)]
pub struct InstanceBuilder {
    name: String,
    dimension: usize,
    num_vehicles: usize,
    capacity: Demand,
    demands: Vec<Demand>,
    depot: NodeId,
    optimal_value: Option<f64>,
}

impl InstanceBuilder {
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_dimension(&mut self, dimension: usize) -> &mut Self {
        self.dimension = dimension;
        self
    }

    pub fn set_num_vehicles(&mut self, num_vehicles: usize) -> &mut Self {
        self.num_vehicles = num_vehicles;
        self
    }

    pub fn set_capacity(&mut self, capacity: Demand) -> &mut Self {
        self.capacity = capacity;
        self
    }

    pub fn set_demands(&mut self, demands: Vec<Demand>) -> &mut Self {
        self.demands = demands;
        self
    }

    pub fn set_depot(&mut self, depot: NodeId) -> &mut Self {
        self.depot = depot;
        self
    }

    pub fn set_optimal_value(&mut self, optimal_value: f64) -> &mut Self {
        self.optimal_value = Some(optimal_value);
        self
    }

    pub fn build(self) -> Result<Instance, InstanceError> {
        if self.dimension < 2 {
            return Err(InstanceError::DimensionTooSmall(self.dimension));
        }

        if self.demands.len() != self.dimension {
            return Err(InstanceError::DemandCountMismatch {
                got: self.demands.len(),
                expected: self.dimension,
            });
        }

        if self.capacity == 0 {
            return Err(InstanceError::NonPositiveCapacity);
        }

        if self.num_vehicles == 0 {
            return Err(InstanceError::EmptyFleet);
        }

        if self.depot == 0 || self.depot > self.dimension {
            return Err(InstanceError::DepotOutOfRange {
                depot: self.depot,
                dimension: self.dimension,
            });
        }

        let depot_demand = self.demands[self.depot - 1];
        if depot_demand != 0 {
            return Err(InstanceError::NonZeroDepotDemand(depot_demand));
        }

        for (index, &demand) in self.demands.iter().enumerate() {
            if demand > self.capacity {
                return Err(InstanceError::DemandExceedsCapacity {
                    customer: index + 1,
                    demand,
                    capacity: self.capacity,
                });
            }
        }

        Ok(Instance {
            name: self.name,
            dimension: self.dimension,
            num_vehicles: self.num_vehicles,
            capacity: self.capacity,
            demands: self.demands,
            depot: self.depot,
            optimal_value: self.optimal_value,
        })
    }
}
