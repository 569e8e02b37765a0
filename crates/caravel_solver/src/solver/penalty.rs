use serde::Serialize;

use crate::{
    problem::{instance::NodeId, matrix::DistanceMatrix},
    solver::solution::Solution,
};

/// A directed edge between two route-adjacent customers, the unit that
/// guided local search penalizes. Depot-adjacent edges are never features.
pub type Feature = (NodeId, NodeId);

/// Penalty counts per directed edge, same shape as the distance matrix.
/// Counts only ever grow over a run; there is no decay or reset.
#[derive(Debug, Clone, Serialize)]
pub struct PenaltyMatrix {
    counts: Vec<u32>,
    size: usize,
}

impl PenaltyMatrix {
    pub fn new(size: usize) -> Self {
        PenaltyMatrix {
            counts: vec![0; size * size],
            size,
        }
    }

    #[inline(always)]
    fn index(&self, from: NodeId, to: NodeId) -> usize {
        from * self.size + to
    }

    #[inline(always)]
    pub fn count(&self, from: NodeId, to: NodeId) -> u32 {
        self.counts[self.index(from, to)]
    }

    fn increment(&mut self, from: NodeId, to: NodeId) {
        let index = self.index(from, to);
        self.counts[index] += 1;
    }

    /// The edges of the current solution with the maximal utility
    /// `cost / (count + 1)`. All ties are returned, not just the first.
    pub fn select_features(&self, solution: &Solution, costs: &DistanceMatrix) -> Vec<Feature> {
        let mut max_ratio = f64::NEG_INFINITY;
        let mut features = Vec::new();

        for route in solution.routes() {
            for pair in route.windows(2) {
                let (u, v) = (pair[0], pair[1]);
                let ratio = costs.distance(u, v) / f64::from(self.count(u, v) + 1);

                if ratio > max_ratio {
                    max_ratio = ratio;
                    features.clear();
                    features.push((u, v));
                } else if ratio == max_ratio {
                    features.push((u, v));
                }
            }
        }

        features
    }

    /// Selects the maximal-utility features and bumps each of their counts
    /// by one. Returns the selected set.
    pub fn penalize(&mut self, solution: &Solution, costs: &DistanceMatrix) -> Vec<Feature> {
        let features = self.select_features(solution, costs);

        for &(u, v) in &features {
            self.increment(u, v);
        }

        features
    }

    /// Derives the biased matrix `base[i][j] + lambda * alpha * count[i][j]`.
    /// Always computed from the true matrix, so penalties never compound.
    pub fn penalized_matrix(
        &self,
        base: &DistanceMatrix,
        lambda: f64,
        alpha: f64,
    ) -> DistanceMatrix {
        debug_assert_eq!(base.size(), self.size);

        let values = base
            .values()
            .iter()
            .zip(self.counts.iter())
            .map(|(&distance, &count)| distance + lambda * alpha * f64::from(count))
            .collect();

        DistanceMatrix::from_flat(values, self.size)
    }
}
