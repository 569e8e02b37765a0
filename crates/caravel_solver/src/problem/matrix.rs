use geo::Coord;
use serde::Serialize;

use crate::problem::instance::NodeId;

pub type Distance = f64;

/// Travel distances between nodes, stored flat in row-major order. To find
/// the entry for a pair of nodes, use `index = from * size + to`, where
/// `size` is `dimension + 1`: node ids are 1-based, so row and column 0 are
/// unused.
///
/// The true matrix of a run is symmetric and fixed; matrices derived by the
/// penalty controller are in general asymmetric because penalties attach to
/// directed edges.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceMatrix {
    values: Vec<Distance>,
    size: usize,
}

impl DistanceMatrix {
    pub fn from_rows(rows: Vec<Vec<Distance>>) -> Self {
        let size = rows.len();
        assert!(
            rows.iter().all(|row| row.len() == size),
            "distance matrix rows must all have length {size}"
        );

        DistanceMatrix {
            values: rows.into_iter().flatten().collect(),
            size,
        }
    }

    /// Builds the matrix from per-node coordinates, `coords[id - 1]` being
    /// the position of node `id`. `round` snaps distances to integers, the
    /// usual convention for benchmark datasets.
    pub fn from_euclidean(coords: &[Coord], round: bool) -> Self {
        let size = coords.len() + 1;
        let mut values = vec![0.0; size * size];

        for (i, from) in coords.iter().enumerate() {
            for (j, to) in coords.iter().enumerate() {
                let distance = (from.x - to.x).hypot(from.y - to.y);
                values[(i + 1) * size + (j + 1)] = if round { distance.round() } else { distance };
            }
        }

        DistanceMatrix { values, size }
    }

    pub(crate) fn from_flat(values: Vec<Distance>, size: usize) -> Self {
        debug_assert_eq!(values.len(), size * size);
        DistanceMatrix { values, size }
    }

    #[inline(always)]
    fn index(&self, from: NodeId, to: NodeId) -> usize {
        from * self.size + to
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeId, to: NodeId) -> Distance {
        if from == to {
            return 0.0;
        }

        self.values[self.index(from, to)]
    }

    /// Side length of the matrix, `dimension + 1`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of addressable nodes (`dimension`).
    pub fn node_count(&self) -> usize {
        self.size - 1
    }

    pub fn is_symmetric(&self) -> bool {
        for from in 0..self.size {
            for to in 0..from {
                if self.values[from * self.size + to] != self.values[to * self.size + from] {
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn values(&self) -> &[Distance] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_euclidean() {
        let coords = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 3.0, y: 4.0 },
            Coord { x: 0.0, y: 10.0 },
        ];
        let matrix = DistanceMatrix::from_euclidean(&coords, false);

        assert_eq!(matrix.size(), 4);
        assert_eq!(matrix.node_count(), 3);
        assert_eq!(matrix.distance(1, 2), 5.0);
        assert_eq!(matrix.distance(1, 3), 10.0);
        assert_eq!(matrix.distance(2, 2), 0.0);
        assert!(matrix.is_symmetric());
    }

    #[test]
    fn test_from_euclidean_rounds() {
        let coords = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }];
        let matrix = DistanceMatrix::from_euclidean(&coords, true);

        assert_eq!(matrix.distance(1, 2), 1.0);
    }

    #[test]
    fn test_from_rows() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 2.0],
            vec![0.0, 7.0, 0.0],
        ]);

        assert_eq!(matrix.distance(1, 2), 2.0);
        assert_eq!(matrix.distance(2, 1), 7.0);
        assert!(!matrix.is_symmetric());
    }
}
