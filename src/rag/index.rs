//! Exact (flat) nearest-neighbour index over fixed-dimension vectors.
//!
//! Rows live in one contiguous `Array2<f32>`; appends are amortized O(1) and a
//! search is a single broadcast subtraction followed by a row-wise sum.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis};

use crate::core::errors::ApiError;

/// A search hit: squared L2 distance and the row's insertion position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    pub position: usize,
}

fn nearest_first(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.position.cmp(&b.position))
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Array2<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Array2::zeros((0, dimension)),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, position: usize) -> Option<ArrayView1<'_, f32>> {
        (position < self.len()).then(|| self.vectors.row(position))
    }

    /// Appends every vector or none of them.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), ApiError> {
        self.check_dimensions(vectors)?;
        self.vectors
            .reserve_rows(vectors.len())
            .map_err(ApiError::internal)?;
        for vector in vectors {
            self.vectors
                .push_row(ArrayView1::from(vector.as_slice()))
                .map_err(ApiError::internal)?;
        }
        Ok(())
    }

    pub fn check_dimensions(&self, vectors: &[Vec<f32>]) -> Result<(), ApiError> {
        match vectors.iter().find(|v| v.len() != self.dimension) {
            Some(bad) => Err(ApiError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            }),
            None => Ok(()),
        }
    }

    /// The `k` stored vectors nearest to `query`, nearest first.
    ///
    /// Ties go to the lower position. Asking for more than `len()` returns
    /// everything; an empty index returns an empty list.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, ApiError> {
        if query.len() != self.dimension {
            return Err(ApiError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query = ArrayView1::from(query);
        let diff = &self.vectors - &query;
        let distances = (&diff * &diff).sum_axis(Axis(1));

        let mut neighbors: Vec<Neighbor> = distances
            .iter()
            .enumerate()
            .map(|(position, &distance)| Neighbor { distance, position })
            .collect();

        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, nearest_first);
            neighbors.truncate(k);
        }
        neighbors.sort_by(nearest_first);

        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(rows: &[[f32; 2]]) -> VectorIndex {
        let mut index = VectorIndex::new(2);
        let rows: Vec<Vec<f32>> = rows.iter().map(|r| r.to_vec()).collect();
        index.add(&rows).unwrap();
        index
    }

    #[test]
    fn search_orders_nearest_first() {
        let index = index_with(&[[5.0, 0.0], [1.0, 0.0], [3.0, 0.0]]);

        let hits = index.search(&[0.0, 0.0], 3).unwrap();

        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[2].distance, 25.0);
    }

    #[test]
    fn ties_prefer_lower_position() {
        let index = index_with(&[[2.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, -1.0]]);

        let hits = index.search(&[0.0, 0.0], 3).unwrap();

        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn k_larger_than_len_returns_everything() {
        let index = index_with(&[[1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::new(4);
        assert!(index.search(&[0.0; 4], 5).unwrap().is_empty());
    }

    #[test]
    fn wrong_dimension_is_rejected_without_partial_append() {
        let mut index = index_with(&[[1.0, 1.0]]);

        let err = index
            .add(&[vec![0.0, 0.0], vec![1.0, 2.0, 3.0]])
            .unwrap_err();

        assert!(matches!(err, ApiError::DimensionMismatch { actual: 3, .. }));
        assert_eq!(index.len(), 1);
        assert!(index.search(&[1.0], 1).is_err());
    }
}
