use crate::error::{Result, VectorStoreError};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::cmp::Ordering;

/// Exact inner-product index over a dense row-major matrix.
///
/// Rows are addressed by insertion position. Callers are expected to store
/// unit vectors so the inner product is the cosine similarity.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Array2<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Array2::zeros((0, dimension)),
        }
    }

    /// Rebuild from `count * dimension` row-major values
    pub fn from_values(dimension: usize, count: usize, values: Vec<f32>) -> Result<Self> {
        let vectors = Array2::from_shape_vec((count, dimension), values)
            .map_err(|e| VectorStoreError::corrupt(format!("vector matrix shape: {e}")))?;
        Ok(Self { dimension, vectors })
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append rows in order. Either every row is appended or none is.
    pub fn append(&mut self, rows: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = rows.iter().find(|row| row.len() != self.dimension) {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        if rows.is_empty() {
            return Ok(());
        }

        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let batch = Array2::from_shape_vec((rows.len(), self.dimension), flat)
            .map_err(|e| VectorStoreError::InvalidConfig(format!("batch shape: {e}")))?;
        self.vectors
            .append(Axis(0), batch.view())
            .map_err(|e| VectorStoreError::InvalidConfig(format!("append: {e}")))?;
        Ok(())
    }

    /// Search for the k rows with the highest inner product.
    /// Returns (position, score) sorted by score descending, then position ascending.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query = ArrayView1::from(query);
        let scores: Array1<f32> = self.vectors.dot(&query);

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| rank_order(*a, *b));
        ranked.truncate(k);

        Ok(ranked)
    }

    pub fn row(&self, position: usize) -> Option<ArrayView1<'_, f32>> {
        (position < self.len()).then(|| self.vectors.row(position))
    }

    /// All values in row-major order
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.vectors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.vectors = Array2::zeros((0, self.dimension));
    }
}

/// Higher score first; equal scores keep insertion order. NaN ranks last.
fn rank_order(a: (usize, f32), b: (usize, f32)) -> Ordering {
    let key = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
    key(b.1)
        .total_cmp(&key(a.1))
        .then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_search() {
        let mut index = FlatIndex::new(3);

        index
            .append(&[
                vec![1.0, 0.0, 0.0],
                vec![0.9, 0.1, 0.0],
                vec![0.0, 1.0, 0.0],
            ])
            .unwrap();

        assert_eq!(index.len(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);

        // First result should be position 0 (exact match)
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-6);

        // Second should be position 1 (close)
        assert_eq!(results[1].0, 1);
        assert!(results[1].1 > 0.85);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIndex::new(3);
        let result = index.append(&[vec![1.0, 0.0, 0.0], vec![1.0, 0.0]]);
        assert!(result.is_err());
        assert!(index.is_empty());

        index.append(&[vec![1.0, 0.0, 0.0]]).unwrap();
        let result = index.search(&[1.0, 0.0], 1); // Wrong query dimension
        assert!(result.is_err());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = FlatIndex::new(2);
        index
            .append(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 4).unwrap();
        let order: Vec<usize> = results.iter().map(|(pos, _)| *pos).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_rank_order_puts_nan_last() {
        let mut scored = vec![(0, f32::NAN), (1, 0.2), (2, -0.5)];
        scored.sort_by(|a, b| rank_order(*a, *b));
        let order: Vec<usize> = scored.iter().map(|(pos, _)| *pos).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_from_values_and_clear() {
        let mut index = FlatIndex::from_values(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.row(1).unwrap().to_vec(), vec![0.0, 1.0]);
        assert!(index.row(2).is_none());
        assert_eq!(index.values().collect::<Vec<_>>(), vec![1.0, 0.0, 0.0, 1.0]);

        assert!(FlatIndex::from_values(2, 2, vec![1.0]).is_err());

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), 2);
    }
}
