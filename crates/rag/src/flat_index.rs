//! Exact nearest-neighbour index under squared Euclidean distance
//!
//! Vectors are stored row-major in one contiguous buffer; position `i` in the
//! index is record `i` of the artifact.

use crate::RagError;

/// A search hit: record position and squared L2 distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Nearest-neighbour structure backing the retrieval engine
///
/// Any exact or approximate structure can stand in, provided results come
/// back nearest first.
pub trait NearestNeighborIndex: Send + Sync {
    /// Vector dimension
    fn dimension(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors in order; positions continue from `len()`
    fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<(), RagError>;

    /// `k` nearest stored vectors, ascending distance
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, RagError>;

    /// `k` nearest among the given positions only, ascending distance
    fn search_subset(
        &self,
        query: &[f32],
        k: usize,
        positions: &[usize],
    ) -> Result<Vec<Neighbor>, RagError>;
}

/// Brute-force flat index
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Wrap an existing row-major buffer
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self, RagError> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(RagError::CorruptIndex(format!(
                "{} values do not divide into rows of dimension {}",
                data.len(),
                dimension
            )));
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(RagError::CorruptIndex(format!(
                "non-finite value in row {}",
                pos / dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Row-major buffer, in insertion order
    pub fn into_vectors(self) -> Vec<f32> {
        self.data
    }

    fn check_query(&self, query: &[f32]) -> Result<(), RagError> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(())
    }

    fn distance_to(&self, position: usize, query: &[f32]) -> f32 {
        let start = position * self.dimension;
        squared_l2(&self.data[start..start + self.dimension], query)
    }

    fn top_k(&self, query: &[f32], k: usize, positions: impl Iterator<Item = usize>) -> Vec<Neighbor> {
        if k == 0 {
            return Vec::new();
        }

        let mut neighbors: Vec<Neighbor> = positions
            .map(|position| Neighbor {
                position,
                distance: self.distance_to(position, query),
            })
            .collect();

        // Ties resolve to the lower position so results are reproducible
        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);
        neighbors
    }
}

impl NearestNeighborIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension.max(1)
    }

    fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<(), RagError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, RagError> {
        self.check_query(query)?;
        Ok(self.top_k(query, k, 0..self.len()))
    }

    fn search_subset(
        &self,
        query: &[f32],
        k: usize,
        positions: &[usize],
    ) -> Result<Vec<Neighbor>, RagError> {
        self.check_query(query)?;
        let len = self.len();
        Ok(self.top_k(query, k, positions.iter().copied().filter(|&p| p < len)))
    }
}

/// Squared Euclidean distance
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
