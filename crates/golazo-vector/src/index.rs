//! In-memory dense matrix with brute-force cosine similarity search.
//!
//! The matrix is a cache over the store's entries: it is rebuilt lazily on
//! the first search after the entries change. Search is O(n * d).

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::debug;

use golazo_core::error::{GolazoError, Result};

/// Added to norms before dividing so zero vectors score 0 instead of NaN.
const NORM_EPSILON: f32 = 1e-10;

/// Local fallback index.
#[derive(Debug, Clone)]
pub struct LocalIndex {
    dimension: usize,
    matrix: Array2<f32>,
    dirty: bool,
}

impl LocalIndex {
    /// Create an empty index for vectors of `dimension` floats.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            matrix: Array2::zeros((0, dimension)),
            dirty: false,
        }
    }

    /// Flag the cached matrix as stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop the cached matrix and start over with an empty, clean index.
    pub fn reset(&mut self, dimension: usize) {
        *self = Self::new(dimension);
    }

    /// Stack the given vectors, in order, into the cached matrix.
    pub fn rebuild<'a, I>(&mut self, vectors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut flat = Vec::new();
        let mut rows = 0;
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(GolazoError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
            flat.extend_from_slice(vector);
            rows += 1;
        }

        self.matrix = Array2::from_shape_vec((rows, self.dimension), flat)
            .map_err(|e| GolazoError::Storage(format!("Index matrix: {}", e)))?;
        self.dirty = false;
        debug!(rows, dimension = self.dimension, "Local index rebuilt");
        Ok(())
    }

    /// The cached matrix, one row per entry.
    pub fn matrix(&self) -> ArrayView2<'_, f32> {
        self.matrix.view()
    }

    /// Number of rows in the cached matrix.
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row indices with their cosine similarity to `query`, best first.
    ///
    /// Equal scores keep insertion order. Must be called on a clean index.
    pub fn rank(&self, query: &[f32]) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(GolazoError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let scores = cosine_similarity(ArrayView1::from(query), self.matrix.view());
        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| descending(a.1, b.1));
        Ok(ranked)
    }
}

/// Cosine similarity of `query` against every row of `matrix`.
///
/// Both sides are normalized with an epsilon-floored norm. Scores are not
/// clamped and may drift slightly outside [-1, 1].
pub fn cosine_similarity(query: ArrayView1<'_, f32>, matrix: ArrayView2<'_, f32>) -> Array1<f32> {
    let query_norm = query.dot(&query).sqrt() + NORM_EPSILON;
    let query = &query / query_norm;

    let row_norms = matrix
        .map_axis(Axis(1), |row| row.dot(&row).sqrt() + NORM_EPSILON)
        .insert_axis(Axis(1));
    let normalized = &matrix / &row_norms;

    normalized.dot(&query)
}

/// Descending order with NaN last.
fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
