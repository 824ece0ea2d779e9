//! Precomputed pairwise similarity matrix.
//!
//! Indexed by catalog row position with entries in [-1, 1]. Symmetry is not
//! assumed; the diagonal is conventionally 1.0 but ranking never relies on
//! it. A matrix whose size does not match the catalog disables content
//! ranking for the process.

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use ndarray::{Array2, ArrayView1};

#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    inner: Array2<f32>,
}

impl SimilarityMatrix {
    /// Wrap a precomputed matrix. Fails with `RankerUnavailable` when the
    /// matrix is not square.
    pub fn from_array(inner: Array2<f32>) -> Result<Self> {
        if inner.nrows() != inner.ncols() {
            return Err(EngineError::unavailable(format!(
                "similarity matrix is {}x{}, expected square",
                inner.nrows(),
                inner.ncols()
            )));
        }
        Ok(Self { inner })
    }

    /// Build from row vectors, e.g. deserialized from a precomputed dump.
    /// Ragged input fails with `RankerUnavailable`.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let n = rows.len();
        let mut flat = Vec::with_capacity(n * n);
        for row in &rows {
            if row.len() != n {
                return Err(EngineError::unavailable(format!(
                    "similarity matrix row has {} entries, expected {n}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }
        let inner = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| EngineError::unavailable(format!("similarity matrix shape: {e}")))?;
        Ok(Self { inner })
    }

    pub fn len(&self) -> usize {
        self.inner.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nrows() == 0
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        if index < self.inner.nrows() {
            Some(self.inner.row(index))
        } else {
            None
        }
    }

    /// Every lookup fails closed unless the matrix covers the whole catalog.
    pub fn matches_catalog(&self, catalog: &Catalog) -> bool {
        self.len() == catalog.len()
    }
}
