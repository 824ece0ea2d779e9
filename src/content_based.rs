//! Content-based ranking over the precomputed similarity matrix.
//!
//! Purely in-memory, O(n log n) per request, no external calls.

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::ranker::{RankRequest, Ranker};
use crate::similarity::SimilarityMatrix;
use crate::types::{RecommendationType, ScoredMovie};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ContentSimilarityRanker {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
}

impl ContentSimilarityRanker {
    /// Fails with `RankerUnavailable` when the matrix does not cover the
    /// whole catalog; a misaligned matrix would silently rank wrong movies.
    pub fn new(catalog: Arc<Catalog>, matrix: Arc<SimilarityMatrix>) -> Result<Self> {
        if !matrix.matches_catalog(&catalog) {
            return Err(EngineError::unavailable(format!(
                "similarity matrix has {} rows, catalog has {} movies",
                matrix.len(),
                catalog.len()
            )));
        }
        Ok(Self { catalog, matrix })
    }

    /// The k movies most similar to `movie_title`, excluding the movie
    /// itself. Descending score, ties broken by ascending catalog row.
    pub fn rank(&self, movie_title: &str, k: usize) -> Result<Vec<ScoredMovie>> {
        let query_row = self.catalog.title_row(movie_title)?;
        let row = self.matrix.row(query_row).ok_or_else(|| {
            EngineError::unavailable(format!(
                "row {query_row} exceeds similarity matrix bounds ({})",
                self.matrix.len()
            ))
        })?;

        let mut scored: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        // Drop the query row explicitly: scores are not guaranteed strictly
        // maximal at the diagonal, so it cannot be assumed to sort first.
        Ok(scored
            .into_iter()
            .filter(|&(row_index, _)| row_index != query_row)
            .take(k)
            .filter_map(|(row_index, score)| {
                self.catalog.get(row_index).map(|movie| {
                    ScoredMovie::new(movie.clone(), score, RecommendationType::ContentBased)
                })
            })
            .collect())
    }
}

#[async_trait]
impl Ranker for ContentSimilarityRanker {
    fn source(&self) -> RecommendationType {
        RecommendationType::ContentBased
    }

    async fn rank(&self, request: &RankRequest) -> Result<Vec<ScoredMovie>> {
        let title = request
            .seed_title
            .as_deref()
            .ok_or_else(|| EngineError::unavailable("content ranking requires a seed title"))?;
        ContentSimilarityRanker::rank(self, title, request.limit)
    }
}
