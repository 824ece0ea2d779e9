//! Metadata-based ranking for catalogs without a precomputed matrix.
//!
//! Scores every other catalog item by Jaccard similarity of externally
//! fetched genre+keyword sets. This performs one collaborator lookup per
//! candidate, so callers must assume O(n) external calls; the engine is only
//! responsible for correct aggregation of whatever comes back.

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::providers::{MetadataLookup, MovieMetadata};
use crate::ranker::{RankRequest, Ranker};
use crate::types::{MovieId, RecommendationType, ScoredMovie};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub struct MetadataSimilarityRanker {
    catalog: Arc<Catalog>,
    metadata: Arc<dyn MetadataLookup>,
}

impl MetadataSimilarityRanker {
    pub fn new(catalog: Arc<Catalog>, metadata: Arc<dyn MetadataLookup>) -> Self {
        Self { catalog, metadata }
    }

    /// The k catalog movies with the highest tag-set overlap with
    /// `movie_title`. Per-item metadata failures count as empty sets, not
    /// errors.
    pub async fn rank(&self, movie_title: &str, k: usize) -> Result<Vec<ScoredMovie>> {
        let query = self.catalog.by_title(movie_title)?.clone();
        let target_tags = self.fetch_tags(query.id).await;

        let mut scored: Vec<(usize, ScoredMovie)> = Vec::new();
        for (row, movie) in self.catalog.iter().enumerate() {
            if movie.id == query.id {
                continue;
            }
            let tags = self.fetch_tags(movie.id).await;
            let score = jaccard(&target_tags, &tags);
            scored.push((
                row,
                ScoredMovie::new(movie.clone(), score, RecommendationType::MetadataBased),
            ));
        }

        scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
        Ok(scored.into_iter().take(k).map(|(_, s)| s).collect())
    }

    async fn fetch_tags(&self, movie_id: MovieId) -> HashSet<i64> {
        match self.metadata.metadata(movie_id).await {
            Ok(meta) => meta.tag_set(),
            Err(e) => {
                debug!(movie_id, error = %e, "metadata unavailable, treating as empty tag set");
                MovieMetadata::default().tag_set()
            }
        }
    }
}

/// |A∩B| / |A∪B|, with 0.0 when both sets are empty (by convention, not
/// undefined).
pub fn jaccard(a: &HashSet<i64>, b: &HashSet<i64>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

#[async_trait]
impl Ranker for MetadataSimilarityRanker {
    fn source(&self) -> RecommendationType {
        RecommendationType::MetadataBased
    }

    async fn rank(&self, request: &RankRequest) -> Result<Vec<ScoredMovie>> {
        let title = request
            .seed_title
            .as_deref()
            .ok_or_else(|| EngineError::unavailable("metadata ranking requires a seed title"))?;
        MetadataSimilarityRanker::rank(self, title, request.limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard_overlap() {
        let a: HashSet<i64> = [28, 12, 878].into_iter().collect();
        let b: HashSet<i64> = [28, 53].into_iter().collect();
        // intersection 1, union 4
        assert!((jaccard(&a, &b) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_jaccard_identical_sets() {
        let a: HashSet<i64> = [35, 10751].into_iter().collect();
        assert_eq!(jaccard(&a, &a.clone()), 1.0);
    }

    #[test]
    fn test_jaccard_both_empty_is_zero() {
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_jaccard_one_empty_is_zero() {
        let a: HashSet<i64> = [18].into_iter().collect();
        assert_eq!(jaccard(&a, &HashSet::new()), 0.0);
    }
}
