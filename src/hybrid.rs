//! Positional rank fusion across independent ranking sources.
//!
//! The source score scales are not comparable (similarity in roughly
//! [-1, 1], predicted rating in [1, 5]), so fusion aggregates rank
//! positions, never raw scores: in a list of length L the item at position
//! p (0-based) contributes `weight * (L - p) / L`.

use crate::catalog::Catalog;
use crate::fallback::FallbackChain;
use crate::ranker::{RankRequest, Ranker};
use crate::types::{MovieId, RecommendationType, ScoredMovie};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Candidates requested from each source per result slot.
const CANDIDATE_MULTIPLIER: usize = 2;

pub struct WeightedSource {
    pub ranker: Arc<dyn Ranker>,
    pub weight: f32,
}

pub struct HybridBlender {
    catalog: Arc<Catalog>,
    sources: Vec<WeightedSource>,
    fallback: FallbackChain,
}

impl HybridBlender {
    pub fn new(catalog: Arc<Catalog>, fallback: FallbackChain) -> Self {
        Self {
            catalog,
            sources: Vec::new(),
            fallback,
        }
    }

    pub fn with_source(mut self, ranker: Arc<dyn Ranker>, weight: f32) -> Self {
        self.sources.push(WeightedSource { ranker, weight });
        self
    }

    /// Fused top-k list. Each source may fail independently and contribute
    /// an empty list; a short or empty union is backfilled item-by-item from
    /// the fallback chain. This method never fails.
    pub async fn rank(&self, request: &RankRequest) -> Vec<ScoredMovie> {
        let k = request.limit;
        let candidate_request = RankRequest {
            limit: k * CANDIDATE_MULTIPLIER,
            ..request.clone()
        };

        let mut fused: HashMap<MovieId, ScoredMovie> = HashMap::new();
        for source in &self.sources {
            let candidates = match source.ranker.rank(&candidate_request).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    debug!(source = ?source.ranker.source(), error = %e, "source degraded to empty");
                    Vec::new()
                }
            };

            let len = candidates.len();
            for (position, candidate) in candidates.into_iter().enumerate() {
                let positional = source.weight * (len - position) as f32 / len as f32;
                fused
                    .entry(candidate.movie.id)
                    .and_modify(|existing| existing.score += positional)
                    .or_insert(ScoredMovie::new(
                        candidate.movie,
                        positional,
                        RecommendationType::Hybrid,
                    ));
            }
        }

        let mut blended: Vec<ScoredMovie> = fused
            .into_values()
            .filter(|candidate| !self.is_query(request, &candidate.movie.title))
            .collect();
        blended.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(self.catalog_order(a.movie.id).cmp(&self.catalog_order(b.movie.id)))
                .then(a.movie.id.cmp(&b.movie.id))
        });
        blended.truncate(k);

        if blended.len() < k {
            self.backfill(request, k, &mut blended).await;
        }
        blended
    }

    /// Item-level substitution: top up a short result from the next-best
    /// fallback candidates instead of failing the whole request.
    async fn backfill(&self, request: &RankRequest, k: usize, blended: &mut Vec<ScoredMovie>) {
        let popular = self.fallback.popular(k).await;
        for external in popular {
            if blended.len() >= k {
                break;
            }
            let (movie, _poster) = external.into_parts();
            let duplicate = blended.iter().any(|s| s.movie.id == movie.id)
                || self.is_query(request, &movie.title);
            if !duplicate {
                blended.push(ScoredMovie::new(movie, 0.0, RecommendationType::Popular));
            }
        }
    }

    fn is_query(&self, request: &RankRequest, title: &str) -> bool {
        request
            .seed_title
            .as_deref()
            .is_some_and(|seed| seed.eq_ignore_ascii_case(title))
    }

    fn catalog_order(&self, movie_id: MovieId) -> usize {
        self.catalog.row_index(movie_id).unwrap_or(usize::MAX)
    }
}
