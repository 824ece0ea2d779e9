//! Predicted user-item affinity ranking.
//!
//! `AffinityModel` is one capability with two implementations selected once
//! at load time: a host-supplied trained predictor, or the mean-rating
//! fallback built from historical events. Downstream code never branches on
//! which one is active.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::providers::RatingHistory;
use crate::ranker::{RankRequest, Ranker};
use crate::types::{MovieId, RatingEvent, RecommendationType, ScoredMovie, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Predicted rating when an item has no history at all.
pub const DEFAULT_PREDICTED_RATING: f32 = 3.5;

/// Rating predictor capability. Implementations must return a finite score
/// for any (user, item) pair, including ids they have never seen.
pub trait AffinityModel: Send + Sync {
    fn predict(&self, user_id: UserId, movie_id: MovieId) -> anyhow::Result<f32>;
}

/// Degraded-mode estimator: per-item mean rating over all users who rated
/// that item, with a fixed default for items without history.
///
/// Ignores `user_id` entirely: this is a popularity/quality proxy, not
/// personalization, and callers must not assume personalization happened
/// just because a model is present.
#[derive(Debug, Clone)]
pub struct MeanRatingModel {
    item_means: HashMap<MovieId, f32>,
    default: f32,
}

impl MeanRatingModel {
    pub fn from_events(events: &[RatingEvent]) -> Self {
        let mut sums: HashMap<MovieId, (f32, u32)> = HashMap::new();
        for event in events {
            let entry = sums.entry(event.movie_id).or_insert((0.0, 0));
            entry.0 += f32::from(event.rating);
            entry.1 += 1;
        }
        let item_means = sums
            .into_iter()
            .map(|(movie_id, (sum, count))| (movie_id, sum / count as f32))
            .collect();
        Self {
            item_means,
            default: DEFAULT_PREDICTED_RATING,
        }
    }

    pub fn with_default(mut self, default: f32) -> Self {
        self.default = default;
        self
    }
}

impl AffinityModel for MeanRatingModel {
    fn predict(&self, _user_id: UserId, movie_id: MovieId) -> anyhow::Result<f32> {
        Ok(self
            .item_means
            .get(&movie_id)
            .copied()
            .unwrap_or(self.default))
    }
}

/// Ranks unseen catalog items for a user by predicted score.
pub struct AffinityPredictor {
    catalog: Arc<Catalog>,
    model: Arc<dyn AffinityModel>,
    history: Arc<dyn RatingHistory>,
}

impl AffinityPredictor {
    pub fn new(
        catalog: Arc<Catalog>,
        model: Arc<dyn AffinityModel>,
        history: Arc<dyn RatingHistory>,
    ) -> Self {
        Self {
            catalog,
            model,
            history,
        }
    }

    /// Top-k catalog items by predicted score, excluding items the user has
    /// already rated. The rated set is re-scanned on each call; acceptable
    /// at this scale. Unknown users are not an error; they score exactly
    /// like users with no history.
    pub async fn rank_unseen(&self, user_id: UserId, k: usize) -> Result<Vec<ScoredMovie>> {
        let rated = self.rated_set(user_id).await;

        let mut scored: Vec<(usize, ScoredMovie)> = Vec::new();
        for (row, movie) in self.catalog.iter().enumerate() {
            if rated.contains(&movie.id) {
                continue;
            }
            // A model failure on one item must not abort the whole ranking.
            match self.model.predict(user_id, movie.id) {
                Ok(score) if score.is_finite() => {
                    scored.push((
                        row,
                        ScoredMovie::new(movie.clone(), score, RecommendationType::Collaborative),
                    ));
                }
                Ok(score) => {
                    debug!(
                        movie_id = movie.id,
                        score = f64::from(score),
                        "non-finite prediction, skipping item"
                    );
                }
                Err(e) => {
                    debug!(movie_id = movie.id, error = %e, "prediction failed, skipping item");
                }
            }
        }

        scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
        Ok(scored.into_iter().take(k).map(|(_, s)| s).collect())
    }

    async fn rated_set(&self, user_id: UserId) -> HashSet<MovieId> {
        match self.history.events_for_user(user_id).await {
            Ok(events) => events.into_iter().map(|e| e.movie_id).collect(),
            Err(e) => {
                debug!(user_id, error = %e, "rating history unavailable, treating as empty");
                HashSet::new()
            }
        }
    }
}

/// Strategy selection, done once at load: the trained model when the host
/// supplies one, otherwise the mean-rating fallback built from history.
pub fn select_model(
    trained: Option<Arc<dyn AffinityModel>>,
    events: &[RatingEvent],
) -> Arc<dyn AffinityModel> {
    match trained {
        Some(model) => model,
        None => {
            debug!(
                events = events.len(),
                "no trained affinity model, using mean-rating fallback"
            );
            Arc::new(MeanRatingModel::from_events(events))
        }
    }
}

#[async_trait]
impl Ranker for AffinityPredictor {
    fn source(&self) -> RecommendationType {
        RecommendationType::Collaborative
    }

    async fn rank(&self, request: &RankRequest) -> Result<Vec<ScoredMovie>> {
        let user_id = request.user_id.ok_or_else(|| {
            crate::error::EngineError::unavailable("affinity ranking requires a user id")
        })?;
        self.rank_unseen(user_id, request.limit).await
    }
}
