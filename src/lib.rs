//! MovieMind recommendation engine
//!
//! Combines three independent signal sources (item-content similarity,
//! predicted user-item affinity, and mood/constraint filtering) into ranked
//! result lists, and keeps producing usable output when any source is
//! partially or fully unavailable. All I/O lives behind the collaborator
//! traits in [`providers`]; the engine holds no state across calls.

pub mod affinity;
pub mod catalog;
pub mod content_based;
pub mod error;
pub mod fallback;
pub mod hybrid;
pub mod metadata_based;
pub mod mood;
pub mod profile;
pub mod providers;
pub mod ranker;
pub mod similarity;
pub mod types;

// Re-export key types
pub use affinity::{select_model, AffinityModel, AffinityPredictor, MeanRatingModel};
pub use catalog::Catalog;
pub use content_based::ContentSimilarityRanker;
pub use error::{EngineError, Result};
pub use fallback::FallbackChain;
pub use hybrid::{HybridBlender, WeightedSource};
pub use metadata_based::MetadataSimilarityRanker;
pub use mood::{MoodFilter, MoodTables, RuntimeWindow};
pub use profile::UserProfileSummary;
pub use providers::{
    GenreCatalog, MediaEnrichment, MetadataLookup, MovieMetadata, PopularitySource, RatingHistory,
    PLACEHOLDER_POSTER,
};
pub use ranker::{RankRequest, Ranker};
pub use similarity::SimilarityMatrix;
pub use types::*;

use std::sync::Arc;
use tracing::{debug, warn};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Result length when the caller asks for 0 (default: 5)
    pub default_limit: usize,
    /// Hard cap on any result length (default: 20)
    pub max_limit: usize,
    /// Content share of the hybrid blend; the collaborative share is its
    /// complement (default: 0.6)
    pub content_weight: f32,
    /// Mood, audience and runtime tables for the mood filter
    pub mood_tables: MoodTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 20,
            content_weight: 0.6,
            mood_tables: MoodTables::default(),
        }
    }
}

/// The external collaborators every engine instance needs. Hosts own the
/// transport; any implementation of these traits is conformant.
#[derive(Clone)]
pub struct Collaborators {
    pub metadata: Arc<dyn MetadataLookup>,
    pub genre_catalog: Arc<dyn GenreCatalog>,
    pub popularity: Arc<dyn PopularitySource>,
    pub rating_history: Arc<dyn RatingHistory>,
}

/// Builder for [`Recommender`]. The similarity matrix, trained affinity
/// model and media enrichment are optional; each absence degrades exactly
/// one source.
pub struct RecommenderBuilder {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    collaborators: Collaborators,
    matrix: Option<SimilarityMatrix>,
    trained_model: Option<Arc<dyn AffinityModel>>,
    enrichment: Option<Arc<dyn MediaEnrichment>>,
}

impl RecommenderBuilder {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a precomputed similarity matrix. A size mismatch against the
    /// catalog disables content ranking for the process instead of failing
    /// the build.
    pub fn with_similarity(mut self, matrix: SimilarityMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Attach a trained rating predictor. Without one, the mean-rating
    /// fallback estimator is built from the rating history at build time.
    pub fn with_affinity_model(mut self, model: Arc<dyn AffinityModel>) -> Self {
        self.trained_model = Some(model);
        self
    }

    pub fn with_enrichment(mut self, enrichment: Arc<dyn MediaEnrichment>) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    pub async fn build(self) -> Recommender {
        let catalog = self.catalog;
        let collaborators = self.collaborators;

        let content = match self.matrix {
            Some(matrix) => {
                match ContentSimilarityRanker::new(Arc::clone(&catalog), Arc::new(matrix)) {
                    Ok(ranker) => Some(Arc::new(ranker)),
                    Err(e) => {
                        warn!(error = %e, "content ranking disabled for the process");
                        None
                    }
                }
            }
            None => {
                debug!("no similarity matrix supplied, content ranking disabled");
                None
            }
        };

        // Strategy selection happens once, here; downstream code never
        // branches on which model is active.
        let model = match self.trained_model {
            Some(model) => model,
            None => {
                let events = match collaborators.rating_history.all_events().await {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(error = %e, "rating history unavailable, fallback estimator starts empty");
                        Vec::new()
                    }
                };
                select_model(None, &events)
            }
        };

        let affinity = Arc::new(AffinityPredictor::new(
            Arc::clone(&catalog),
            model,
            Arc::clone(&collaborators.rating_history),
        ));
        let metadata_ranker = Arc::new(MetadataSimilarityRanker::new(
            Arc::clone(&catalog),
            Arc::clone(&collaborators.metadata),
        ));
        let fallback = FallbackChain::new(Arc::clone(&collaborators.popularity));
        let mood = MoodFilter::new(
            self.config.mood_tables.clone(),
            Arc::clone(&collaborators.genre_catalog),
            fallback.clone(),
        );

        Recommender {
            config: self.config,
            catalog,
            content,
            metadata_ranker,
            affinity,
            mood,
            fallback,
            genre_catalog: collaborators.genre_catalog,
            rating_history: collaborators.rating_history,
            enrichment: self.enrichment,
        }
    }
}

/// Top-level recommendation API. Every method degrades through the fallback
/// chain instead of failing: the only "error" a caller ever observes is an
/// empty result, when the catalog is empty and the popularity collaborator
/// is also unreachable.
pub struct Recommender {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    content: Option<Arc<ContentSimilarityRanker>>,
    metadata_ranker: Arc<MetadataSimilarityRanker>,
    affinity: Arc<AffinityPredictor>,
    mood: MoodFilter,
    fallback: FallbackChain,
    genre_catalog: Arc<dyn GenreCatalog>,
    rating_history: Arc<dyn RatingHistory>,
    enrichment: Option<Arc<dyn MediaEnrichment>>,
}

impl Recommender {
    pub fn builder(catalog: Arc<Catalog>, collaborators: Collaborators) -> RecommenderBuilder {
        RecommenderBuilder {
            config: EngineConfig::default(),
            catalog,
            collaborators,
            matrix: None,
            trained_model: None,
            enrichment: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether content ranking survived the build (matrix present and
    /// aligned with the catalog).
    pub fn content_ranking_available(&self) -> bool {
        self.content.is_some()
    }

    /// Movies most similar to `title` by the precomputed matrix.
    pub async fn similar_to(&self, title: &str, limit: usize) -> Vec<Recommendation> {
        let k = self.clamp(limit);
        let ranked = match &self.content {
            Some(ranker) => match ranker.rank(title, k) {
                Ok(ranked) => ranked,
                Err(e) => {
                    debug!(title, error = %e, "content ranking failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        if ranked.is_empty() {
            return self.popular(k).await;
        }
        self.enrich(ranked).await
    }

    /// Movies most similar to `title` by externally fetched genre+keyword
    /// sets; the path for catalogs without a precomputed matrix.
    pub async fn similar_by_metadata(&self, title: &str, limit: usize) -> Vec<Recommendation> {
        let k = self.clamp(limit);
        let ranked = match self.metadata_ranker.rank(title, k).await {
            Ok(ranked) => ranked,
            Err(e) => {
                debug!(title, error = %e, "metadata ranking failed");
                Vec::new()
            }
        };
        if ranked.is_empty() {
            return self.popular(k).await;
        }
        self.enrich(ranked).await
    }

    /// Top unseen movies for a user by predicted rating.
    pub async fn for_user(&self, user_id: UserId, limit: usize) -> Vec<Recommendation> {
        let k = self.clamp(limit);
        let ranked = match self.affinity.rank_unseen(user_id, k).await {
            Ok(ranked) => ranked,
            Err(e) => {
                debug!(user_id, error = %e, "affinity ranking failed");
                Vec::new()
            }
        };
        if ranked.is_empty() {
            return self.popular(k).await;
        }
        self.enrich(ranked).await
    }

    /// Rank fusion of the content and affinity sources. `content_weight`
    /// defaults to the configured blend; the collaborative weight is its
    /// complement.
    pub async fn hybrid(
        &self,
        title: &str,
        user_id: UserId,
        limit: usize,
        content_weight: Option<f32>,
    ) -> Vec<Recommendation> {
        let k = self.clamp(limit);
        let weight = content_weight
            .unwrap_or(self.config.content_weight)
            .clamp(0.0, 1.0);

        let mut blender = HybridBlender::new(Arc::clone(&self.catalog), self.fallback.clone());
        if let Some(content) = &self.content {
            blender = blender.with_source(Arc::clone(content) as Arc<dyn Ranker>, weight);
        }
        blender = blender.with_source(Arc::clone(&self.affinity) as Arc<dyn Ranker>, 1.0 - weight);

        let request = RankRequest::seeded(title, k).with_user(user_id);
        let blended = blender.rank(&request).await;
        self.enrich(blended).await
    }

    /// Mood-constrained recommendations; falls back to popular items tagged
    /// [`RecommendationType::Popular`] when the profile over-constrains.
    pub async fn by_mood(&self, profile: &MoodProfile, limit: usize) -> Vec<Recommendation> {
        self.mood.recommend(profile, self.clamp(limit)).await
    }

    /// Plain genre browse.
    pub async fn by_genre(&self, genre_id: GenreId, limit: usize) -> Vec<Recommendation> {
        let k = self.clamp(limit);
        let movies = match self.genre_catalog.movies_by_genre(genre_id, k * 2).await {
            Ok(movies) => movies,
            Err(e) => {
                debug!(genre_id, error = %e, "genre browse failed");
                Vec::new()
            }
        };
        if movies.is_empty() {
            return self.popular(k).await;
        }
        movies
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, movie)| Recommendation::from_external(movie, i + 1, RecommendationType::Genre))
            .collect()
    }

    /// Generally popular items; the terminal fallback, may legitimately be
    /// empty.
    pub async fn popular(&self, limit: usize) -> Vec<Recommendation> {
        let k = self.clamp(limit);
        self.fallback
            .popular(k)
            .await
            .into_iter()
            .enumerate()
            .map(|(i, movie)| Recommendation::from_external(movie, i + 1, RecommendationType::Popular))
            .collect()
    }

    /// Rating-history statistics for a user; `None` when the user has no
    /// history or the store is unreachable.
    pub async fn user_profile(&self, user_id: UserId) -> Option<UserProfileSummary> {
        let events = match self.rating_history.events_for_user(user_id).await {
            Ok(events) => events,
            Err(e) => {
                debug!(user_id, error = %e, "rating history unavailable");
                return None;
            }
        };
        UserProfileSummary::build(user_id, &events, self.config.default_limit)
    }

    fn clamp(&self, limit: usize) -> usize {
        if limit == 0 {
            self.config.default_limit
        } else {
            limit.min(self.config.max_limit)
        }
    }

    async fn enrich(&self, ranked: Vec<ScoredMovie>) -> Vec<Recommendation> {
        let mut out = Vec::with_capacity(ranked.len());
        for (i, item) in ranked.into_iter().enumerate() {
            let poster = self.poster_for(item.movie.id).await;
            out.push(Recommendation {
                movie: item.movie,
                poster,
                score: item.score,
                rank: i + 1,
                source: item.source,
            });
        }
        out
    }

    async fn poster_for(&self, movie_id: MovieId) -> String {
        if let Some(enrichment) = &self.enrichment {
            match enrichment.poster_url(movie_id).await {
                Ok(Some(url)) => return url,
                Ok(None) => {}
                Err(e) => debug!(movie_id, error = %e, "poster lookup failed, using placeholder"),
            }
        }
        PLACEHOLDER_POSTER.to_string()
    }
}

#[cfg(test)]
mod tests;
