//! Collaborator contracts consumed by the engine.
//!
//! Hosts own the transport (HTTP, flat files, database; any are
//! conformant). The engine only depends on these traits and treats every
//! failure as "zero candidates from this source"; transport errors never
//! reach ranking logic.

use crate::types::{ExternalMovie, GenreId, MovieId, RatingEvent, UserId};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Poster URL substituted whenever enrichment is absent or fails. A ranking
/// result is valid with placeholder media.
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/200x300?text=No+Poster";

/// Genre and keyword tags for a single movie. "Unavailable" is represented
/// as empty sets, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieMetadata {
    #[serde(default)]
    pub genres: HashSet<GenreId>,
    #[serde(default)]
    pub keywords: HashSet<i64>,
}

impl MovieMetadata {
    /// Combined genre ∪ keyword tag set used for Jaccard similarity.
    pub fn tag_set(&self) -> HashSet<i64> {
        self.genres
            .iter()
            .map(|&g| i64::from(g))
            .chain(self.keywords.iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.keywords.is_empty()
    }
}

/// Per-movie metadata lookup backing [`crate::metadata_based::MetadataSimilarityRanker`].
///
/// The ranker performs one lookup per candidate item; batching and caching
/// are this collaborator's concern, not the engine's.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn metadata(&self, movie_id: MovieId) -> Result<MovieMetadata>;
}

/// Catalog-by-genre queries and the genre-id naming table.
#[async_trait]
pub trait GenreCatalog: Send + Sync {
    /// Ordered candidates for one genre, in the normalized movie shape.
    async fn movies_by_genre(&self, genre: GenreId, limit: usize) -> Result<Vec<ExternalMovie>>;

    /// Genre id → display name, used to resolve a textual genre preference.
    async fn genres(&self) -> Result<HashMap<GenreId, String>>;
}

/// Source of generally popular items for the fallback chain.
#[async_trait]
pub trait PopularitySource: Send + Sync {
    async fn popular(&self, limit: usize) -> Result<Vec<ExternalMovie>>;
}

/// Append-only rating event store. Appends must be atomic at record
/// granularity; that is the store's obligation, assumed here.
#[async_trait]
pub trait RatingHistory: Send + Sync {
    async fn events_for_user(&self, user_id: UserId) -> Result<Vec<RatingEvent>>;

    /// Full history snapshot, used to build the mean-rating fallback model.
    async fn all_events(&self) -> Result<Vec<RatingEvent>>;
}

/// Poster and trailer enrichment, keyed by movie id. Purely presentational.
#[async_trait]
pub trait MediaEnrichment: Send + Sync {
    async fn poster_url(&self, movie_id: MovieId) -> Result<Option<String>>;
    async fn trailer_url(&self, movie_id: MovieId) -> Result<Option<String>>;
}
