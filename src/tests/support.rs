//! In-memory collaborator fakes and fixtures shared by the engine tests.

use crate::catalog::Catalog;
use crate::providers::{
    GenreCatalog, MediaEnrichment, MetadataLookup, MovieMetadata, PopularitySource, RatingHistory,
};
use crate::ranker::{RankRequest, Ranker};
use crate::types::{
    default_release_date, ExternalMovie, GenreId, MovieId, MovieRecord, RatingEvent,
    RecommendationType, ScoredMovie, UserId,
};
use crate::Collaborators;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub fn movie(id: MovieId, title: &str) -> MovieRecord {
    MovieRecord {
        id,
        title: title.to_string(),
        genres: HashSet::new(),
        runtime_minutes: 110,
        release_date: default_release_date(),
        rating: 7.0,
        description: format!("{title} description"),
    }
}

pub fn catalog_of(titles: &[(MovieId, &str)]) -> Arc<Catalog> {
    Arc::new(Catalog::from_records(
        titles.iter().map(|&(id, title)| movie(id, title)).collect(),
    ))
}

pub fn external(id: MovieId, title: &str, runtime: u32, description: &str) -> ExternalMovie {
    ExternalMovie {
        id,
        title: title.to_string(),
        poster: Some(format!("https://img.example/{id}.jpg")),
        rating: Some(7.5),
        description: Some(description.to_string()),
        runtime: Some(runtime),
        release_date: None,
        genres: HashSet::new(),
    }
}

pub fn rating(user_id: UserId, movie_id: MovieId, rating: u8) -> RatingEvent {
    RatingEvent {
        user_id,
        movie_id,
        rating,
        review: None,
        timestamp: Utc::now(),
    }
}

#[derive(Default)]
pub struct StaticMetadata(pub HashMap<MovieId, MovieMetadata>);

#[async_trait]
impl MetadataLookup for StaticMetadata {
    async fn metadata(&self, movie_id: MovieId) -> Result<MovieMetadata> {
        self.0
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| anyhow!("no metadata for movie {movie_id}"))
    }
}

#[derive(Default)]
pub struct StaticGenreCatalog {
    pub by_genre: HashMap<GenreId, Vec<ExternalMovie>>,
    pub names: HashMap<GenreId, String>,
}

#[async_trait]
impl GenreCatalog for StaticGenreCatalog {
    async fn movies_by_genre(&self, genre: GenreId, limit: usize) -> Result<Vec<ExternalMovie>> {
        Ok(self
            .by_genre
            .get(&genre)
            .map(|movies| movies.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn genres(&self) -> Result<HashMap<GenreId, String>> {
        Ok(self.names.clone())
    }
}

pub struct FailingGenreCatalog;

#[async_trait]
impl GenreCatalog for FailingGenreCatalog {
    async fn movies_by_genre(&self, _genre: GenreId, _limit: usize) -> Result<Vec<ExternalMovie>> {
        Err(anyhow!("genre service unreachable"))
    }

    async fn genres(&self) -> Result<HashMap<GenreId, String>> {
        Err(anyhow!("genre service unreachable"))
    }
}

pub struct StaticPopularity(pub Vec<ExternalMovie>);

#[async_trait]
impl PopularitySource for StaticPopularity {
    async fn popular(&self, limit: usize) -> Result<Vec<ExternalMovie>> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

pub struct FailingPopularity;

#[async_trait]
impl PopularitySource for FailingPopularity {
    async fn popular(&self, _limit: usize) -> Result<Vec<ExternalMovie>> {
        Err(anyhow!("popularity service unreachable"))
    }
}

#[derive(Default)]
pub struct InMemoryHistory(pub Vec<RatingEvent>);

#[async_trait]
impl RatingHistory for InMemoryHistory {
    async fn events_for_user(&self, user_id: UserId) -> Result<Vec<RatingEvent>> {
        Ok(self
            .0
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn all_events(&self) -> Result<Vec<RatingEvent>> {
        Ok(self.0.clone())
    }
}

pub struct FailingHistory;

#[async_trait]
impl RatingHistory for FailingHistory {
    async fn events_for_user(&self, _user_id: UserId) -> Result<Vec<RatingEvent>> {
        Err(anyhow!("rating store unreachable"))
    }

    async fn all_events(&self) -> Result<Vec<RatingEvent>> {
        Err(anyhow!("rating store unreachable"))
    }
}

pub struct StaticPosters(pub HashMap<MovieId, String>);

#[async_trait]
impl MediaEnrichment for StaticPosters {
    async fn poster_url(&self, movie_id: MovieId) -> Result<Option<String>> {
        Ok(self.0.get(&movie_id).cloned())
    }

    async fn trailer_url(&self, _movie_id: MovieId) -> Result<Option<String>> {
        Ok(None)
    }
}

/// A ranking source with a fixed, pre-ordered candidate list.
pub struct StaticRanker {
    pub candidates: Vec<ScoredMovie>,
    pub tag: RecommendationType,
}

impl StaticRanker {
    pub fn new(tag: RecommendationType, movies: Vec<(MovieRecord, f32)>) -> Self {
        Self {
            candidates: movies
                .into_iter()
                .map(|(movie, score)| ScoredMovie::new(movie, score, tag))
                .collect(),
            tag,
        }
    }
}

#[async_trait]
impl Ranker for StaticRanker {
    fn source(&self) -> RecommendationType {
        self.tag
    }

    async fn rank(&self, request: &RankRequest) -> crate::error::Result<Vec<ScoredMovie>> {
        Ok(self
            .candidates
            .iter()
            .take(request.limit)
            .cloned()
            .collect())
    }
}

/// Collaborators wired to benign empty-ish fakes; tests override the pieces
/// they exercise.
pub fn collaborators() -> Collaborators {
    Collaborators {
        metadata: Arc::new(StaticMetadata::default()),
        genre_catalog: Arc::new(StaticGenreCatalog::default()),
        popularity: Arc::new(StaticPopularity(Vec::new())),
        rating_history: Arc::new(InMemoryHistory::default()),
    }
}
