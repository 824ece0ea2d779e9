//! Core data types shared across the recommendation engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type MovieId = i64;
pub type UserId = i64;
pub type GenreId = i32;

/// Column defaults applied when the catalog source omits a field.
pub const DEFAULT_RUNTIME_MINUTES: u32 = 120;
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Default release date for rows that carry none: 2000-01-01.
pub fn default_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// A movie as the engine sees it: normalized, immutable for process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub genres: HashSet<GenreId>,
    pub runtime_minutes: u32,
    pub release_date: NaiveDate,
    /// Aggregate rating on a 0-10 scale.
    pub rating: f32,
    pub description: String,
}

/// A raw row from the catalog source. Missing columns are filled with the
/// documented defaults at load time rather than failing the load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub genres: HashSet<GenreId>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CatalogRow {
    pub fn into_record(self) -> MovieRecord {
        MovieRecord {
            id: self.id,
            title: self.title,
            genres: self.genres,
            runtime_minutes: self.runtime_minutes.unwrap_or(DEFAULT_RUNTIME_MINUTES),
            release_date: self.release_date.unwrap_or_else(default_release_date),
            rating: self.rating.unwrap_or(0.0),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        }
    }
}

/// A movie in the normalized shape external collaborators return
/// (genre browse, popularity source). Partial payloads deserialize with
/// defaults instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalMovie {
    #[serde(default)]
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genres: HashSet<GenreId>,
}

impl ExternalMovie {
    /// Normalize into the record shape used everywhere else. The poster is
    /// returned separately; it is presentational and never required for
    /// ranking correctness.
    pub fn into_parts(self) -> (MovieRecord, Option<String>) {
        let record = MovieRecord {
            id: self.id,
            title: self.title,
            genres: self.genres,
            runtime_minutes: self.runtime.unwrap_or(DEFAULT_RUNTIME_MINUTES),
            release_date: self.release_date.unwrap_or_else(default_release_date),
            rating: self.rating.unwrap_or(0.0),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        };
        (record, self.poster)
    }

    pub fn runtime_or_default(&self) -> u32 {
        self.runtime.unwrap_or(DEFAULT_RUNTIME_MINUTES)
    }
}

/// A single rating submission. The history is append-only; one user may rate
/// the same movie more than once, and the latest event is authoritative for
/// profile statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// 1-5 stars.
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// User mood, one of eight values mapped to genre sets by [`crate::mood::MoodTables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Relaxed,
    Scared,
    Romantic,
    Adventurous,
    Thoughtful,
}

/// Self-reported energy level. Carried in the profile but drives no
/// filtering; see DESIGN.md.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    High,
    #[default]
    Medium,
    Low,
}

/// Viewing audience, used for the family-safe and mature-content genre
/// adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchingWith {
    #[default]
    Alone,
    Friends,
    Family,
    Partner,
    Kids,
}

/// How much time the user has, resolved to a runtime window by
/// [`crate::mood::MoodTables`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeAvailable {
    Short,
    #[default]
    Medium,
    Long,
}

/// Structured request context for mood-based recommendations. Constructed
/// per request; every field is optional and absent fields take the defaults
/// above, so the filtering logic never sees a null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodProfile {
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub energy: Energy,
    #[serde(default)]
    pub watching_with: WatchingWith,
    #[serde(default)]
    pub time_available: TimeAvailable,
    /// A genre name; when it resolves to a known genre it replaces the mood
    /// mapping entirely.
    #[serde(default)]
    pub genre_preference: Option<String>,
    /// Keyword terms matched case-insensitively against descriptions.
    #[serde(default)]
    pub avoid_content: Vec<String>,
}

/// Which signal source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    ContentBased,
    MetadataBased,
    Collaborative,
    Hybrid,
    Mood,
    /// Plain genre browse, no mood constraints applied.
    Genre,
    /// Generic popularity fallback. On mood results this tag is the explicit
    /// note that the item is not mood-matched.
    Popular,
}

/// A ranked candidate inside the engine, before enrichment.
#[derive(Debug, Clone)]
pub struct ScoredMovie {
    pub movie: MovieRecord,
    pub score: f32,
    pub source: RecommendationType,
}

impl ScoredMovie {
    pub fn new(movie: MovieRecord, score: f32, source: RecommendationType) -> Self {
        Self {
            movie,
            score,
            source,
        }
    }
}

/// A final, displayable recommendation. Order is the contract: no duplicate
/// movie ids, length at most the requested limit, ties broken by catalog
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub movie: MovieRecord,
    pub poster: String,
    /// Display score; scale depends on the source (similarity, predicted
    /// rating, or catalog rating).
    pub score: f32,
    /// 1-based position in the result list.
    pub rank: usize,
    pub source: RecommendationType,
}

impl Recommendation {
    /// Normalize a collaborator-shaped movie into a displayable
    /// recommendation, with the catalog rating as display score and the
    /// placeholder poster when none is supplied.
    pub fn from_external(external: ExternalMovie, rank: usize, source: RecommendationType) -> Self {
        let (movie, poster) = external.into_parts();
        let score = movie.rating;
        Self {
            movie,
            poster: poster.unwrap_or_else(|| crate::providers::PLACEHOLDER_POSTER.to_string()),
            score,
            rank,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_row_defaults() {
        let row = CatalogRow {
            id: 42,
            title: "Stalker".to_string(),
            ..Default::default()
        };
        let record = row.into_record();

        assert_eq!(record.runtime_minutes, 120);
        assert_eq!(record.rating, 0.0);
        assert_eq!(record.description, "No description available");
        assert_eq!(record.release_date, default_release_date());
        assert!(record.genres.is_empty());
    }

    #[test]
    fn test_external_movie_partial_payload_normalizes() {
        // A popularity source that only knows id and title must still
        // normalize cleanly.
        let movie: ExternalMovie =
            serde_json::from_str(r#"{"id": 7, "title": "Alien"}"#).expect("partial payload");
        let (record, poster) = movie.into_parts();

        assert_eq!(record.id, 7);
        assert_eq!(record.runtime_minutes, DEFAULT_RUNTIME_MINUTES);
        assert!(poster.is_none());
    }

    #[test]
    fn test_mood_profile_defaults() {
        let profile = MoodProfile::default();
        assert!(profile.mood.is_none());
        assert_eq!(profile.energy, Energy::Medium);
        assert_eq!(profile.watching_with, WatchingWith::Alone);
        assert_eq!(profile.time_available, TimeAvailable::Medium);
        assert!(profile.avoid_content.is_empty());
    }

    #[test]
    fn test_mood_deserializes_lowercase() {
        let mood: Mood = serde_json::from_str(r#""adventurous""#).expect("mood");
        assert_eq!(mood, Mood::Adventurous);
    }
}
