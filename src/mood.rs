//! Mood and constraint filtering over catalog-by-genre queries.
//!
//! A request resolves to a genre set, an audience adjustment and a runtime
//! window, then runs a linear scan with early termination over per-genre
//! candidate fetches. Constraint precedence: an explicit genre preference
//! replaces the mood mapping; the kids allow-list intersects (never to
//! empty); the family block-list subtracts (emptying is acceptable).

use crate::fallback::FallbackChain;
use crate::providers::GenreCatalog;
use crate::types::{
    ExternalMovie, GenreId, Mood, MoodProfile, Recommendation, RecommendationType, TimeAvailable,
    WatchingWith,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Common genre ids, as used by the movie-metadata provider.
pub mod genres {
    use crate::types::GenreId;

    pub const ACTION: GenreId = 28;
    pub const ADVENTURE: GenreId = 12;
    pub const ANIMATION: GenreId = 16;
    pub const COMEDY: GenreId = 35;
    pub const CRIME: GenreId = 80;
    pub const DOCUMENTARY: GenreId = 99;
    pub const DRAMA: GenreId = 18;
    pub const FAMILY: GenreId = 10751;
    pub const FANTASY: GenreId = 14;
    pub const HISTORY: GenreId = 36;
    pub const HORROR: GenreId = 27;
    pub const MUSIC: GenreId = 10402;
    pub const MYSTERY: GenreId = 9648;
    pub const ROMANCE: GenreId = 10749;
    pub const SCIENCE_FICTION: GenreId = 878;
    pub const THRILLER: GenreId = 53;
}

/// Inclusive runtime window in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeWindow {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl RuntimeWindow {
    pub const fn new(min_minutes: u32, max_minutes: u32) -> Self {
        Self {
            min_minutes,
            max_minutes,
        }
    }

    pub fn contains(&self, runtime_minutes: u32) -> bool {
        self.min_minutes <= runtime_minutes && runtime_minutes <= self.max_minutes
    }
}

/// Process-wide constant tables injected into the filter at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodTables {
    mood_genres: HashMap<Mood, Vec<GenreId>>,
    /// Genre set when no mood is given and no preference resolves.
    default_genres: Vec<GenreId>,
    /// Family-safe allow-list applied when watching with kids.
    family_safe: Vec<GenreId>,
    /// Mature-content block-list subtracted when watching with family.
    mature_block: Vec<GenreId>,
    short_window: RuntimeWindow,
    medium_window: RuntimeWindow,
    long_window: RuntimeWindow,
}

impl Default for MoodTables {
    fn default() -> Self {
        use self::genres::*;
        let mood_genres = HashMap::from([
            (Mood::Happy, vec![COMEDY, FAMILY, ANIMATION, MUSIC]),
            (Mood::Sad, vec![DRAMA, ROMANCE, MUSIC, DOCUMENTARY]),
            (Mood::Excited, vec![ACTION, ADVENTURE, SCIENCE_FICTION, THRILLER]),
            (Mood::Relaxed, vec![DOCUMENTARY, HISTORY, FANTASY, FAMILY]),
            (Mood::Scared, vec![HORROR, THRILLER, MYSTERY, ACTION]),
            (Mood::Romantic, vec![ROMANCE, DRAMA, COMEDY, MUSIC]),
            (Mood::Adventurous, vec![ADVENTURE, ACTION, FANTASY, SCIENCE_FICTION]),
            (Mood::Thoughtful, vec![DRAMA, DOCUMENTARY, HISTORY, CRIME]),
        ]);
        Self {
            mood_genres,
            default_genres: vec![DRAMA],
            family_safe: vec![ANIMATION, FAMILY],
            mature_block: vec![HORROR, THRILLER, CRIME],
            short_window: RuntimeWindow::new(60, 90),
            medium_window: RuntimeWindow::new(90, 120),
            long_window: RuntimeWindow::new(120, 200),
        }
    }
}

impl MoodTables {
    pub fn genres_for(&self, mood: Option<Mood>) -> Vec<GenreId> {
        mood.and_then(|m| self.mood_genres.get(&m).cloned())
            .unwrap_or_else(|| self.default_genres.clone())
    }

    pub fn window_for(&self, time_available: TimeAvailable) -> RuntimeWindow {
        match time_available {
            TimeAvailable::Short => self.short_window,
            TimeAvailable::Medium => self.medium_window,
            TimeAvailable::Long => self.long_window,
        }
    }

    /// Audience adjustment. Kids intersect with the allow-list and fall back
    /// to the allow-list itself when the intersection is empty, never to an
    /// empty set. Family only subtracts; emptying there is acceptable.
    pub fn adjust_for_audience(
        &self,
        genre_ids: Vec<GenreId>,
        watching_with: WatchingWith,
    ) -> Vec<GenreId> {
        match watching_with {
            WatchingWith::Kids => {
                let allowed: Vec<GenreId> = genre_ids
                    .into_iter()
                    .filter(|g| self.family_safe.contains(g))
                    .collect();
                if allowed.is_empty() {
                    self.family_safe.clone()
                } else {
                    allowed
                }
            }
            WatchingWith::Family => genre_ids
                .into_iter()
                .filter(|g| !self.mature_block.contains(g))
                .collect(),
            _ => genre_ids,
        }
    }
}

pub struct MoodFilter {
    tables: MoodTables,
    genre_catalog: Arc<dyn GenreCatalog>,
    fallback: FallbackChain,
}

impl MoodFilter {
    pub fn new(
        tables: MoodTables,
        genre_catalog: Arc<dyn GenreCatalog>,
        fallback: FallbackChain,
    ) -> Self {
        Self {
            tables,
            genre_catalog,
            fallback,
        }
    }

    pub fn tables(&self) -> &MoodTables {
        &self.tables
    }

    /// Up to k recommendations matching the profile. Never fails: an
    /// over-constrained profile or degraded collaborator terminates in the
    /// popularity fallback, whose items are tagged
    /// [`RecommendationType::Popular`] to mark them as not mood-matched.
    pub async fn recommend(&self, profile: &MoodProfile, k: usize) -> Vec<Recommendation> {
        let genre_ids = self.resolve_genres(profile).await;
        let window = self.tables.window_for(profile.time_available);
        debug!(?genre_ids, ?window, "mood query resolved");

        let mut accepted: Vec<Recommendation> = Vec::new();
        let per_genre = (k / genre_ids.len().max(1)).max(1);

        for &genre_id in &genre_ids {
            if accepted.len() >= k {
                break;
            }
            let candidates = match self
                .genre_catalog
                .movies_by_genre(genre_id, per_genre + 5)
                .await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    debug!(genre_id, error = %e, "genre fetch failed, skipping genre");
                    continue;
                }
            };

            for candidate in candidates {
                if accepted.len() >= k {
                    break;
                }
                if self.accepts(&candidate, profile, window, &accepted) {
                    accepted.push(Recommendation::from_external(
                        candidate,
                        accepted.len() + 1,
                        RecommendationType::Mood,
                    ));
                }
            }
        }

        if accepted.is_empty() {
            debug!("no mood-matched candidates, falling back to popular items");
            return self.popular_fallback(k).await;
        }
        accepted
    }

    /// Genre resolution order: an explicit preference naming a known genre
    /// replaces the mood mapping entirely; an unknown name falls back to the
    /// mood table; then the audience adjustment applies.
    async fn resolve_genres(&self, profile: &MoodProfile) -> Vec<GenreId> {
        let preferred = match profile.genre_preference.as_deref() {
            Some(name) if !name.is_empty() => self.lookup_genre_id(name).await,
            _ => None,
        };
        let genre_ids = match preferred {
            Some(id) => vec![id],
            None => self.tables.genres_for(profile.mood),
        };
        self.tables
            .adjust_for_audience(genre_ids, profile.watching_with)
    }

    async fn lookup_genre_id(&self, name: &str) -> Option<GenreId> {
        match self.genre_catalog.genres().await {
            Ok(known) => known
                .into_iter()
                .find(|(_, genre_name)| genre_name.eq_ignore_ascii_case(name))
                .map(|(id, _)| id),
            Err(e) => {
                debug!(error = %e, "genre list unavailable, ignoring genre preference");
                None
            }
        }
    }

    fn accepts(
        &self,
        candidate: &ExternalMovie,
        profile: &MoodProfile,
        window: RuntimeWindow,
        accepted: &[Recommendation],
    ) -> bool {
        // Dedupe by exact title across the whole result, not just within
        // this genre.
        if accepted.iter().any(|r| r.movie.title == candidate.title) {
            return false;
        }
        if !window.contains(candidate.runtime_or_default()) {
            return false;
        }
        // Conservative keyword filter, case-insensitive substring match on
        // the description. Deliberately crude.
        let description = candidate
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        !profile
            .avoid_content
            .iter()
            .any(|term| !term.is_empty() && description.contains(&term.to_lowercase()))
    }

    async fn popular_fallback(&self, k: usize) -> Vec<Recommendation> {
        self.fallback
            .popular(k)
            .await
            .into_iter()
            .enumerate()
            .map(|(i, movie)| Recommendation::from_external(movie, i + 1, RecommendationType::Popular))
            .collect()
    }
}
