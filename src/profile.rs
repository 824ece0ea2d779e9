//! Rating-history statistics for a single user.

use crate::types::{MovieId, RatingEvent, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary of a user's rating history. When a user rated the same movie more
/// than once, the latest event is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileSummary {
    pub user_id: UserId,
    pub total_reviews: usize,
    pub average_rating: f32,
    /// Highest-rated movie ids, best first.
    pub top_rated: Vec<MovieId>,
    /// Most recently rated movie ids, newest first.
    pub most_recent: Vec<MovieId>,
    /// Star value → number of movies currently rated at that value.
    pub rating_distribution: HashMap<u8, usize>,
}

impl UserProfileSummary {
    /// Build from this user's events. Returns `None` for an empty history.
    pub fn build(user_id: UserId, events: &[RatingEvent], limit: usize) -> Option<Self> {
        // Collapse to the latest event per movie.
        let mut latest: HashMap<MovieId, &RatingEvent> = HashMap::new();
        for event in events.iter().filter(|e| e.user_id == user_id) {
            match latest.get(&event.movie_id) {
                Some(existing) if existing.timestamp >= event.timestamp => {}
                _ => {
                    latest.insert(event.movie_id, event);
                }
            }
        }
        if latest.is_empty() {
            return None;
        }

        let mut events: Vec<&RatingEvent> = latest.into_values().collect();
        let total_reviews = events.len();
        let average_rating =
            events.iter().map(|e| f32::from(e.rating)).sum::<f32>() / total_reviews as f32;

        let mut rating_distribution: HashMap<u8, usize> = HashMap::new();
        for event in &events {
            *rating_distribution.entry(event.rating).or_insert(0) += 1;
        }

        events.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then(b.timestamp.cmp(&a.timestamp))
                .then(a.movie_id.cmp(&b.movie_id))
        });
        let top_rated = events.iter().take(limit).map(|e| e.movie_id).collect();

        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.movie_id.cmp(&b.movie_id)));
        let most_recent = events.iter().take(limit).map(|e| e.movie_id).collect();

        Some(Self {
            user_id,
            total_reviews,
            average_rating,
            top_rated,
            most_recent,
            rating_distribution,
        })
    }
}
