//! Shared ranking-source capability.
//!
//! Every signal source answers the same request shape with an ordered
//! candidate list, so the hybrid blender composes arbitrary sources
//! uniformly. Dispatch is by trait object, never by string key.

use crate::error::Result;
use crate::types::{RecommendationType, ScoredMovie, UserId};
use async_trait::async_trait;

/// One ranking request. Sources read the fields they need: content rankers
/// require a seed title, the affinity predictor requires a user id.
#[derive(Debug, Clone, Default)]
pub struct RankRequest {
    pub seed_title: Option<String>,
    pub user_id: Option<UserId>,
    pub limit: usize,
}

impl RankRequest {
    pub fn seeded(title: impl Into<String>, limit: usize) -> Self {
        Self {
            seed_title: Some(title.into()),
            user_id: None,
            limit,
        }
    }

    pub fn for_user(user_id: UserId, limit: usize) -> Self {
        Self {
            seed_title: None,
            user_id: Some(user_id),
            limit,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[async_trait]
pub trait Ranker: Send + Sync {
    /// Tag stamped on candidates this source produces.
    fn source(&self) -> RecommendationType;

    /// Ordered candidates, best first. Fails with `NotFound` or
    /// `RankerUnavailable`; callers degrade a failed source to empty output.
    async fn rank(&self, request: &RankRequest) -> Result<Vec<ScoredMovie>>;
}
