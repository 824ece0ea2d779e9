//! Shared degradation policy: substitute generally popular items whenever a
//! preferred ranking path yields nothing.

use crate::providers::PopularitySource;
use crate::types::ExternalMovie;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct FallbackChain {
    popularity: Arc<dyn PopularitySource>,
}

impl FallbackChain {
    pub fn new(popularity: Arc<dyn PopularitySource>) -> Self {
        Self { popularity }
    }

    /// Best-effort popular items. A collaborator failure yields an empty
    /// list, which every caller must treat as valid, final output rather
    /// than an error to retry.
    pub async fn popular(&self, k: usize) -> Vec<ExternalMovie> {
        match self.popularity.popular(k).await {
            Ok(movies) => {
                let mut movies = movies;
                movies.truncate(k);
                movies
            }
            Err(e) => {
                debug!(error = %e, "popularity source unreachable, falling back to empty");
                Vec::new()
            }
        }
    }
}
