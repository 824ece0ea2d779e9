//! Facade-level tests: builder degradation, fallback policy and the
//! empty-catalog contract.

use super::support::{
    catalog_of, external, rating, FailingPopularity, InMemoryHistory, StaticMetadata,
    StaticPopularity, StaticPosters,
};
use crate::similarity::SimilarityMatrix;
use crate::types::{MoodProfile, MovieId, RecommendationType};
use crate::{Catalog, Collaborators, Recommender};
use std::collections::HashMap;
use std::sync::Arc;

fn collaborators_with_popular(popular: Vec<crate::types::ExternalMovie>) -> Collaborators {
    Collaborators {
        popularity: Arc::new(StaticPopularity(popular)),
        ..super::support::collaborators()
    }
}

fn three_by_three() -> SimilarityMatrix {
    SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.8, 0.2],
        vec![0.8, 1.0, 0.4],
        vec![0.2, 0.4, 1.0],
    ])
    .expect("matrix")
}

#[tokio::test]
async fn test_similar_to_end_to_end() {
    let catalog = catalog_of(&[(1, "A"), (2, "B"), (3, "C")]);
    let posters = StaticPosters(HashMap::from([(2, "https://img.example/b.jpg".to_string())]));
    let engine = Recommender::builder(catalog, super::support::collaborators())
        .with_similarity(three_by_three())
        .with_enrichment(Arc::new(posters))
        .build()
        .await;

    let results = engine.similar_to("A", 2).await;
    let ids: Vec<MovieId> = results.iter().map(|r| r.movie.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[1].rank, 2);
    assert_eq!(results[0].poster, "https://img.example/b.jpg");
    // Movie 3 has no poster record; the placeholder stands in.
    assert_eq!(results[1].poster, crate::PLACEHOLDER_POSTER);
}

#[tokio::test]
async fn test_mismatched_matrix_disables_content_ranking() {
    let catalog = catalog_of(&[(1, "A"), (2, "B")]);
    let popular = vec![external(9, "Popular", 100, "liked")];
    let engine = Recommender::builder(catalog, collaborators_with_popular(popular))
        .with_similarity(three_by_three())
        .build()
        .await;

    assert!(!engine.content_ranking_available());
    // Content requests degrade straight to the popularity fallback.
    let results = engine.similar_to("A", 2).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, RecommendationType::Popular);
}

#[tokio::test]
async fn test_unknown_title_falls_back_to_popular() {
    let catalog = catalog_of(&[(1, "A"), (2, "B"), (3, "C")]);
    let popular = vec![external(9, "Popular", 100, "liked")];
    let engine = Recommender::builder(catalog, collaborators_with_popular(popular))
        .with_similarity(three_by_three())
        .build()
        .await;

    let results = engine.similar_to("Nope", 2).await;
    assert_eq!(results[0].movie.title, "Popular");
}

#[tokio::test]
async fn test_empty_catalog_and_dead_popularity_yield_empty_results() {
    // The one condition allowed to surface: everything unavailable returns
    // an empty list, never an error, so hosts render a uniform
    // "no recommendations" state.
    let collaborators = Collaborators {
        popularity: Arc::new(FailingPopularity),
        ..super::support::collaborators()
    };
    let engine = Recommender::builder(Arc::new(Catalog::empty()), collaborators)
        .build()
        .await;

    assert!(engine.similar_to("A", 5).await.is_empty());
    assert!(engine.similar_by_metadata("A", 5).await.is_empty());
    assert!(engine.for_user(1, 5).await.is_empty());
    assert!(engine.hybrid("A", 1, 5, None).await.is_empty());
    assert!(engine.by_mood(&MoodProfile::default(), 5).await.is_empty());
    assert!(engine.by_genre(35, 5).await.is_empty());
    assert!(engine.popular(5).await.is_empty());
}

#[tokio::test]
async fn test_hybrid_uses_configured_weight_and_is_idempotent() {
    let catalog = catalog_of(&[(1, "A"), (2, "B"), (3, "C")]);
    let history = InMemoryHistory(vec![rating(5, 2, 5), rating(6, 3, 3)]);
    let collaborators = Collaborators {
        rating_history: Arc::new(history),
        ..super::support::collaborators()
    };
    let engine = Recommender::builder(catalog, collaborators)
        .with_similarity(three_by_three())
        .build()
        .await;

    let first = engine.hybrid("A", 5, 3, None).await;
    let second = engine.hybrid("A", 5, 3, None).await;
    assert!(!first.is_empty());
    let ids = |r: &[crate::types::Recommendation]| {
        r.iter().map(|x| x.movie.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert!(first.iter().all(|r| r.movie.title != "A"));
}

#[tokio::test]
async fn test_for_user_uses_mean_rating_fallback_model() {
    // No trained model supplied: the build falls back to the mean-rating
    // estimator over history. User 1 rated movie 1; movies 2 and 3 rank by
    // their means (movie 3: 5.0, movie 2: default 3.5).
    let catalog = catalog_of(&[(1, "A"), (2, "B"), (3, "C")]);
    let history = InMemoryHistory(vec![rating(1, 1, 4), rating(2, 3, 5)]);
    let collaborators = Collaborators {
        rating_history: Arc::new(history),
        ..super::support::collaborators()
    };
    let engine = Recommender::builder(catalog, collaborators).build().await;

    let results = engine.for_user(1, 5).await;
    let ids: Vec<MovieId> = results.iter().map(|r| r.movie.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(results[0].score, 5.0);
    assert_eq!(results[1].score, 3.5);
}

#[tokio::test]
async fn test_by_genre_browse_and_fallback() {
    let genre_catalog = super::support::StaticGenreCatalog {
        by_genre: HashMap::from([(35, vec![external(1, "Laughs", 95, "fun")])]),
        names: HashMap::new(),
    };
    let collaborators = Collaborators {
        genre_catalog: Arc::new(genre_catalog),
        popularity: Arc::new(StaticPopularity(vec![external(9, "Popular", 100, "liked")])),
        ..super::support::collaborators()
    };
    let engine = Recommender::builder(catalog_of(&[]), collaborators).build().await;

    let browse = engine.by_genre(35, 5).await;
    assert_eq!(browse[0].movie.title, "Laughs");
    assert_eq!(browse[0].source, RecommendationType::Genre);

    // An unknown genre yields nothing and degrades to popular items.
    let empty_genre = engine.by_genre(99, 5).await;
    assert_eq!(empty_genre[0].source, RecommendationType::Popular);
}

#[tokio::test]
async fn test_user_profile_roundtrip() {
    let history = InMemoryHistory(vec![rating(1, 10, 5), rating(1, 11, 3)]);
    let collaborators = Collaborators {
        rating_history: Arc::new(history),
        ..super::support::collaborators()
    };
    let engine = Recommender::builder(catalog_of(&[]), collaborators).build().await;

    let profile = engine.user_profile(1).await.expect("profile");
    assert_eq!(profile.total_reviews, 2);
    assert_eq!(profile.top_rated[0], 10);

    assert!(engine.user_profile(42).await.is_none());
}

#[tokio::test]
async fn test_limit_zero_uses_default_and_large_limits_clamp() {
    let popular: Vec<_> = (0..40)
        .map(|i| external(i, &format!("Movie {i}"), 100, "fine"))
        .collect();
    let engine = Recommender::builder(catalog_of(&[]), collaborators_with_popular(popular))
        .build()
        .await;

    assert_eq!(engine.popular(0).await.len(), 5);
    assert_eq!(engine.popular(1000).await.len(), 20);
}

#[tokio::test]
async fn test_metadata_path_when_no_matrix_exists() {
    let catalog = catalog_of(&[(1, "Seed"), (2, "Near"), (3, "Far")]);
    let metadata = StaticMetadata(HashMap::from([
        (1, crate::MovieMetadata { genres: [18].into_iter().collect(), keywords: Default::default() }),
        (2, crate::MovieMetadata { genres: [18].into_iter().collect(), keywords: Default::default() }),
    ]));
    let collaborators = Collaborators {
        metadata: Arc::new(metadata),
        ..super::support::collaborators()
    };
    let engine = Recommender::builder(catalog, collaborators).build().await;

    let results = engine.similar_by_metadata("Seed", 2).await;
    let ids: Vec<MovieId> = results.iter().map(|r| r.movie.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(results[0].source, RecommendationType::MetadataBased);
}
