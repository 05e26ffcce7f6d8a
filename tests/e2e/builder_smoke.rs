//! Smoke tests for the `test-utils` fixtures themselves, driven through
//! `RecommenderCore` - a quick sanity check that `EpisodeBuilder` and
//! `synthetic_catalog` produce catalogs the core actually accepts and ranks,
//! so the shared builders stay honest as the core's data model evolves.

use recfeed_core::config::Config;
use recfeed_core::embeddings::EmbeddingProvider;
use recfeed_core::RecommenderCore;
use std::collections::HashSet;
use std::sync::Arc;
use test_utils::{fake_embedder, synthetic_catalog, view_history, EpisodeBuilder};
use uuid::Uuid;

#[tokio::test]
async fn synthetic_catalog_round_trips_through_a_session() {
    let now = chrono::Utc::now();
    let catalog = synthetic_catalog(30, 16);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(fake_embedder(16));
    let core = RecommenderCore::new(catalog, embedder, Config::default()).unwrap();

    let created = core
        .create_session(Uuid::new_v4(), &[], &HashSet::new(), now)
        .await
        .unwrap();
    assert!(created.cold_start);
    assert_eq!(created.first_page.len(), Config::default().k);
}

#[tokio::test]
async fn view_history_builds_a_non_cold_start_user_vector() {
    let now = chrono::Utc::now();
    let dim = 8;
    let records: Vec<_> = (0..20)
        .map(|i| {
            let mut embedding = vec![0.0; dim];
            embedding[i % dim] = 1.0;
            EpisodeBuilder::new(dim).embedding(embedding).build()
        })
        .collect();
    let viewed_ids: Vec<Uuid> = records.iter().take(5).map(|r| r.id).collect();
    let catalog = recfeed_core::catalog::CatalogView::load(records, dim);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(fake_embedder(dim));
    let core = RecommenderCore::new(catalog, embedder, Config::default()).unwrap();

    let user_id = Uuid::new_v4();
    for engagement in view_history(&viewed_ids, now) {
        core.append_engagement(user_id, engagement.episode_id, engagement.kind, engagement.timestamp);
    }

    let created = core
        .create_session(user_id, &[], &HashSet::new(), now)
        .await
        .unwrap();
    assert!(!created.cold_start);
}
