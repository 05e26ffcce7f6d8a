//! Shared fixtures for exercising `recfeed-core` in tests: synthetic
//! catalogs, engagement histories, and a deterministic embedding provider.

use chrono::{DateTime, Duration, Utc};
use recfeed_core::catalog::{CatalogView, EntityMention, EpisodeRecord, NonConsensusLevel};
use recfeed_core::embeddings::{l2_normalize, FakeEmbeddingProvider};
use recfeed_core::engagement::{Engagement, EngagementType};
use uuid::Uuid;

/// Builder for a single synthetic [`EpisodeRecord`], with sensible defaults
/// for every field a test doesn't care about.
pub struct EpisodeBuilder {
    record: EpisodeRecord,
}

impl EpisodeBuilder {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            record: EpisodeRecord {
                id: Uuid::new_v4(),
                content_id: None,
                published_at: Utc::now() - Duration::days(1),
                series_id: Uuid::new_v4(),
                series_name: "Synthetic Series".to_string(),
                credibility: Some(3),
                insight: Some(3),
                information: Some(3),
                entertainment: Some(2),
                categories: vec!["general".to_string()],
                subcategories: vec![],
                entities: vec![],
                people: vec![],
                non_consensus_level: None,
                embedding: l2_normalize(&vec![1.0; dim]),
            },
        }
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.record.id = id;
        self
    }

    #[must_use]
    pub fn published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.record.published_at = published_at;
        self
    }

    #[must_use]
    pub fn days_old(mut self, days: i64) -> Self {
        self.record.published_at = Utc::now() - Duration::days(days);
        self
    }

    #[must_use]
    pub fn series(mut self, series_id: Uuid) -> Self {
        self.record.series_id = series_id;
        self
    }

    #[must_use]
    pub fn quality(mut self, credibility: u8, insight: u8) -> Self {
        self.record.credibility = Some(credibility);
        self.record.insight = Some(insight);
        self
    }

    #[must_use]
    pub fn categories(mut self, categories: Vec<&str>) -> Self {
        self.record.categories = categories.into_iter().map(str::to_string).collect();
        self
    }

    #[must_use]
    pub fn entity(mut self, name: &str, relevance: u8) -> Self {
        self.record.entities.push(EntityMention {
            name: name.to_string(),
            relevance,
            context: None,
        });
        self
    }

    #[must_use]
    pub fn contrarian(mut self) -> Self {
        self.record.non_consensus_level = Some(NonConsensusLevel::NonConsensus);
        self
    }

    #[must_use]
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.record.embedding = embedding;
        self
    }

    #[must_use]
    pub fn build(self) -> EpisodeRecord {
        self.record
    }
}

/// A catalog of `n` episodes with distinct embeddings spread across `dim`
/// axes, otherwise gate-passing defaults.
#[must_use]
pub fn synthetic_catalog(n: usize, dim: usize) -> CatalogView {
    let records: Vec<EpisodeRecord> = (0..n)
        .map(|i| {
            let mut embedding = vec![0.0; dim];
            embedding[i % dim] = 1.0;
            EpisodeBuilder::new(dim).embedding(embedding).build()
        })
        .collect();
    CatalogView::load(records, dim)
}

/// A deterministic provider that always reports `dim`-dimensional vectors.
#[must_use]
pub fn fake_embedder(dim: usize) -> FakeEmbeddingProvider {
    FakeEmbeddingProvider::new(dim)
}

/// A reverse-chronological sequence of `view` engagements on `episode_ids`,
/// spaced one day apart starting from `now`.
#[must_use]
pub fn view_history(episode_ids: &[Uuid], now: DateTime<Utc>) -> Vec<Engagement> {
    episode_ids
        .iter()
        .enumerate()
        .map(|(i, &episode_id)| Engagement {
            episode_id,
            kind: EngagementType::View,
            timestamp: now - Duration::days(i as i64),
        })
        .collect()
}
