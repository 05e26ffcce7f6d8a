//! C1 - catalog view: read-only access to episodes with derived fields.
//!
//! Episodes arrive as [`EpisodeRecord`]s (the ingestion shape, with the
//! optional/untrusted fields an external collaborator hands us) and are
//! validated once into closed, immutable [`Episode`]s at
//! [`CatalogView::load`]. A record failing any invariant is dropped and
//! counted as a data-quality fault rather than failing the whole load.

use crate::constants::embedding::UNIT_NORM_TOLERANCE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// An entity mention inside an episode's transcript metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub name: String,
    /// Salience of this entity within the episode, 0–4.
    pub relevance: u8,
    pub context: Option<String>,
}

/// A person mention inside an episode's transcript metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMention {
    pub name: String,
    pub relevance: u8,
    pub title: Option<String>,
    pub context: Option<String>,
}

/// Non-consensus classification carried by ingestion, when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConsensusLevel {
    NonConsensus,
    HighlyNonConsensus,
}

/// Binary narrative classification derived from `non_consensus_level`, used
/// only by the reranker's contrarian boost (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pov {
    Consensus,
    Contrarian,
}

/// Untrusted, as-ingested episode shape. Every field an external ingestion
/// pipeline might hand us, before invariant validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: Uuid,
    pub content_id: Option<String>,
    pub published_at: DateTime<Utc>,
    pub series_id: Uuid,
    pub series_name: String,
    pub credibility: Option<u8>,
    pub insight: Option<u8>,
    pub information: Option<u8>,
    pub entertainment: Option<u8>,
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub entities: Vec<EntityMention>,
    pub people: Vec<PersonMention>,
    pub non_consensus_level: Option<NonConsensusLevel>,
    pub embedding: Vec<f32>,
}

/// A validated, immutable episode. Once constructed by [`CatalogView::load`],
/// every quality score is present and in `1..=4`, and the embedding is
/// unit-norm within `1e-5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    pub id: Uuid,
    pub content_id: Option<String>,
    pub published_at: DateTime<Utc>,
    pub series_id: Uuid,
    pub series_name: String,
    pub credibility: u8,
    pub insight: u8,
    pub information: u8,
    pub entertainment: u8,
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub entities: Vec<EntityMention>,
    pub people: Vec<PersonMention>,
    pub non_consensus_level: Option<NonConsensusLevel>,
    pub embedding: Vec<f32>,
}

/// Fields derived per request at recommendation time (§3).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeView {
    pub episode_id: Uuid,
    pub days_old: i64,
    pub primary_topic: Option<String>,
    pub primary_entity: Option<String>,
    pub pov: Pov,
}

impl Episode {
    /// Validate a raw record, consuming it. Returns `Err(reason)` naming the
    /// invariant that failed.
    fn validate(record: EpisodeRecord, embedding_dimension: usize) -> Result<Episode, String> {
        let credibility = record
            .credibility
            .ok_or_else(|| "credibility missing".to_string())?;
        if !(1..=4).contains(&credibility) {
            return Err(format!("credibility {credibility} out of range 1..=4"));
        }
        let insight = record.insight.ok_or_else(|| "insight missing".to_string())?;
        if !(1..=4).contains(&insight) {
            return Err(format!("insight {insight} out of range 1..=4"));
        }
        let information = record.information.unwrap_or(insight).clamp(1, 4);
        let entertainment = record.entertainment.unwrap_or(insight).clamp(1, 4);

        if record.embedding.len() != embedding_dimension {
            return Err(format!(
                "embedding dimension {} != catalog dimension {embedding_dimension}",
                record.embedding.len()
            ));
        }
        let norm: f32 = record.embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
            return Err(format!("embedding not unit-norm (||v|| = {norm})"));
        }

        Ok(Episode {
            id: record.id,
            content_id: record.content_id,
            published_at: record.published_at,
            series_id: record.series_id,
            series_name: record.series_name,
            credibility,
            insight,
            information,
            entertainment,
            categories: record.categories,
            subcategories: record.subcategories,
            entities: record.entities,
            people: record.people,
            non_consensus_level: record.non_consensus_level,
            embedding: record.embedding,
        })
    }

    /// Project the derived fields of §3 for a recommendation happening `now`.
    #[must_use]
    pub fn view(&self, now: DateTime<Utc>) -> EpisodeView {
        let days_old = (now - self.published_at).num_days().max(0);
        let primary_topic = self.categories.first().cloned();
        let primary_entity = self
            .entities
            .iter()
            .enumerate()
            .max_by_key(|(idx, e)| (e.relevance, std::cmp::Reverse(*idx)))
            .map(|(_, e)| e.name.clone());
        let pov = match self.non_consensus_level {
            Some(_) => Pov::Contrarian,
            None => Pov::Consensus,
        };
        EpisodeView {
            episode_id: self.id,
            days_old,
            primary_topic,
            primary_entity,
            pov,
        }
    }
}

/// Read-only, deterministically-ordered view over a validated catalog.
///
/// Iteration order is by episode id, so downstream tie-breaks (candidate
/// selection, reranking) are reproducible for identical inputs (Q5).
pub struct CatalogView {
    episodes: BTreeMap<Uuid, Arc<Episode>>,
    fault_count: AtomicU64,
    embedding_dimension: usize,
}

impl CatalogView {
    /// Validate and load a batch of raw records. Records failing an
    /// invariant are dropped and logged as a data-quality fault, never
    /// failing the whole load.
    #[must_use]
    pub fn load(records: Vec<EpisodeRecord>, embedding_dimension: usize) -> Self {
        let mut episodes = BTreeMap::new();
        let mut faults = 0u64;
        for record in records {
            let id = record.id;
            match Episode::validate(record, embedding_dimension) {
                Ok(episode) => {
                    episodes.insert(id, Arc::new(episode));
                }
                Err(reason) => {
                    faults += 1;
                    tracing::warn!(episode_id = %id, %reason, "data-quality fault at catalog load");
                }
            }
        }
        Self {
            episodes,
            fault_count: AtomicU64::new(faults),
            embedding_dimension,
        }
    }

    /// Number of data-quality faults encountered at load (monotonic).
    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.fault_count.load(Ordering::Relaxed)
    }

    /// Deterministically ordered (by id) iterator over every valid episode.
    pub fn iter_episodes(&self) -> impl Iterator<Item = &Arc<Episode>> {
        self.episodes.values()
    }

    /// Look up a single episode by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Arc<Episode>> {
        self.episodes.get(&id)
    }

    /// Number of valid episodes in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// The fixed embedding dimension this catalog was loaded with.
    #[must_use]
    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dimension
    }
}
