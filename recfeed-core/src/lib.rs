//! Ranking core for a personalized podcast-episode recommendation feed.
//!
//! The pipeline, end to end: an episode [`catalog`] is validated once at
//! load; a per-user [`user_vector`] is built from engagement history; every
//! gate-passing episode is [`scoring`]-scored; a bounded [`selector`] keeps
//! the top candidates; a diversity-constrained [`reranker`] turns them into
//! an ordered queue; and a [`session`] pool freezes that queue for stable
//! pagination across `load_more` calls.
//!
//! [`RecommenderCore`] wires the pieces together behind the external
//! interface (S1-S4); S5-S7 are trivial reads exposed alongside it.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod embeddings;
pub mod engagement;
pub mod error;
pub mod gate;
pub mod reranker;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod user_vector;

pub use catalog::{CatalogView, Episode, EpisodeRecord, EpisodeView};
pub use config::Config;
pub use embeddings::EmbeddingProvider;
pub use engagement::{Engagement, EngagementLog, EngagementType};
pub use error::{Error, Result};
pub use session::{CreatedSession, LoadMorePage, QueueEntry, SessionDebugInfo, SessionPool, SimilaritySample};

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Constructor-injected orchestrator over a catalog, an embedding provider,
/// and the engagement log and session pool it owns.
///
/// This is the facade an enclosing application talks to; it never exposes
/// the component modules' internals directly.
pub struct RecommenderCore {
    catalog: Arc<CatalogView>,
    embedder: Arc<dyn EmbeddingProvider>,
    engagements: EngagementLog,
    sessions: SessionPool,
}

impl RecommenderCore {
    /// Construct a core over a pre-loaded catalog and embedding provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if `config` fails
    /// [`Config::validate`].
    pub fn new(catalog: CatalogView, embedder: Arc<dyn EmbeddingProvider>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog: Arc::new(catalog),
            embedder,
            engagements: EngagementLog::new(),
            sessions: SessionPool::new(config),
        })
    }

    /// S1. Create a session: build `V_activity`, select candidates, rerank
    /// into a frozen queue, and return its first page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFeed`] if no episode survives the gate, or
    /// [`Error::DeadlineExceeded`] if the work exceeds the configured
    /// deadline.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        category_interests: &[String],
        extra_excluded: &HashSet<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<CreatedSession> {
        let snapshot = self.engagements.snapshot(user_id);
        self.sessions
            .create_session(
                user_id,
                &snapshot,
                category_interests,
                extra_excluded,
                &self.catalog,
                self.embedder.as_ref(),
                now,
            )
            .await
    }

    /// S2. Load the next `n` episodes (default `config.k`) from an existing
    /// session's frozen queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] if the session is unknown or has
    /// expired.
    pub fn load_more(&self, session_id: Uuid, n: usize, now: DateTime<Utc>) -> Result<LoadMorePage> {
        self.sessions.load_more(session_id, n, now)
    }

    /// S3. Append an engagement for `user_id`. Logging only - never mutates
    /// a live session's queue.
    pub fn append_engagement(&self, user_id: Uuid, episode_id: Uuid, kind: EngagementType, timestamp: DateTime<Utc>) {
        self.engagements.append(user_id, episode_id, kind, timestamp);
    }

    /// S4. Clear `user_id`'s engagement log and invalidate their active
    /// sessions.
    pub fn reset_engagements(&self, user_id: Uuid) {
        self.engagements.reset(user_id);
        self.sessions.invalidate_user(user_id);
    }

    /// Equivalent to discarding any session for `user_id` and recomputing
    /// one from the latest engagement snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_session`].
    pub async fn refresh(
        &self,
        user_id: Uuid,
        category_interests: &[String],
        extra_excluded: &HashSet<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<CreatedSession> {
        let snapshot = self.engagements.snapshot(user_id);
        self.sessions
            .refresh(
                user_id,
                &snapshot,
                category_interests,
                extra_excluded,
                &self.catalog,
                self.embedder.as_ref(),
                now,
            )
            .await
    }

    /// S5. Distinct categories across the catalog, in catalog (id) order of
    /// first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for episode in self.catalog.iter_episodes() {
            for category in &episode.categories {
                if seen.insert(category.clone()) {
                    categories.push(category.clone());
                }
            }
        }
        categories
    }

    /// S6. Look up a single episode by id.
    #[must_use]
    pub fn episode(&self, id: Uuid) -> Option<Arc<Episode>> {
        self.catalog.get(id).map(Arc::clone)
    }

    /// S7. Health: catalog size and accumulated data-quality fault count.
    #[must_use]
    pub fn health(&self) -> Health {
        Health {
            catalog_size: self.catalog.len(),
            fault_count: self.catalog.fault_count(),
            live_sessions: self.sessions.len(),
        }
    }
}

/// S7 health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Health {
    pub catalog_size: usize,
    pub fault_count: u64,
    pub live_sessions: usize,
}
