//! C8 - session pool: a frozen, pre-ranked queue per session with a
//! monotonic cursor, so pagination never re-runs scoring or reranking.
//!
//! Sessions are reaped lazily on access past their idle timeout (spec
//! §4.8), not by a background sweep - a pattern this core borrows from the
//! query cache it's grounded on.

use crate::catalog::CatalogView;
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::engagement::{excluded_ids, Engagement};
use crate::error::{Error, Result};
use crate::reranker::rerank;
use crate::scoring::Score;
use crate::selector::{select_candidates, Candidate};
use crate::user_vector::{build_user_vector, contributing_engagement_count};
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// One scored, queue-position-stamped episode as handed back across the
/// external interface (S1/S2).
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub episode_id: Uuid,
    pub score: Score,
    pub queue_position: usize,
}

/// A frozen, ranked queue plus the cursor tracking how much of it has been
/// shown.
struct Session {
    user_id: Uuid,
    queue: Vec<Candidate>,
    cursor: usize,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    cold_start: bool,
}

/// Diagnostic snapshot attached to [`CreatedSession`]: how many candidates
/// survived the gate, how much of the user's history fed `V_activity`, and a
/// handful of the strongest similarity matches. Never consumed by ranking
/// itself - purely an observability aid for callers debugging a feed.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDebugInfo {
    pub candidates_considered: usize,
    pub contributing_engagements: usize,
    pub top_similarity_samples: Vec<SimilaritySample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilaritySample {
    pub episode_id: Uuid,
    pub s_sim: f32,
}

/// Output of [`SessionPool::create_session`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
    pub first_page: Vec<QueueEntry>,
    pub total_in_queue: usize,
    pub shown_count: usize,
    pub remaining_count: usize,
    pub cold_start: bool,
    pub debug: SessionDebugInfo,
}

/// Output of [`SessionPool::load_more`].
#[derive(Debug, Clone, Serialize)]
pub struct LoadMorePage {
    pub episodes: Vec<QueueEntry>,
    pub shown_count: usize,
    pub remaining_count: usize,
}

/// Owns every live session, keyed by session id. Sessions beyond
/// `config.max_sessions` are LRU-evicted; sessions idle past
/// `config.session_timeout` are reaped the next time they're accessed.
pub struct SessionPool {
    sessions: Mutex<LruCache<Uuid, Arc<Mutex<Session>>>>,
    config: Config,
}

impl SessionPool {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.max_sessions.max(1)).expect("max(1) is never zero");
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            config,
        }
    }

    /// Build `V_activity`, select candidates, rerank the full pool into one
    /// coherent queue, and store it under a fresh session id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFeed`] if no episode survives the gate.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_session(
        &self,
        user_id: Uuid,
        engagements: &[Engagement],
        category_interests: &[String],
        extra_excluded: &HashSet<Uuid>,
        catalog: &CatalogView,
        embedder: &dyn EmbeddingProvider,
        now: DateTime<Utc>,
    ) -> Result<CreatedSession> {
        let deadline = self.config.create_session_deadline;
        let build = self.build_queue(
            user_id,
            engagements,
            category_interests,
            extra_excluded,
            catalog,
            embedder,
            now,
        );

        let (queue, cold_start, debug) = tokio::time::timeout(deadline, build)
            .await
            .map_err(|_| Error::DeadlineExceeded(deadline))??;

        if queue.is_empty() {
            return Err(Error::EmptyFeed(user_id.to_string()));
        }

        let session_id = Uuid::new_v4();
        let k = self.config.k;
        let total_in_queue = queue.len();
        let first_page_len = k.min(total_in_queue);
        let first_page = page_entries(&queue, 0, first_page_len);
        let shown_count = first_page.len();

        let session = Session {
            user_id,
            queue,
            cursor: first_page_len,
            created_at: now,
            last_accessed_at: now,
            cold_start,
        };

        self.sessions
            .lock()
            .put(session_id, Arc::new(Mutex::new(session)));

        Ok(CreatedSession {
            session_id,
            first_page,
            total_in_queue,
            shown_count,
            remaining_count: total_in_queue - shown_count,
            cold_start,
            debug,
        })
    }

    async fn build_queue(
        &self,
        user_id: Uuid,
        engagements: &[Engagement],
        category_interests: &[String],
        extra_excluded: &HashSet<Uuid>,
        catalog: &CatalogView,
        embedder: &dyn EmbeddingProvider,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Candidate>, bool, SessionDebugInfo)> {
        let _ = user_id;
        let user_vector = build_user_vector(engagements, category_interests, catalog, embedder, now, &self.config).await;
        let cold_start = user_vector.is_none();
        let contributing_engagements = contributing_engagement_count(engagements, catalog, &self.config);

        let mut excluded = excluded_ids(engagements);
        excluded.extend(extra_excluded.iter().copied());

        let candidates = select_candidates(catalog, user_vector.as_deref(), &excluded, now, &self.config);

        let mut by_similarity: Vec<&Candidate> = candidates.iter().collect();
        by_similarity.sort_by(|a, b| b.score.s_sim.partial_cmp(&a.score.s_sim).unwrap_or(std::cmp::Ordering::Equal));
        let top_similarity_samples = by_similarity
            .into_iter()
            .take(5)
            .map(|c| SimilaritySample { episode_id: c.episode.id, s_sim: c.score.s_sim })
            .collect();

        let debug = SessionDebugInfo {
            candidates_considered: candidates.len(),
            contributing_engagements,
            top_similarity_samples,
        };

        let queue = rerank(&candidates, self.config.n_candidates, now, &self.config);
        Ok((queue, cold_start, debug))
    }

    /// Advance `session_id`'s cursor by `n` (default `config.k`) and return
    /// the next page. Idempotent: calling this twice without an intervening
    /// call does not skip episodes, and repeated calls past the end of the
    /// queue return progressively shorter (possibly empty) pages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] if the session is unknown or has
    /// expired.
    pub fn load_more(&self, session_id: Uuid, n: usize, now: DateTime<Utc>) -> Result<LoadMorePage> {
        let session_arc = self.get_live_session(session_id, now)?;
        let mut session = session_arc.lock();
        session.last_accessed_at = now;

        let start = session.cursor;
        let end = (start + n).min(session.queue.len());
        let episodes = page_entries(&session.queue, start, end - start);
        session.cursor = end;

        Ok(LoadMorePage {
            episodes,
            shown_count: session.cursor,
            remaining_count: session.queue.len() - session.cursor,
        })
    }

    /// Discard any session for `user_id` and compute a fresh queue from the
    /// latest engagement snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_session`].
    #[allow(clippy::too_many_arguments)]
    pub async fn refresh(
        &self,
        user_id: Uuid,
        engagements: &[Engagement],
        category_interests: &[String],
        extra_excluded: &HashSet<Uuid>,
        catalog: &CatalogView,
        embedder: &dyn EmbeddingProvider,
        now: DateTime<Utc>,
    ) -> Result<CreatedSession> {
        self.invalidate_user(user_id);
        self.create_session(
            user_id,
            engagements,
            category_interests,
            extra_excluded,
            catalog,
            embedder,
            now,
        )
        .await
    }

    /// Remove every live session belonging to `user_id` (spec S4 reset).
    pub fn invalidate_user(&self, user_id: Uuid) {
        let mut sessions = self.sessions.lock();
        let stale: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, s)| s.lock().user_id == user_id)
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            sessions.pop(&id);
        }
    }

    fn get_live_session(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.lock();
        let Some(session_arc) = sessions.get(&session_id).cloned() else {
            return Err(Error::SessionNotFound(session_id));
        };
        let expired = {
            let session = session_arc.lock();
            now.signed_duration_since(session.last_accessed_at).to_std().unwrap_or_default()
                > self.config.session_timeout
        };
        if expired {
            sessions.pop(&session_id);
            return Err(Error::SessionNotFound(session_id));
        }
        Ok(session_arc)
    }

    /// Number of sessions currently resident (test/diagnostic helper).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

fn page_entries(queue: &[Candidate], start: usize, len: usize) -> Vec<QueueEntry> {
    queue[start..start + len]
        .iter()
        .enumerate()
        .map(|(offset, candidate)| QueueEntry {
            episode_id: candidate.episode.id,
            score: candidate.score,
            queue_position: start + offset,
        })
        .collect()
}
