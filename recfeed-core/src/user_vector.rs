//! C3 - user vector builder: produces `V_activity` from engagement history,
//! with a cold-start fallback to category interests or `null`.

use crate::catalog::CatalogView;
use crate::config::Config;
use crate::embeddings::{l2_normalize, EmbeddingProvider};
use crate::engagement::{Engagement, EngagementType};
use chrono::{DateTime, Utc};

/// Build `V_activity` for one user.
///
/// Returns `None` (cold start) if there is no history and no category
/// interests, or if every candidate interaction's embedding is unavailable.
///
/// # Errors
///
/// Only the cold-start interest-embedding path can fail, and only if the
/// embedding provider errors; callers are expected to treat that the same
/// way as a `None` result (see `recfeed_core::Error::EmbeddingUnavailable`).
pub async fn build_user_vector(
    engagements: &[Engagement],
    category_interests: &[String],
    catalog: &CatalogView,
    embedder: &dyn EmbeddingProvider,
    now: DateTime<Utc>,
    config: &Config,
) -> Option<Vec<f32>> {
    // Step 1: most recent N_max view/bookmark interactions, deduplicated by
    // episode, keeping the stronger signal (and the newer of two equal-kind
    // duplicates).
    let mut recent: Vec<&Engagement> = engagements
        .iter()
        .filter(|e| matches!(e.kind, EngagementType::View | EngagementType::Bookmark))
        .collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(config.n_max);

    let mut by_episode: std::collections::HashMap<uuid::Uuid, &Engagement> =
        std::collections::HashMap::new();
    for engagement in recent {
        by_episode
            .entry(engagement.episode_id)
            .and_modify(|existing| {
                if engagement.kind.strength() > existing.kind.strength()
                    || (engagement.kind.strength() == existing.kind.strength()
                        && engagement.timestamp > existing.timestamp)
                {
                    *existing = engagement;
                }
            })
            .or_insert(engagement);
    }

    // Step 2: cold start.
    if by_episode.is_empty() {
        if category_interests.is_empty() {
            return None;
        }
        let joined = category_interests.join(", ");
        return match embedder.embed(&joined).await {
            Ok(vector) => Some(l2_normalize(&vector)),
            Err(error) => {
                tracing::warn!(%error, "embedding unavailable for cold-start interests; falling back to null user vector");
                None
            }
        };
    }

    // Steps 3-5: recency-decayed, bookmark-weighted mean of content embeddings.
    let mut weighted_sum = vec![0.0f32; catalog.embedding_dimension()];
    let mut total_weight = 0.0f32;

    for engagement in by_episode.values() {
        let Some(episode) = catalog.get(engagement.episode_id) else {
            continue;
        };
        let days = (now - engagement.timestamp).num_seconds().max(0) as f32 / 86_400.0;
        let w_type = match engagement.kind {
            EngagementType::Bookmark => config.w_bookmark,
            EngagementType::View => config.w_view,
            EngagementType::Dismiss => unreachable!("dismissals filtered out above"),
        };
        let weight = w_type * (-config.lambda_user * days).exp();

        for (sum_component, embedding_component) in weighted_sum.iter_mut().zip(episode.embedding.iter()) {
            *sum_component += weight * embedding_component;
        }
        total_weight += weight;
    }

    if total_weight <= f32::EPSILON {
        if category_interests.is_empty() {
            return None;
        }
        let joined = category_interests.join(", ");
        return match embedder.embed(&joined).await {
            Ok(vector) => Some(l2_normalize(&vector)),
            Err(_) => None,
        };
    }

    let mean: Vec<f32> = weighted_sum.iter().map(|s| s / total_weight).collect();
    Some(l2_normalize(&mean))
}

/// How many distinct, catalog-resolvable view/bookmark interactions would
/// contribute to `V_activity` for this history, under the same recency cap
/// and de-duplication-by-episode rule [`build_user_vector`] applies. Used
/// only to populate the session-creation debug surface; never affects the
/// vector itself.
#[must_use]
pub fn contributing_engagement_count(engagements: &[Engagement], catalog: &CatalogView, config: &Config) -> usize {
    let mut recent: Vec<&Engagement> = engagements
        .iter()
        .filter(|e| matches!(e.kind, EngagementType::View | EngagementType::Bookmark))
        .collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(config.n_max);

    let mut by_episode = std::collections::HashSet::new();
    for engagement in recent {
        if catalog.get(engagement.episode_id).is_some() {
            by_episode.insert(engagement.episode_id);
        }
    }
    by_episode.len()
}
