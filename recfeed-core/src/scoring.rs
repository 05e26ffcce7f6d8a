//! C5 - scorer: combines similarity, quality, and freshness into a single
//! `BaseScore` per episode, before any reranking adjustments.

use crate::catalog::Episode;
use crate::config::Config;
use crate::embeddings::cosine_similarity;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The three component scores plus their weighted aggregate, returned
/// together for observability (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub base_score: f32,
    pub s_sim: f32,
    pub s_alpha: f32,
    pub s_fresh: f32,
}

/// Score one episode against an optional user vector.
///
/// `user_vector` is `None` for cold-start users (`S_sim` is the neutral
/// `0.5`), matching the resolved cold-start formulation (see design notes).
#[must_use]
pub fn score(episode: &Episode, user_vector: Option<&[f32]>, now: DateTime<Utc>, config: &Config) -> Score {
    let s_sim = match user_vector {
        Some(v) => cosine_similarity(v, &episode.embedding).max(0.0),
        None => 0.5,
    };

    let s_alpha =
        (config.w_insight * f32::from(episode.insight) + config.w_cred * f32::from(episode.credibility)) / 4.0;

    let days_old = (now - episode.published_at).num_days().max(0) as f32;
    let s_fresh = (-config.lambda_fresh * days_old).exp().max(config.floor_fresh);

    let base_score = config.w_sim * s_sim + config.w_alpha * s_alpha + config.w_fresh * s_fresh;

    Score {
        base_score,
        s_sim,
        s_alpha,
        s_fresh,
    }
}
