//! Explicit, immutable configuration for the recommendation core.
//!
//! Every tunable named in spec §6 lives here. A `Config` is constructed once
//! at startup (or per test) and passed by reference through the call graph -
//! no implicit global state. [`Config::validate`] enforces the invariants
//! that must hold for *any* valid configuration (weights summing to 1,
//! thresholds within their documented ranges); a violation is always fatal
//! at startup, never at request time.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Full tunable surface for the ranking pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- C4 quality gate ---
    /// Minimum `credibility + insight` required to pass gate 2.
    pub ci_min: u8,

    // --- C3 user vector builder ---
    /// Weight applied to a `bookmark` interaction.
    pub w_bookmark: f32,
    /// Weight applied to a `view` interaction (fixed at 1.0 per spec, kept
    /// explicit for symmetry with `w_bookmark`).
    pub w_view: f32,
    /// Recency decay rate for user-vector interactions.
    pub lambda_user: f32,
    /// Maximum number of recent view/bookmark interactions considered.
    pub n_max: usize,

    // --- C5 scorer ---
    /// Recency decay rate for freshness scoring.
    pub lambda_fresh: f32,
    /// Floor applied to the freshness score.
    pub floor_fresh: f32,
    /// Weight of `S_sim` in `BaseScore`.
    pub w_sim: f32,
    /// Weight of `S_alpha` in `BaseScore`.
    pub w_alpha: f32,
    /// Weight of `S_fresh` in `BaseScore`.
    pub w_fresh: f32,
    /// Weight of `insight` within `S_alpha`.
    pub w_insight: f32,
    /// Weight of `credibility` within `S_alpha`.
    pub w_cred: f32,

    // --- C6 candidate selector ---
    /// Size of the bounded top-K candidate pool.
    pub n_candidates: usize,

    // --- C7 reranker ---
    /// Hard cap on episodes per series in one queue.
    pub series_cap: u32,
    /// Multiplicative penalty for repeating the previous episode's primary entity.
    pub adjacency_penalty: f32,
    /// Number of prior selections from a topic before it saturates.
    pub topic_threshold: u32,
    /// Multiplicative penalty once a topic has saturated.
    pub topic_penalty: f32,
    /// Number of prior selections from an entity before it saturates.
    pub entity_threshold: u32,
    /// Multiplicative penalty once an entity has saturated.
    pub entity_penalty: f32,
    /// Multiplicative boost for a contrarian episode following a consensus one.
    pub contrarian_boost: f32,
    /// Desired page size.
    pub k: usize,

    // --- C8 session pool ---
    /// Idle timeout after which a session is eligible for reaping.
    pub session_timeout: Duration,
    /// Maximum number of sessions retained by the pool (LRU-evicted beyond this).
    pub max_sessions: usize,
    /// Deadline for a single `create_session` call.
    pub create_session_deadline: Duration,

    /// Dimensionality of catalog/query embeddings (constant across the catalog).
    pub embedding_dimension: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ci_min: gate::CI_MIN_DEFAULT,

            w_bookmark: user_vector::W_BOOKMARK_DEFAULT,
            w_view: user_vector::W_VIEW,
            lambda_user: user_vector::LAMBDA_USER_DEFAULT,
            n_max: user_vector::N_MAX_DEFAULT,

            lambda_fresh: scoring::LAMBDA_FRESH_DEFAULT,
            floor_fresh: scoring::FLOOR_FRESH_DEFAULT,
            w_sim: scoring::W_SIM_DEFAULT,
            w_alpha: scoring::W_ALPHA_WEIGHT_DEFAULT,
            w_fresh: scoring::W_FRESH_DEFAULT,
            w_insight: scoring::W_INSIGHT_DEFAULT,
            w_cred: scoring::W_CRED_DEFAULT,

            n_candidates: selector::N_CANDIDATES_DEFAULT,

            series_cap: reranker::SERIES_CAP_DEFAULT,
            adjacency_penalty: reranker::ADJACENCY_PENALTY_DEFAULT,
            topic_threshold: reranker::TOPIC_THRESHOLD_DEFAULT,
            topic_penalty: reranker::TOPIC_PENALTY_DEFAULT,
            entity_threshold: reranker::ENTITY_THRESHOLD_DEFAULT,
            entity_penalty: reranker::ENTITY_PENALTY_DEFAULT,
            contrarian_boost: reranker::CONTRARIAN_BOOST_DEFAULT,
            k: reranker::K_DEFAULT,

            session_timeout: session::SESSION_TIMEOUT_DEFAULT,
            max_sessions: session::MAX_SESSIONS_DEFAULT,
            create_session_deadline: session::CREATE_SESSION_DEADLINE_DEFAULT,

            embedding_dimension: embedding::DEFAULT_DIMENSION,
        }
    }
}

impl Config {
    /// Validate every invariant spec §7 requires to be fatal at startup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] describing the first violation
    /// found.
    pub fn validate(&self) -> Result<()> {
        fn in_range(name: &str, value: f32, range: (f32, f32)) -> Result<()> {
            if value < range.0 || value > range.1 {
                return Err(Error::InvariantViolation(format!(
                    "{name} = {value} out of range [{}, {}]",
                    range.0, range.1
                )));
            }
            Ok(())
        }
        fn in_range_u(name: &str, value: u32, range: (u32, u32)) -> Result<()> {
            if value < range.0 || value > range.1 {
                return Err(Error::InvariantViolation(format!(
                    "{name} = {value} out of range [{}, {}]",
                    range.0, range.1
                )));
            }
            Ok(())
        }
        fn in_range_us(name: &str, value: usize, range: (usize, usize)) -> Result<()> {
            if value < range.0 || value > range.1 {
                return Err(Error::InvariantViolation(format!(
                    "{name} = {value} out of range [{}, {}]",
                    range.0, range.1
                )));
            }
            Ok(())
        }

        if self.ci_min < gate::CI_MIN_RANGE.0 || self.ci_min > gate::CI_MIN_RANGE.1 {
            return Err(Error::InvariantViolation(format!(
                "ci_min = {} out of range {:?}",
                self.ci_min,
                gate::CI_MIN_RANGE
            )));
        }

        in_range("w_bookmark", self.w_bookmark, user_vector::W_BOOKMARK_RANGE)?;
        in_range("lambda_user", self.lambda_user, user_vector::LAMBDA_USER_RANGE)?;
        in_range_us("n_max", self.n_max, user_vector::N_MAX_RANGE)?;

        in_range("w_insight", self.w_insight, scoring::W_ALPHA_RANGE)?;
        in_range("w_cred", self.w_cred, scoring::W_ALPHA_RANGE)?;
        if (self.w_insight + self.w_cred - 1.0).abs() > 1e-6 {
            return Err(Error::InvariantViolation(format!(
                "w_insight + w_cred must equal 1.0, got {}",
                self.w_insight + self.w_cred
            )));
        }

        let weight_sum = self.w_sim + self.w_alpha + self.w_fresh;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(Error::InvariantViolation(format!(
                "w_sim + w_alpha + w_fresh must equal 1.0, got {weight_sum}"
            )));
        }

        in_range_us("n_candidates", self.n_candidates, selector::N_CANDIDATES_RANGE)?;

        in_range_u("series_cap", self.series_cap, reranker::SERIES_CAP_RANGE)?;
        in_range(
            "adjacency_penalty",
            self.adjacency_penalty,
            reranker::ADJACENCY_PENALTY_RANGE,
        )?;
        in_range_u(
            "topic_threshold",
            self.topic_threshold,
            reranker::TOPIC_THRESHOLD_RANGE,
        )?;
        in_range("topic_penalty", self.topic_penalty, reranker::TOPIC_PENALTY_RANGE)?;
        in_range_u(
            "entity_threshold",
            self.entity_threshold,
            reranker::ENTITY_THRESHOLD_RANGE,
        )?;
        in_range(
            "entity_penalty",
            self.entity_penalty,
            reranker::ENTITY_PENALTY_RANGE,
        )?;
        in_range(
            "contrarian_boost",
            self.contrarian_boost,
            reranker::CONTRARIAN_BOOST_RANGE,
        )?;

        if self.k == 0 {
            return Err(Error::InvariantViolation("k must be > 0".to_string()));
        }
        if self.embedding_dimension == 0 {
            return Err(Error::InvariantViolation(
                "embedding_dimension must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
