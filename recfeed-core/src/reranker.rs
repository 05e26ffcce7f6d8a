//! C7 - reranker: greedy, diversity-constrained slot-by-slot selection over
//! an already-scored candidate pool.
//!
//! `rerank_slot` is a pure function over `(candidates, state) -> (winner,
//! new_state)`; the session pool (C8) is the only thing that owns a
//! [`RerankState`] across slots.

use crate::catalog::Pov;
use crate::config::Config;
use crate::selector::Candidate;
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

/// Diversity trackers carried across slots within one queue (spec §4.7).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerankState {
    pub series_count: HashMap<Uuid, u32>,
    pub topic_count: HashMap<String, u32>,
    pub entity_count: HashMap<String, u32>,
    pub last_entity: Option<String>,
    pub last_pov: Option<Pov>,
}

impl RerankState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute `temp_score(e, state)` per spec §4.7 steps 1-6.
fn temp_score(candidate: &Candidate, view: &crate::catalog::EpisodeView, state: &RerankState, config: &Config) -> f32 {
    let mut t = candidate.score.base_score;

    let series_hits = state
        .series_count
        .get(&candidate.episode.series_id)
        .copied()
        .unwrap_or(0);
    if series_hits >= config.series_cap {
        return 0.0;
    }

    if let Some(entity) = &view.primary_entity {
        if state.last_entity.as_deref() == Some(entity.as_str()) {
            t *= config.adjacency_penalty;
        }
    }

    if let Some(topic) = &view.primary_topic {
        let topic_hits = state.topic_count.get(topic).copied().unwrap_or(0);
        if topic_hits >= config.topic_threshold {
            t *= config.topic_penalty;
        }
    }

    if let Some(entity) = &view.primary_entity {
        let entity_hits = state.entity_count.get(entity).copied().unwrap_or(0);
        if entity_hits >= config.entity_threshold {
            t *= config.entity_penalty;
        }
    }

    if state.last_pov == Some(Pov::Consensus) && view.pov == Pov::Contrarian {
        t *= config.contrarian_boost;
    }

    t
}

/// Fill one slot: pick the candidate with maximum `temp_score`, tie-broken
/// deterministically by `(-base_score, published_at desc, id asc)`. Returns
/// `None` once the maximum `temp_score` is 0 or no candidates remain.
#[must_use]
pub fn rerank_slot(
    candidates: &[Candidate],
    views: &HashMap<Uuid, crate::catalog::EpisodeView>,
    state: &RerankState,
    now: chrono::DateTime<chrono::Utc>,
    config: &Config,
) -> Option<usize> {
    let _ = now;
    let mut best: Option<(usize, f32)> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        let view = views.get(&candidate.episode.id)?;
        let t = temp_score(candidate, view, state, config);
        if t <= 0.0 {
            continue;
        }
        best = match best {
            None => Some((idx, t)),
            Some((best_idx, best_t)) => {
                if is_better(candidates, t, idx, best_t, best_idx) {
                    Some((idx, t))
                } else {
                    Some((best_idx, best_t))
                }
            }
        };
    }

    best.map(|(idx, _)| idx)
}

/// Whether candidate `idx` (temp_score `t`) beats the current best
/// `best_idx` (temp_score `best_t`): higher `temp_score` wins; ties break by
/// `(-base_score, published_at desc, id asc)`.
fn is_better(candidates: &[Candidate], t: f32, idx: usize, best_t: f32, best_idx: usize) -> bool {
    match t.total_cmp(&best_t) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            let a = &candidates[idx];
            let b = &candidates[best_idx];
            match a.score.base_score.total_cmp(&b.score.base_score) {
                Ordering::Equal => {}
                ord => return ord == Ordering::Greater,
            }
            match a.episode.published_at.cmp(&b.episode.published_at) {
                Ordering::Equal => {}
                ord => return ord == Ordering::Greater,
            }
            a.episode.id < b.episode.id
        }
    }
}

/// Apply the winner of a slot to `state`, in place.
pub fn update_state(state: &mut RerankState, winner: &Candidate, view: &crate::catalog::EpisodeView) {
    *state.series_count.entry(winner.episode.series_id).or_insert(0) += 1;
    if let Some(topic) = &view.primary_topic {
        *state.topic_count.entry(topic.clone()).or_insert(0) += 1;
    }
    if let Some(entity) = &view.primary_entity {
        *state.entity_count.entry(entity.clone()).or_insert(0) += 1;
    }
    state.last_entity = view.primary_entity.clone();
    state.last_pov = Some(view.pov);
}

/// Run the full greedy loop over `candidates`, producing up to
/// `max_len` episodes (slots stop early if candidates are exhausted or the
/// maximum `temp_score` reaches 0).
#[must_use]
pub fn rerank(candidates: &[Candidate], max_len: usize, now: chrono::DateTime<chrono::Utc>, config: &Config) -> Vec<Candidate> {
    let views: HashMap<Uuid, crate::catalog::EpisodeView> = candidates
        .iter()
        .map(|c| (c.episode.id, c.episode.view(now)))
        .collect();

    let mut remaining: Vec<Candidate> = candidates.to_vec();
    let mut state = RerankState::new();
    let mut output = Vec::with_capacity(max_len.min(remaining.len()));

    while output.len() < max_len && !remaining.is_empty() {
        match rerank_slot(&remaining, &views, &state, now, config) {
            Some(idx) => {
                let winner = remaining.remove(idx);
                let view = views
                    .get(&winner.episode.id)
                    .expect("every candidate has a precomputed view");
                update_state(&mut state, &winner, view);
                output.push(winner);
            }
            None => break,
        }
    }

    output
}
