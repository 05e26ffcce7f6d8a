//! C6 - candidate selector: streams the catalog through the gate and scorer,
//! keeping a bounded top-`N_candidates` pool by `BaseScore`.
//!
//! The only component whose complexity scales with catalog size; everything
//! downstream operates on the fixed-size candidate pool this returns.

use crate::catalog::{CatalogView, Episode};
use crate::config::Config;
use crate::gate;
use crate::scoring::{score, Score};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// A gate-passing, scored episode ready for reranking.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub episode: Arc<Episode>,
    pub score: Score,
}

/// Deterministic ordering key: `(-BaseScore, published_at desc, id asc)`.
/// Implemented as `Ord` on a wrapper so both the heap and the final sort use
/// the identical comparison.
struct HeapEntry(Candidate);

impl HeapEntry {
    /// `(-BaseScore, published_at desc, id asc)`, with the score compared
    /// via `total_cmp` since `BaseScore` is never NaN but `f32` has no `Ord`.
    fn cmp_key(&self, other: &Self) -> Ordering {
        match other
            .0
            .score
            .base_score
            .total_cmp(&self.0.score.base_score)
        {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.0.episode.published_at.cmp(&other.0.episode.published_at) {
            Ordering::Equal => {}
            ord => return ord.reverse(),
        }
        self.0.episode.id.cmp(&other.0.episode.id)
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key(other) == Ordering::Equal
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    /// Reversed so that `BinaryHeap` (a max-heap) behaves as the min-heap
    /// the selector needs: the *worst* candidate (by the selection key) sits
    /// at the top, ready to be evicted when a better one arrives.
    fn cmp(&self, other: &Self) -> Ordering {
        other.cmp_key(self)
    }
}

/// Stream the catalog through the gate and scorer, retaining the top
/// `config.n_candidates` by `BaseScore`, returned in descending order.
#[must_use]
pub fn select_candidates(
    catalog: &CatalogView,
    user_vector: Option<&[f32]>,
    excluded: &HashSet<Uuid>,
    now: DateTime<Utc>,
    config: &Config,
) -> Vec<Candidate> {
    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(config.n_candidates + 1);

    for episode in catalog.iter_episodes() {
        if gate::evaluate(episode, excluded, config).is_err() {
            continue;
        }
        let candidate_score = score(episode, user_vector, now, config);
        let entry = HeapEntry(Candidate {
            episode: Arc::clone(episode),
            score: candidate_score,
        });

        if heap.len() < config.n_candidates {
            heap.push(entry);
        } else if let Some(worst) = heap.peek() {
            // `worst` sits at the top of this reversed-order max-heap; if
            // the new entry ranks better than it, evict it.
            if entry.cmp_key(worst) == Ordering::Less {
                heap.pop();
                heap.push(entry);
            }
        }
    }

    let mut candidates: Vec<HeapEntry> = heap.into_vec();
    candidates.sort_by(HeapEntry::cmp_key);
    candidates.into_iter().map(|entry| entry.0).collect()
}
