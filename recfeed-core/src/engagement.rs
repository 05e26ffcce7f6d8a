//! C9 - engagement log: an append-only per-user record of views,
//! bookmarks, and dismissals, exclusively owned here and borrowed as a
//! read-only snapshot by the user-vector builder (C3) and the exclusion set
//! (C4).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// The kind of user-originated event on an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementType {
    View,
    Bookmark,
    Dismiss,
}

impl EngagementType {
    /// Relative strength used by the user-vector builder's dedup rule
    /// (bookmark outranks view); dismissals never reach that path.
    pub(crate) fn strength(self) -> u8 {
        match self {
            EngagementType::Dismiss => 0,
            EngagementType::View => 1,
            EngagementType::Bookmark => 2,
        }
    }
}

/// A single append-only engagement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    pub episode_id: Uuid,
    pub kind: EngagementType,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, per-user engagement log.
///
/// Each user's history is guarded by its own lock so that appends for one
/// user never contend with snapshots for another (spec §5). `snapshot`
/// returns a point-in-time clone; the core never deletes individual
/// engagements - `reset` clears a user's entire history, matching the UI's
/// "hide" being a `dismiss` append rather than a deletion.
#[derive(Default)]
pub struct EngagementLog {
    users: RwLock<HashMap<Uuid, Arc<RwLock<Vec<Engagement>>>>>,
}

impl EngagementLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<RwLock<Vec<Engagement>>> {
        if let Some(lock) = self.users.read().get(&user_id) {
            return Arc::clone(lock);
        }
        Arc::clone(
            self.users
                .write()
                .entry(user_id)
                .or_insert_with(|| Arc::new(RwLock::new(Vec::new()))),
        )
    }

    /// Atomically append a new engagement for `user_id`.
    pub fn append(&self, user_id: Uuid, episode_id: Uuid, kind: EngagementType, timestamp: DateTime<Utc>) {
        let lock = self.user_lock(user_id);
        lock.write().push(Engagement {
            episode_id,
            kind,
            timestamp,
        });
    }

    /// A consistent, point-in-time copy of `user_id`'s engagement history,
    /// in append order (oldest first).
    #[must_use]
    pub fn snapshot(&self, user_id: Uuid) -> Vec<Engagement> {
        match self.users.read().get(&user_id) {
            Some(lock) => lock.read().clone(),
            None => Vec::new(),
        }
    }

    /// Destructively clear `user_id`'s engagement history.
    pub fn reset(&self, user_id: Uuid) {
        if let Some(lock) = self.users.read().get(&user_id) {
            lock.write().clear();
        }
    }
}

/// Every episode id the user has engaged with, in any way. Once present,
/// never removed for the lifetime of a session (spec §3).
#[must_use]
pub fn excluded_ids(engagements: &[Engagement]) -> HashSet<Uuid> {
    engagements.iter().map(|e| e.episode_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_snapshot_roundtrip() {
        let log = EngagementLog::new();
        let user = Uuid::new_v4();
        let ep1 = Uuid::new_v4();
        let ep2 = Uuid::new_v4();
        log.append(user, ep1, EngagementType::View, Utc::now());
        log.append(user, ep2, EngagementType::Bookmark, Utc::now());

        let snap = log.snapshot(user);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].episode_id, ep1);
        assert_eq!(snap[1].kind, EngagementType::Bookmark);
    }

    #[test]
    fn reset_clears_only_that_user() {
        let log = EngagementLog::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        log.append(user_a, Uuid::new_v4(), EngagementType::View, Utc::now());
        log.append(user_b, Uuid::new_v4(), EngagementType::View, Utc::now());

        log.reset(user_a);

        assert!(log.snapshot(user_a).is_empty());
        assert_eq!(log.snapshot(user_b).len(), 1);
    }

    #[test]
    fn excluded_ids_covers_all_engagement_types() {
        let ep1 = Uuid::new_v4();
        let ep2 = Uuid::new_v4();
        let ep3 = Uuid::new_v4();
        let now = Utc::now();
        let engagements = vec![
            Engagement {
                episode_id: ep1,
                kind: EngagementType::View,
                timestamp: now,
            },
            Engagement {
                episode_id: ep2,
                kind: EngagementType::Bookmark,
                timestamp: now,
            },
            Engagement {
                episode_id: ep3,
                kind: EngagementType::Dismiss,
                timestamp: now,
            },
        ];
        let excluded = excluded_ids(&engagements);
        assert!(excluded.contains(&ep1));
        assert!(excluded.contains(&ep2));
        assert!(excluded.contains(&ep3));
    }

    #[test]
    fn unknown_user_has_empty_snapshot() {
        let log = EngagementLog::new();
        assert!(log.snapshot(Uuid::new_v4()).is_empty());
    }
}
