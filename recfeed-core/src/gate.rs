//! C4 - quality gate: sequential reject rules applied before scoring.
//!
//! Each rule short-circuits: an episode failing an earlier rule is never
//! evaluated against a later one, which matters for telemetry (we want to
//! know *which* rule rejected it, not just that it was rejected).

use crate::catalog::Episode;
use crate::config::Config;
use std::collections::HashSet;
use uuid::Uuid;

/// Why an episode did not pass the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Gate1Credibility,
    Gate2Combined,
    Gate3Excluded,
}

/// Evaluate one episode against the gate. `Ok(())` means it passes through
/// to scoring; `Err(reason)` names the first rule it failed.
pub fn evaluate(episode: &Episode, excluded: &HashSet<Uuid>, config: &Config) -> Result<(), RejectReason> {
    if episode.credibility < 2 {
        return Err(RejectReason::Gate1Credibility);
    }
    if u16::from(episode.credibility) + u16::from(episode.insight) < u16::from(config.ci_min) {
        return Err(RejectReason::Gate2Combined);
    }
    if excluded.contains(&episode.id) {
        return Err(RejectReason::Gate3Excluded);
    }
    Ok(())
}
