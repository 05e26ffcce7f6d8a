//! Default tunable values, centralized so `Config::default()` and
//! `Config::validate()` agree on the same numbers as spec §6.

use std::time::Duration;

/// Quality gate defaults.
pub mod gate {
    pub const CREDIBILITY_FLOOR: u8 = 2;
    pub const CI_MIN_DEFAULT: u8 = 5;
    pub const CI_MIN_RANGE: (u8, u8) = (4, 6);
}

/// User-vector builder defaults.
pub mod user_vector {
    pub const N_MAX_DEFAULT: usize = 10;
    pub const N_MAX_RANGE: (usize, usize) = (5, 20);
    pub const W_VIEW: f32 = 1.0;
    pub const W_BOOKMARK_DEFAULT: f32 = 2.0;
    pub const W_BOOKMARK_RANGE: (f32, f32) = (1.5, 3.0);
    pub const LAMBDA_USER_DEFAULT: f32 = 0.05;
    pub const LAMBDA_USER_RANGE: (f32, f32) = (0.03, 0.10);
}

/// Scorer defaults.
pub mod scoring {
    pub const W_INSIGHT_DEFAULT: f32 = 0.5;
    pub const W_CRED_DEFAULT: f32 = 0.5;
    pub const W_ALPHA_RANGE: (f32, f32) = (0.4, 0.6);

    pub const LAMBDA_FRESH_DEFAULT: f32 = 0.03;
    pub const FLOOR_FRESH_DEFAULT: f32 = 0.10;

    pub const W_SIM_DEFAULT: f32 = 0.50;
    pub const W_ALPHA_WEIGHT_DEFAULT: f32 = 0.35;
    pub const W_FRESH_DEFAULT: f32 = 0.15;

    pub const COLD_START_SIM: f32 = 0.5;
}

/// Candidate selector defaults.
pub mod selector {
    pub const N_CANDIDATES_DEFAULT: usize = 50;
    pub const N_CANDIDATES_RANGE: (usize, usize) = (30, 100);
}

/// Reranker defaults.
pub mod reranker {
    pub const SERIES_CAP_DEFAULT: u32 = 2;
    pub const SERIES_CAP_RANGE: (u32, u32) = (1, 3);

    pub const ADJACENCY_PENALTY_DEFAULT: f32 = 0.80;
    pub const ADJACENCY_PENALTY_RANGE: (f32, f32) = (0.70, 0.90);

    pub const TOPIC_THRESHOLD_DEFAULT: u32 = 2;
    pub const TOPIC_THRESHOLD_RANGE: (u32, u32) = (2, 3);
    pub const TOPIC_PENALTY_DEFAULT: f32 = 0.85;
    pub const TOPIC_PENALTY_RANGE: (f32, f32) = (0.75, 0.90);

    pub const ENTITY_THRESHOLD_DEFAULT: u32 = 3;
    pub const ENTITY_THRESHOLD_RANGE: (u32, u32) = (2, 4);
    pub const ENTITY_PENALTY_DEFAULT: f32 = 0.70;
    pub const ENTITY_PENALTY_RANGE: (f32, f32) = (0.60, 0.80);

    pub const CONTRARIAN_BOOST_DEFAULT: f32 = 1.15;
    pub const CONTRARIAN_BOOST_RANGE: (f32, f32) = (1.10, 1.25);

    pub const K_DEFAULT: usize = 10;
}

/// Session pool defaults.
pub mod session {
    use super::Duration;

    pub const SESSION_TIMEOUT_DEFAULT: Duration = Duration::from_secs(30 * 60);
    pub const MAX_SESSIONS_DEFAULT: usize = 10_000;
    pub const CREATE_SESSION_DEADLINE_DEFAULT: Duration = Duration::from_secs(10);
}

/// Embedding/vector defaults.
pub mod embedding {
    pub const DEFAULT_DIMENSION: usize = 1536;
    pub const UNIT_NORM_TOLERANCE: f32 = 1e-5;
}
