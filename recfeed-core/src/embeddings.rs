//! C2 - embedding provider: maps text to a unit-norm vector of fixed
//! dimension, and the similarity primitives built on top of it.
//!
//! The provider is an overridable trait rather than a concrete HTTP client:
//! production code plugs in a real provider, tests substitute
//! [`FakeEmbeddingProvider`], a deterministic fake that maps strings to
//! fixed vectors.

use crate::error::Result;
use async_trait::async_trait;

/// Maps text to a unit-norm embedding vector of a fixed dimension.
///
/// Implementations may fail transiently (network I/O); callers treat a
/// failure as "user vector not available" rather than aborting the request
/// (see `user_vector::build_user_vector`).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text`, returning a vector with L2 norm `1 +/- 1e-5`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Capability flag: whether this provider is currently able to serve
    /// requests (e.g. not mid-outage, not rate-limited).
    fn is_available(&self) -> bool {
        true
    }

    /// Fixed dimension this provider returns.
    fn dimension(&self) -> usize;
}

/// Deterministic fake provider for tests: hashes the input text into a
/// dense pseudo-random vector, then L2-normalizes it. Same text always maps
/// to the same vector, which is what makes ranking tests reproducible (Q5).
pub struct FakeEmbeddingProvider {
    dimension: usize,
}

impl FakeEmbeddingProvider {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(l2_normalize(&hash_embed(text, self.dimension)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Expand `text` into a dense vector via a splitmix64-style hash of
/// `(text, dimension_index)`. Not cryptographic; just needs to be stable and
/// roughly well-distributed so cosine similarity behaves sensibly in tests.
fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    use std::hash::{Hash, Hasher};

    (0..dimension)
        .map(|i| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let bits = hasher.finish();
            // Map to [-1.0, 1.0).
            ((bits >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0) as f32
        })
        .collect()
}

/// L2-normalize a vector. Returns the zero vector unchanged if its norm is
/// (numerically) zero.
#[must_use]
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

/// Whether `v` is unit-norm within `tolerance`.
#[must_use]
pub fn is_unit_norm(v: &[f32], tolerance: f32) -> bool {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    (norm - 1.0).abs() <= tolerance
}

/// Raw cosine similarity in `[-1, 1]`. Callers that need `S_sim in [0, 1]`
/// clamp negatives themselves (see `scoring::score`);
/// this primitive stays faithful to the mathematical definition so it can be
/// reused anywhere a signed similarity is meaningful.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a <= f32::EPSILON || mag_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
