use crate::types::{Candidate, SearchConfig};

/// Fused scores at or below this value are dropped
pub const DISCARD_THRESHOLD: f32 = 0.1;

/// Weight of entry frequency inside the multiplicative boost
pub const FREQUENCY_SCALE: f32 = 0.1;

/// Combine similarity scores into one ordering key.
///
/// `(embedding * w_e + phonetic * w_p) * (1 + frequency * scale)`
pub fn fuse(
    embedding_score: f32,
    phonetic_score: f32,
    frequency: f32,
    config: &SearchConfig,
) -> f32 {
    let similarity =
        embedding_score * config.embedding_weight + phonetic_score * config.phonetic_weight;
    let boost = 1.0 + frequency.max(0.0) * config.frequency_scale;

    similarity * boost
}

/// Filter, stable-sort descending, then truncate to `max_candidates`
pub fn rank(mut candidates: Vec<Candidate>, config: &SearchConfig) -> Vec<Candidate> {
    candidates.retain(|c| c.combined_score > config.discard_threshold);
    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    candidates.truncate(config.max_candidates);
    candidates
}
