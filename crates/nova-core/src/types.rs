use crate::error::SearchError;
use crate::ranking::{DISCARD_THRESHOLD, FREQUENCY_SCALE};

/// Ranked conversion candidate handed back to the host integration layer
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Target-script form to commit (e.g. kanji spelling)
    pub text: String,
    /// Kana reading the phonetic score was computed against
    pub reading: String,
    /// Cosine similarity in [-1, 1], 0 when no embedding was available
    pub embedding_score: f32,
    /// Normalized edit-distance similarity in [0, 1]
    pub phonetic_score: f32,
    /// Fused ordering key
    pub combined_score: f32,
}

/// Per-search scoring policy
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub embedding_weight: f32,
    pub phonetic_weight: f32,
    pub max_candidates: usize,
    pub dictionary_path: String,
    /// Candidates at or below this fused score are discarded
    pub discard_threshold: f32,
    /// Multiplier on entry frequency inside the fusion boost
    pub frequency_scale: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_weight: 0.6,
            phonetic_weight: 0.4,
            max_candidates: 10,
            dictionary_path: "resources/dictionary.txt".to_string(),
            discard_threshold: DISCARD_THRESHOLD,
            frequency_scale: FREQUENCY_SCALE,
        }
    }
}

impl SearchConfig {
    /// Reject configurations a search cannot run with
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_candidates == 0 {
            return Err(SearchError::InvalidConfig(
                "max_candidates must be positive".to_string(),
            ));
        }

        let numeric = [
            ("embedding_weight", self.embedding_weight),
            ("phonetic_weight", self.phonetic_weight),
            ("discard_threshold", self.discard_threshold),
            ("frequency_scale", self.frequency_scale),
        ];

        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(SearchError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        Ok(())
    }
}
