/// Fixed-length semantic vector produced by the embedding service
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddingVector {
    values: Vec<f32>,
}

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// L2 norm
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Cosine similarity in [-1, 1].
///
/// Mismatched dimensions or a zero-norm operand yield 0.0.
pub fn cosine_similarity(a: &EmbeddingVector, b: &EmbeddingVector) -> f32 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }

    let dot: f32 = a
        .values
        .iter()
        .zip(&b.values)
        .map(|(x, y)| x * y)
        .sum();

    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
