use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use moka::future::Cache;
use nova_core::EmbeddingVector;

use crate::{EmbedError, Embedder};

/// Upper bound on cached input embeddings per snapshot.
pub const DEFAULT_INPUT_CAPACITY: u64 = 1024;

/// Embeddings keyed by exact text.
///
/// Owned by one dictionary snapshot; a reload gets a fresh cache.
/// Dictionary entries are kept for the snapshot's lifetime, typed inputs
/// are evicted past a fixed capacity. Concurrent requests for the same
/// text share one fetch, and failed fetches are never stored.
pub struct EmbeddingCache {
    entries: Cache<String, Arc<EmbeddingVector>>,
    inputs: Cache<String, Arc<EmbeddingVector>>,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::with_input_capacity(DEFAULT_INPUT_CAPACITY)
    }
}

async fn get_or_fetch_in(
    cache: &Cache<String, Arc<EmbeddingVector>>,
    text: &str,
    embedder: &dyn Embedder,
) -> Result<Arc<EmbeddingVector>, Arc<EmbedError>> {
    cache
        .try_get_with_by_ref(text, async { embedder.embed(text).await.map(Arc::new) })
        .await
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().build(),
            inputs: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub async fn get(&self, text: &str) -> Option<Arc<EmbeddingVector>> {
        self.entries.get(text).await
    }

    /// Cached entry vector, or one fetched from the embedder and stored
    pub async fn get_or_fetch(
        &self,
        text: &str,
        embedder: &dyn Embedder,
    ) -> Result<Arc<EmbeddingVector>, Arc<EmbedError>> {
        get_or_fetch_in(&self.entries, text, embedder).await
    }

    /// Same as [`get_or_fetch`](Self::get_or_fetch) for user input,
    /// stored in the bounded input cache
    pub async fn get_or_fetch_input(
        &self,
        text: &str,
        embedder: &dyn Embedder,
    ) -> Result<Arc<EmbeddingVector>, Arc<EmbedError>> {
        get_or_fetch_in(&self.inputs, text, embedder).await
    }

    async fn fetch_one(
        &self,
        text: String,
        embedder: &dyn Embedder,
    ) -> Option<Arc<EmbeddingVector>> {
        match self.get_or_fetch(&text, embedder).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::debug!("Embedding fetch for '{}' failed: {}", text, e);
                None
            }
        }
    }

    /// Resolve many texts with at most `concurrency` fetches in flight.
    ///
    /// Output order matches input order regardless of completion order;
    /// a failed fetch yields `None` for that slot only.
    pub async fn fetch_all<S: AsRef<str>>(
        &self,
        texts: &[S],
        embedder: &dyn Embedder,
        concurrency: usize,
    ) -> Vec<Option<Arc<EmbeddingVector>>> {
        let texts: Vec<String> = texts.iter().map(|t| t.as_ref().to_owned()).collect();

        stream::iter(texts)
            .map(|text| self.fetch_one(text, embedder))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Precompute embeddings for every text not yet cached.
    /// Returns how many new vectors were stored.
    pub async fn warm<S: AsRef<str>>(
        &self,
        texts: &[S],
        embedder: &dyn Embedder,
        concurrency: usize,
    ) -> usize {
        let missing: Vec<&str> = {
            let mut seen = HashSet::new();
            texts
                .iter()
                .map(|t| t.as_ref())
                .filter(|t| !self.entries.contains_key(*t) && seen.insert(*t))
                .collect()
        };

        if missing.is_empty() {
            return 0;
        }

        let stored = self
            .fetch_all(&missing, embedder, concurrency)
            .await
            .iter()
            .filter(|v| v.is_some())
            .count();

        tracing::info!(
            "Warmed embedding cache with {}/{} entries",
            stored,
            missing.len()
        );

        stored
    }

    /// Number of cached dictionary entry vectors
    pub async fn len(&self) -> usize {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0 && self.input_len().await == 0
    }

    pub async fn input_len(&self) -> usize {
        self.inputs.run_pending_tasks().await;
        self.inputs.entry_count() as usize
    }

    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.inputs.invalidate_all();
        self.entries.run_pending_tasks().await;
        self.inputs.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Vectors derived from text length; texts starting with '!' fail
    struct CountingEmbedder {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Later texts finish first to shuffle completion order
            let delay = 20u64.saturating_sub(text.chars().count() as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text.starts_with('!') {
                return Err(EmbedError::EmptyEmbedding);
            }
            Ok(EmbeddingVector::new(vec![text.chars().count() as f32, 1.0]))
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "counting".to_string(),
                model: "test".to_string(),
                endpoint: String::new(),
            }
        }
    }

    #[tokio::test]
    async fn get_or_fetch_hits_the_service_once() {
        let cache = EmbeddingCache::new();
        let embedder = CountingEmbedder::new();

        let first = cache.get_or_fetch("ねこ", &embedder).await.unwrap();
        let second = cache.get_or_fetch("ねこ", &embedder).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("ねこ").await.is_some());
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        let cache = EmbeddingCache::new();
        let embedder = CountingEmbedder::new();

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch("ねこ", &embedder),
            cache.get_or_fetch("ねこ", &embedder),
            cache.get_or_fetch_input("ねこ", &embedder),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        // Entries and inputs are cached separately
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = EmbeddingCache::new();
        let embedder = CountingEmbedder::new();

        assert!(cache.get_or_fetch("!bad", &embedder).await.is_err());
        assert!(cache.get_or_fetch("!bad", &embedder).await.is_err());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn input_cache_is_bounded() {
        let cache = EmbeddingCache::with_input_capacity(8);
        let embedder = CountingEmbedder::new();

        for i in 0..64 {
            cache
                .get_or_fetch_input(&format!("input{i}"), &embedder)
                .await
                .unwrap();
        }

        assert!(cache.input_len().await <= 8);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn fetch_all_preserves_order_and_bounds_concurrency() {
        let cache = EmbeddingCache::new();
        let embedder = CountingEmbedder::new();
        let texts: Vec<String> = (1..=12).map(|n| "あ".repeat(n)).collect();

        let vectors = cache.fetch_all(&texts, &embedder, 3).await;

        assert_eq!(vectors.len(), 12);
        for (i, vector) in vectors.iter().enumerate() {
            let vector = vector.as_ref().unwrap();
            assert_eq!(vector.values()[0], (i + 1) as f32);
        }
        assert!(embedder.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn fetch_all_isolates_failures() {
        let cache = EmbeddingCache::new();
        let embedder = CountingEmbedder::new();

        let vectors = cache.fetch_all(&["ok", "!bad", "fine"], &embedder, 4).await;

        assert!(vectors[0].is_some());
        assert!(vectors[1].is_none());
        assert!(vectors[2].is_some());
    }

    #[tokio::test]
    async fn warm_skips_cached_and_duplicate_texts() {
        let cache = EmbeddingCache::new();
        let embedder = CountingEmbedder::new();

        cache.get_or_fetch("a", &embedder).await.unwrap();
        let stored = cache.warm(&["a", "b", "b", "c", "!x"], &embedder, 2).await;

        assert_eq!(stored, 2);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.len().await, 3);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
