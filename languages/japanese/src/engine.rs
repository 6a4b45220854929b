use std::path::Path;
use std::sync::Arc;

use nova_core::morphology::MorphResult;
use nova_core::{Candidate, Dictionary, SearchConfig, SearchError};
use nova_embedding::{Embedder, EmbeddingCache};
use tokio::sync::RwLock;

use crate::search::{EmbeddingContext, search_candidates};

const DEFAULT_CONCURRENCY: usize = 8;

/// Consistent view of the dictionary and the embeddings computed for it
pub struct Snapshot {
    pub version: u64,
    pub dictionary: Arc<Dictionary>,
    pub cache: Arc<EmbeddingCache>,
}

/// Japanese conversion engine
pub struct JapaneseEngine {
    config: SearchConfig,
    embedder: Option<Arc<dyn Embedder>>,
    concurrency: usize,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl JapaneseEngine {
    /// Create an engine over an already-loaded dictionary, without embeddings
    pub fn new(dictionary: Dictionary, config: SearchConfig) -> Self {
        Self {
            config,
            embedder: None,
            concurrency: DEFAULT_CONCURRENCY,
            snapshot: RwLock::new(Arc::new(Snapshot {
                version: 0,
                dictionary: Arc::new(dictionary),
                cache: Arc::new(EmbeddingCache::new()),
            })),
        }
    }

    /// Create an engine loading the dictionary named by the config
    pub fn from_config(config: SearchConfig) -> Self {
        let dictionary = Dictionary::load(&config.dictionary_path);
        Self::new(dictionary, config)
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        let meta = embedder.metadata();
        tracing::info!(
            "Using {} embeddings ({}) at {}",
            meta.name,
            meta.model,
            meta.endpoint
        );
        self.embedder = Some(embedder);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Rank candidates for one input against the current snapshot
    pub async fn search(
        &self,
        input_text: &str,
        morph_result: Option<&MorphResult>,
    ) -> Result<Vec<Candidate>, SearchError> {
        let snapshot = self.snapshot().await;

        let embedding = self.embedder.as_deref().map(|embedder| EmbeddingContext {
            embedder,
            cache: &snapshot.cache,
            concurrency: self.concurrency,
        });

        search_candidates(
            input_text,
            morph_result,
            &snapshot.dictionary,
            &self.config,
            embedding,
        )
        .await
    }

    /// Swap in a new dictionary with an empty embedding cache.
    /// Searches already running keep the snapshot they started with.
    pub async fn replace_dictionary(&self, dictionary: Dictionary) -> u64 {
        let mut current = self.snapshot.write().await;
        let version = current.version + 1;

        tracing::info!(
            "Dictionary reloaded from {}: {} entries (version {})",
            dictionary.source(),
            dictionary.len(),
            version
        );

        *current = Arc::new(Snapshot {
            version,
            dictionary: Arc::new(dictionary),
            cache: Arc::new(EmbeddingCache::new()),
        });
        version
    }

    pub async fn reload_dictionary(&self, path: impl AsRef<Path>) -> u64 {
        let dictionary = Dictionary::load(path);
        self.replace_dictionary(dictionary).await
    }

    /// Precompute embeddings for every dictionary entry.
    /// Returns the number of vectors fetched, 0 without an embedder.
    pub async fn warm_cache(&self) -> usize {
        let Some(embedder) = self.embedder.as_deref() else {
            return 0;
        };

        let snapshot = self.snapshot().await;
        let texts: Vec<&str> = snapshot
            .dictionary
            .entries()
            .iter()
            .map(|e| e.target_form.as_str())
            .collect();

        snapshot.cache.warm(&texts, embedder, self.concurrency).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::{DictionaryEntry, DictionarySource};

    fn entry(target: &str, reading: &str) -> DictionaryEntry {
        DictionaryEntry::new(target, reading, "", "", 0.0)
    }

    #[tokio::test]
    async fn reload_bumps_version_and_replaces_entries() {
        let engine = JapaneseEngine::new(
            Dictionary::from_entries(vec![entry("猫", "ねこ")]),
            SearchConfig::default(),
        );

        let before = engine.snapshot().await;
        let version = engine
            .replace_dictionary(Dictionary::from_entries(vec![entry("犬", "いぬ")]))
            .await;

        assert_eq!(version, 1);
        assert_eq!(before.version, 0);
        assert_eq!(before.dictionary.entries()[0].target_form, "猫");

        let results = engine.search("いぬ", None).await.unwrap();
        assert_eq!(results[0].text, "犬");
    }

    #[tokio::test]
    async fn missing_dictionary_file_falls_back() {
        let engine = JapaneseEngine::from_config(SearchConfig {
            dictionary_path: "/no/such/dictionary.txt".to_string(),
            ..SearchConfig::default()
        });

        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.dictionary.source(), &DictionarySource::Fallback);

        let results = engine.search("こんにちは", None).await.unwrap();
        assert_eq!(results[0].text, "こんにちは");
    }

    #[tokio::test]
    async fn warm_without_embedder_is_a_no_op() {
        let engine = JapaneseEngine::new(Dictionary::fallback(), SearchConfig::default());
        assert_eq!(engine.warm_cache().await, 0);
    }
}
