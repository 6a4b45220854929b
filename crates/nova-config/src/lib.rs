use std::env;
use std::path::Path;
use std::time::Duration;

use nova_core::SearchConfig;
use nova_core::ranking::{DISCARD_THRESHOLD, FREQUENCY_SCALE};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_dictionary_path() -> String {
    "resources/dictionary.txt".to_string()
}

fn default_embedding_weight() -> f32 {
    0.6
}

fn default_phonetic_weight() -> f32 {
    0.4
}

fn default_max_candidates() -> usize {
    10
}

fn default_debug_logging() -> bool {
    true
}

fn default_embedding_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_requests() -> usize {
    8
}

fn default_discard_threshold() -> f32 {
    DISCARD_THRESHOLD
}

fn default_frequency_scale() -> f32 {
    FREQUENCY_SCALE
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Embedding service base URL
    pub ollama_url: String,
    pub embedding_model: String,
    pub dictionary_path: String,
    pub embedding_weight: f32,
    pub phonetic_weight: f32,
    pub max_candidates: usize,
    pub debug_logging: bool,
    /// Per-request timeout for the embedding service
    pub embedding_timeout_secs: u64,
    /// Upper bound on embedding requests in flight
    pub max_concurrent_requests: usize,
    pub discard_threshold: f32,
    pub frequency_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            embedding_model: default_embedding_model(),
            dictionary_path: default_dictionary_path(),
            embedding_weight: default_embedding_weight(),
            phonetic_weight: default_phonetic_weight(),
            max_candidates: default_max_candidates(),
            debug_logging: default_debug_logging(),
            embedding_timeout_secs: default_embedding_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
            discard_threshold: default_discard_threshold(),
            frequency_scale: default_frequency_scale(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Config root must be a JSON object")]
    NotAnObject,
}

/// Overwrite `slot` with `key` when present and well-typed
fn read_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = map.get(key) else {
        return;
    };

    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => tracing::warn!("Ignoring config key '{}': {}", key, e),
    }
}

/// Counts also accept integral floats such as `10.0`
fn read_count<T: TryFrom<u64>>(map: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = map.get(key) else {
        return;
    };

    let count = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    });

    match count.and_then(|c| T::try_from(c).ok()) {
        Some(parsed) => *slot = parsed,
        None => tracing::warn!("Ignoring config key '{}': expected a count, got {}", key, value),
    }
}

impl Config {
    /// Load config from a JSON file; a missing or invalid file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse a JSON document key by key; a mistyped key keeps its default
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(data)?;
        let map = root.as_object().ok_or(ConfigError::NotAnObject)?;

        let mut config = Self::default();
        read_field(map, "ollama_url", &mut config.ollama_url);
        read_field(map, "embedding_model", &mut config.embedding_model);
        read_field(map, "dictionary_path", &mut config.dictionary_path);
        read_field(map, "embedding_weight", &mut config.embedding_weight);
        read_field(map, "phonetic_weight", &mut config.phonetic_weight);
        read_count(map, "max_candidates", &mut config.max_candidates);
        read_field(map, "debug_logging", &mut config.debug_logging);
        read_count(map, "embedding_timeout_secs", &mut config.embedding_timeout_secs);
        read_count(map, "max_concurrent_requests", &mut config.max_concurrent_requests);
        read_field(map, "discard_threshold", &mut config.discard_threshold);
        read_field(map, "frequency_scale", &mut config.frequency_scale);

        Ok(config)
    }

    /// Apply `NOVA_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; unparsable values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("NOVA_OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Some(model) = lookup("NOVA_EMBEDDING_MODEL") {
            self.embedding_model = model;
        }
        if let Some(path) = lookup("NOVA_DICTIONARY_PATH") {
            self.dictionary_path = path;
        }
        if let Some(max) = lookup("NOVA_MAX_CANDIDATES").and_then(|v| v.parse().ok()) {
            self.max_candidates = max;
        }
        self
    }

    /// Immutable scoring policy for the search orchestrator
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            embedding_weight: self.embedding_weight,
            phonetic_weight: self.phonetic_weight,
            max_candidates: self.max_candidates,
            dictionary_path: self.dictionary_path.clone(),
            discard_threshold: self.discard_threshold,
            frequency_scale: self.frequency_scale,
        }
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }
}
