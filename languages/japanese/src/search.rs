use nova_core::morphology::MorphResult;
use nova_core::phonetic::phonetic_score;
use nova_core::preprocess::{DefaultPreprocessor, Preprocessor};
use nova_core::ranking::{fuse, rank};
use nova_core::similarity::cosine_similarity;
use nova_core::{Candidate, Dictionary, SearchConfig, SearchError};
use nova_embedding::{EmbeddingCache, Embedder};

use crate::kana::hiragana_reading;

/// Embedding collaborator plus the cache it fills
#[derive(Clone, Copy)]
pub struct EmbeddingContext<'a> {
    pub embedder: &'a dyn Embedder,
    pub cache: &'a EmbeddingCache,
    /// Maximum entry fetches in flight
    pub concurrency: usize,
}

/// Rank dictionary entries against user input.
///
/// Without an embedding context, or when the input embedding cannot be
/// obtained, every semantic score is 0 and ranking runs on phonetics alone.
pub async fn search_candidates(
    input_text: &str,
    morph_result: Option<&MorphResult>,
    dictionary: &Dictionary,
    config: &SearchConfig,
    embedding: Option<EmbeddingContext<'_>>,
) -> Result<Vec<Candidate>, SearchError> {
    config.validate()?;

    let input = DefaultPreprocessor.process(input_text);
    if input.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    if let Some(morph) = morph_result {
        tracing::debug!(
            "Morphological analysis: {} nodes, reading '{}'",
            morph.len(),
            hiragana_reading(morph)
        );
    }

    if dictionary.is_empty() {
        tracing::debug!("Dictionary is empty, no candidates for '{}'", input);
        return Ok(Vec::new());
    }

    let entry_vectors = match embedding {
        Some(ctx) => match ctx.cache.get_or_fetch_input(&input, ctx.embedder).await {
            Ok(input_vector) => {
                let texts: Vec<&str> = dictionary
                    .entries()
                    .iter()
                    .map(|e| e.target_form.as_str())
                    .collect();
                let vectors = ctx.cache.fetch_all(&texts, ctx.embedder, ctx.concurrency).await;
                Some((input_vector, vectors))
            }
            Err(e) => {
                tracing::warn!("Input embedding unavailable, ranking on phonetics only: {}", e);
                None
            }
        },
        None => None,
    };

    let candidates: Vec<Candidate> = dictionary
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let phonetic = phonetic_score(&input, &entry.reading);
            let semantic = entry_vectors
                .as_ref()
                .and_then(|(input_vector, vectors)| {
                    vectors[i]
                        .as_ref()
                        .map(|v| cosine_similarity(input_vector, v))
                })
                .unwrap_or(0.0);

            Candidate {
                text: entry.target_form.clone(),
                reading: entry.reading.clone(),
                embedding_score: semantic,
                phonetic_score: phonetic,
                combined_score: fuse(semantic, phonetic, entry.frequency, config),
            }
        })
        .collect();

    let ranked = rank(candidates, config);
    tracing::debug!("Found {} candidates for input: {}", ranked.len(), input);

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::DictionaryEntry;

    fn dictionary() -> Dictionary {
        Dictionary::from_entries(vec![
            DictionaryEntry::new("猫", "ねこ", "ネコ", "neko", 0.5),
            DictionaryEntry::new("犬", "いぬ", "イヌ", "inu", 0.5),
        ])
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let result =
            search_candidates("  \n", None, &dictionary(), &SearchConfig::default(), None).await;
        assert!(matches!(result, Err(SearchError::EmptyInput)));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = SearchConfig {
            max_candidates: 0,
            ..SearchConfig::default()
        };
        let result = search_candidates("ねこ", None, &dictionary(), &config, None).await;
        assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn phonetic_only_ranking() {
        let ranked = search_candidates("ねこ", None, &dictionary(), &SearchConfig::default(), None)
            .await
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].text, "猫");
        assert_eq!(ranked[0].phonetic_score, 1.0);
        assert_eq!(ranked[0].embedding_score, 0.0);
    }

    #[tokio::test]
    async fn half_width_input_is_normalized() {
        let dict = Dictionary::from_entries(vec![DictionaryEntry::new(
            "猫", "ネコ", "ネコ", "neko", 0.0,
        )]);
        let ranked = search_candidates("ﾈｺ", None, &dict, &SearchConfig::default(), None)
            .await
            .unwrap();
        assert_eq!(ranked[0].phonetic_score, 1.0);
    }

    #[tokio::test]
    async fn morph_result_does_not_change_results() {
        let morph = MorphResult::from_mecab_output("猫\t名詞,*,*,*,*,*,猫,ネコ,ネコ\nEOS\n");
        let config = SearchConfig::default();

        let with = search_candidates("ねこ", Some(&morph), &dictionary(), &config, None)
            .await
            .unwrap();
        let without = search_candidates("ねこ", None, &dictionary(), &config, None)
            .await
            .unwrap();
        assert_eq!(with, without);
    }
}
