use std::sync::Arc;

use clap::Parser;
use nova_config::Config;
use nova_core::Candidate;
use nova_core::morphology::{MorphAnalyzer, MorphResult};
use nova_embedding::OllamaEmbedder;
use nova_lang_japanese::{JapaneseEngine, MecabAnalyzer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

pub mod cli;

use self::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Info until the config says otherwise
    let filter = init_tracing(args.json);

    let mut config = Config::load(&args.config).with_env_overrides();
    if let Some(path) = &args.dictionary {
        config.dictionary_path = path.clone();
    }

    if let Err(e) = filter.reload(env_filter(config.debug_logging)) {
        tracing::warn!("Could not apply log level from config: {}", e);
    }

    let engine = build_engine(&config, args.no_embed);

    if args.warm {
        engine.warm_cache().await;
    }

    let analyzer = args.morph.then(MecabAnalyzer::default);
    let mut failed = false;

    for input in &args.inputs {
        let morph = match &analyzer {
            Some(analyzer) => analyze(analyzer.clone(), input.clone()).await,
            None => None,
        };

        match engine.search(input, morph.as_ref()).await {
            Ok(candidates) => print_candidates(input, &candidates),
            Err(e) => {
                tracing::error!("Search for '{}' failed: {}", input, e);
                failed = true;
            }
        }
    }

    if failed {
        anyhow::bail!("one or more searches failed");
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn env_filter(debug: bool) -> EnvFilter {
    let default_level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn init_tracing(json: bool) -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(env_filter(false));

    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();

    handle
}

fn build_engine(config: &Config, no_embed: bool) -> JapaneseEngine {
    let engine = JapaneseEngine::from_config(config.search_config())
        .with_concurrency(config.max_concurrent_requests);

    if no_embed {
        tracing::info!("Embeddings disabled, ranking on phonetics only");
        return engine;
    }

    match OllamaEmbedder::with_timeout(
        &config.ollama_url,
        &config.embedding_model,
        config.embedding_timeout(),
    ) {
        Ok(embedder) => engine.with_embedder(Arc::new(embedder)),
        Err(e) => {
            tracing::warn!("Embedding client unavailable: {}", e);
            engine
        }
    }
}

/// The analyzer is a blocking external call; failures only lose the enrichment
async fn analyze(analyzer: MecabAnalyzer, text: String) -> Option<MorphResult> {
    match tokio::task::spawn_blocking(move || analyzer.analyze(&text)).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            tracing::warn!("Morphological analysis failed: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("Analyzer task panicked: {e}");
            None
        }
    }
}

fn print_candidates(input: &str, candidates: &[Candidate]) {
    println!("{input}");
    if candidates.is_empty() {
        println!("  (no candidates)");
        return;
    }

    for (rank, c) in candidates.iter().enumerate() {
        println!(
            "  {:>2}. {} [{}] combined={:.3} embedding={:.3} phonetic={:.3}",
            rank + 1,
            c.text,
            c.reading,
            c.combined_score,
            c.embedding_score,
            c.phonetic_score
        );
    }
}
