use std::path::PathBuf;

use clap::Parser;

/// Rank Japanese conversion candidates for typed input
#[derive(Debug, Parser)]
#[command(name = "nova", version)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "resources/config.json")]
    pub config: PathBuf,

    /// Override the dictionary path from the configuration
    #[arg(short, long)]
    pub dictionary: Option<String>,

    /// Skip the embedding service and rank on phonetics alone
    #[arg(long)]
    pub no_embed: bool,

    /// Run the external morphological analyzer on each input
    #[arg(long)]
    pub morph: bool,

    /// Precompute dictionary embeddings before searching
    #[arg(long)]
    pub warm: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json: bool,

    /// Inputs to convert
    #[arg(required = true)]
    pub inputs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_inputs() {
        let args = Args::parse_from(["nova", "--no-embed", "-d", "dict.txt", "こんにちは", "ねこ"]);
        assert!(args.no_embed);
        assert_eq!(args.dictionary.as_deref(), Some("dict.txt"));
        assert_eq!(args.inputs, ["こんにちは", "ねこ"]);
        assert_eq!(args.config, PathBuf::from("resources/config.json"));
    }

    #[test]
    fn requires_an_input() {
        assert!(Args::try_parse_from(["nova"]).is_err());
    }
}
