pub mod engine;
pub mod kana;
pub mod mecab;
pub mod search;

pub use engine::{JapaneseEngine, Snapshot};
pub use mecab::MecabAnalyzer;
pub use search::{EmbeddingContext, search_candidates};
