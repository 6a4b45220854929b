pub mod dictionary;
pub mod error;
pub mod morphology;
pub mod phonetic;
pub mod preprocess;
pub mod ranking;
pub mod similarity;
pub mod types;

pub use dictionary::{Dictionary, DictionaryEntry, DictionarySource};
pub use error::SearchError;
pub use similarity::EmbeddingVector;
pub use types::{Candidate, SearchConfig};
