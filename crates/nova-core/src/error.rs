/// Failures that abort a search call.
///
/// Transport, parse and resource-absence problems never surface here; they
/// degrade the affected score component or fall back to defaults instead.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("Invalid search config: {0}")]
    InvalidConfig(String),
}
