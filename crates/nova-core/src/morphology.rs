/// Morphological analysis interface.
///
/// The analyzer itself is an external collaborator; the engine only consumes
/// the node sequence it produces.
pub trait MorphAnalyzer: Send + Sync {
    /// Segment text into ordered nodes
    fn analyze(&self, text: &str) -> Result<MorphResult, MorphError>;
}

/// One segment of analyzed input
#[derive(Debug, Clone, PartialEq)]
pub struct MorphNode {
    pub surface: String,
    /// Comma-delimited grammatical features
    pub feature: String,
    pub reading: Option<String>,
    pub pronunciation: Option<String>,
    /// Character offsets into the analyzed text
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphResult {
    pub nodes: Vec<MorphNode>,
}

#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("Analyzer failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

const READING_FIELD: usize = 7;
const PRONUNCIATION_FIELD: usize = 8;

/// Extract a feature field by index; `*` and missing fields map to `None`
pub fn feature_field(feature: &str, index: usize) -> Option<&str> {
    feature
        .split(',')
        .nth(index)
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "*")
}

impl MorphNode {
    /// Build a node from surface and feature string at the given offset
    pub fn from_feature(surface: &str, feature: &str, start: usize) -> Self {
        let end = start + surface.chars().count();
        Self {
            surface: surface.to_string(),
            feature: feature.to_string(),
            reading: feature_field(feature, READING_FIELD).map(str::to_string),
            pronunciation: feature_field(feature, PRONUNCIATION_FIELD).map(str::to_string),
            start,
            end,
        }
    }
}

impl MorphResult {
    /// Parse analyzer output (`surface\tfeature` lines terminated by `EOS`)
    pub fn from_mecab_output(output: &str) -> Self {
        let mut nodes = Vec::new();
        let mut pos = 0;

        for line in output.lines() {
            if line == "EOS" {
                break;
            }
            let Some((surface, feature)) = line.split_once('\t') else {
                continue;
            };

            let node = MorphNode::from_feature(surface, feature, pos);
            pos = node.end;
            nodes.push(node);
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Concatenated reading, using the surface where no reading is known
    pub fn reading(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.reading.as_deref().unwrap_or(&n.surface))
            .collect()
    }
}
