use std::path::Path;

/// Single conversion entry as stored in the dictionary file
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
    /// Target-script spelling, e.g. "今日は"
    pub target_form: String,
    /// Primary kana reading used for phonetic comparison
    pub reading: String,
    /// Alternate reading, usually katakana
    pub alternate_reading: String,
    pub romanized_form: String,
    /// Non-negative usage weight
    pub frequency: f32,
}

impl DictionaryEntry {
    pub fn new(
        target_form: impl Into<String>,
        reading: impl Into<String>,
        alternate_reading: impl Into<String>,
        romanized_form: impl Into<String>,
        frequency: f32,
    ) -> Self {
        Self {
            target_form: target_form.into(),
            reading: reading.into(),
            alternate_reading: alternate_reading.into(),
            romanized_form: romanized_form.into(),
            frequency,
        }
    }
}

/// Where the loaded entries came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    File(String),
    Fallback,
    Memory,
}

impl std::fmt::Display for DictionarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{path}"),
            Self::Fallback => write!(f, "built-in fallback"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Read-only candidate store, shared across concurrent searches
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    source: DictionarySource,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

const FALLBACK_ENTRIES: [(&str, &str, &str, &str, f32); 5] = [
    ("こんにちは", "こんにちは", "コンニチハ", "konnichiwa", 1.0),
    ("ありがとう", "ありがとう", "アリガトウ", "arigatou", 0.9),
    ("さようなら", "さようなら", "サヨウナラ", "sayounara", 0.8),
    ("おはよう", "おはよう", "オハヨウ", "ohayou", 0.85),
    ("こんばんは", "こんばんは", "コンバンハ", "konbanwa", 0.75),
];

impl Dictionary {
    /// Build a dictionary from already-parsed entries
    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        Self {
            entries,
            source: DictionarySource::Memory,
        }
    }

    /// Built-in set of common phrases used when no dictionary file is usable
    pub fn fallback() -> Self {
        let entries = FALLBACK_ENTRIES
            .iter()
            .map(|(target, reading, alternate, romanized, frequency)| {
                DictionaryEntry::new(*target, *reading, *alternate, *romanized, *frequency)
            })
            .collect();

        Self {
            entries,
            source: DictionarySource::Fallback,
        }
    }

    /// Load a dictionary file, falling back to the built-in set on any I/O failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(dict) => {
                tracing::info!(
                    "Loaded {} dictionary entries from {}",
                    dict.len(),
                    path.display()
                );
                dict
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load dictionary from {}: {}, using built-in fallback",
                    path.display(),
                    e
                );
                Self::fallback()
            }
        }
    }

    /// Load a dictionary file without falling back
    pub fn try_load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut dict = Self::parse(&content);
        dict.source = DictionarySource::File(path.display().to_string());
        Ok(dict)
    }

    /// Parse `target,reading,alternate,romanized,frequency` lines.
    /// Malformed lines are dropped.
    pub fn parse(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Some(entry) => entries.push(entry),
                None => {
                    skipped += 1;
                    tracing::debug!("Skipping malformed dictionary line {}: {}", line_no + 1, line);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} malformed dictionary lines", skipped);
        }

        Self {
            entries,
            source: DictionarySource::Memory,
        }
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> &DictionarySource {
        &self.source
    }
}

fn parse_line(line: &str) -> Option<DictionaryEntry> {
    let mut fields = line.split(',').map(str::trim);

    let target = fields.next().filter(|f| !f.is_empty())?;
    let reading = fields.next().filter(|f| !f.is_empty())?;
    let alternate = fields.next()?;
    let romanized = fields.next()?;
    let frequency: f32 = fields.next()?.parse().ok()?;

    if !frequency.is_finite() || frequency < 0.0 {
        return None;
    }

    Some(DictionaryEntry::new(
        target, reading, alternate, romanized, frequency,
    ))
}
