use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use nova_core::morphology::{MorphAnalyzer, MorphError, MorphResult};

/// Morphological analyzer backed by an external `mecab` executable
#[derive(Debug, Clone)]
pub struct MecabAnalyzer {
    program: String,
    args: Vec<String>,
}

impl Default for MecabAnalyzer {
    fn default() -> Self {
        Self::new("mecab")
    }
}

impl MecabAnalyzer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra command-line arguments, e.g. `-d <dicdir>`
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl MorphAnalyzer for MecabAnalyzer {
    fn analyze(&self, text: &str) -> Result<MorphResult, MorphError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    MorphError::Unavailable(format!("{} not found", self.program))
                }
                _ => MorphError::IoError(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // The analyzer reads one sentence per line
            let line = text.replace(['\n', '\r'], " ");
            writeln!(stdin, "{line}")?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(MorphError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = MorphResult::from_mecab_output(&stdout);
        tracing::debug!("Analyzed '{}' into {} nodes", text, result.len());

        Ok(result)
    }
}
