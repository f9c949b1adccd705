//! Screenshot artifact naming and writing.
//!
//! Names depend only on the scenario name, the step index and the step label,
//! so repeated runs overwrite the same files and can be diffed.

use std::path::{Path, PathBuf};

use crate::result::VerifyResult;

/// Label used for captures without one
pub const DEFAULT_CAPTURE_LABEL: &str = "capture";

/// Replace anything outside `[A-Za-z0-9_-]` with `_`
#[must_use]
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

/// Writes screenshots for one scenario
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
    scenario: String,
}

impl ArtifactWriter {
    /// Create a writer rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, scenario: &str) -> Self {
        Self {
            dir: dir.into(),
            scenario: sanitize(scenario),
        }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a `capture` step: `<scenario>-<index>-<label>.png`
    #[must_use]
    pub fn capture_path(&self, index: usize, label: Option<&str>) -> PathBuf {
        let label = sanitize(label.unwrap_or(DEFAULT_CAPTURE_LABEL));
        self.dir
            .join(format!("{}-{index:02}-{label}.png", self.scenario))
    }

    /// Path for the failure diagnostic: `<scenario>-error-<index>.png`, or
    /// `<scenario>-error-seed.png` when no step had started
    #[must_use]
    pub fn diagnostic_path(&self, step_index: Option<usize>) -> PathBuf {
        let name = match step_index {
            Some(index) => format!("{}-error-{index:02}.png", self.scenario),
            None => format!("{}-error-seed.png", self.scenario),
        };
        self.dir.join(name)
    }

    /// Write image bytes, creating the directory when needed
    pub fn write(&self, path: &Path, bytes: &[u8]) -> VerifyResult<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(path.to_path_buf())
    }
}
