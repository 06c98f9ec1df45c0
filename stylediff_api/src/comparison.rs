use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::diff::DiffSummary;

/// How two stylesheets are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Unified line diff of the canonical texts.
    #[default]
    Textual,
    /// Rule-by-rule comparison by position.
    Structural,
}

impl Strategy {
    /// Identifier used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Textual => "textual",
            Self::Structural => "structural",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "textual" | "text" => Ok(Self::Textual),
            "structural" | "rules" => Ok(Self::Structural),
            other => Err(format!(
                "unknown strategy `{other}` (expected `textual` or `structural`)"
            )),
        }
    }
}

/// Outcome of comparing two stylesheet files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Strategy that produced this result.
    pub strategy: Strategy,
    /// Counts derived from the diff lines.
    pub summary: DiffSummary,
    /// Complete diff text (unified diff or structural detail list).
    pub diff: String,
    /// Leading slice of the diff body kept for interactive display.
    #[serde(default)]
    pub lines: Vec<String>,
    /// Number of body lines before truncation.
    pub total_lines: usize,
    /// Parse warnings recorded for either input.
    #[serde(default)]
    pub warnings: Vec<FileWarning>,
    /// Location of the written report, when one was requested.
    #[serde(default)]
    pub report_path: Option<String>,
}

impl ComparisonResult {
    /// Number of body lines left out of [`ComparisonResult::lines`].
    #[must_use]
    pub fn hidden_lines(&self) -> usize {
        self.total_lines.saturating_sub(self.lines.len())
    }
}

/// A parse warning tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWarning {
    /// Path of the stylesheet as given by the caller.
    pub path: String,
    /// 1-based line of the problem.
    pub line: u32,
    /// Description of the skipped construct.
    pub message: String,
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.path, self.line, self.message)
    }
}
