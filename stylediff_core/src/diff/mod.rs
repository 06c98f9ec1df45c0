//! Diff generation over parsed stylesheets.

mod structural;
mod textual;

pub use structural::rule_changes;
pub use textual::unified_diff;

use tracing::debug;

use crate::{canonical::to_canonical_text, DiffSummary, Strategy, Stylesheet};

/// Lines of unchanged context around each textual hunk.
pub const DEFAULT_CONTEXT_LINES: usize = 4;

/// One side of a comparison.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    /// Name written into headers (usually the file path).
    pub label: &'a str,
    /// Parsed stylesheet for this side.
    pub stylesheet: &'a Stylesheet,
}

impl<'a> Side<'a> {
    /// Pair a label with its stylesheet.
    #[must_use]
    pub const fn new(label: &'a str, stylesheet: &'a Stylesheet) -> Self {
        Self { label, stylesheet }
    }
}

/// Result of running a diff strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Counts derived from `body`.
    pub summary: DiffSummary,
    /// Full report text, including any file header.
    pub text: String,
    /// Displayable lines: hunk lines for textual diffs, detail entries for
    /// structural ones. Never contains the `---`/`+++` header.
    pub body: Vec<String>,
}

/// Entry point for diff generation.
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine {
    strategy: Strategy,
    context_lines: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl DiffEngine {
    /// Construct a diff engine for the given strategy.
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Override the number of context lines used by the textual strategy.
    #[must_use]
    pub const fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Compare two stylesheets.
    #[must_use]
    pub fn diff(&self, old: Side<'_>, new: Side<'_>) -> DiffOutcome {
        let outcome = match self.strategy {
            Strategy::Textual => {
                let diff = unified_diff(
                    &to_canonical_text(old.stylesheet),
                    &to_canonical_text(new.stylesheet),
                    old.label,
                    new.label,
                    self.context_lines,
                );
                let body = diff.body_lines();
                DiffOutcome {
                    summary: DiffSummary::from_patch_lines(body.iter().map(String::as_str)),
                    text: diff.to_string(),
                    body,
                }
            }
            Strategy::Structural => {
                let body: Vec<String> = rule_changes(old.stylesheet, new.stylesheet)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                let mut text = body.join("\n");
                if !text.is_empty() {
                    text.push('\n');
                }
                DiffOutcome {
                    summary: DiffSummary::from_detail_lines(body.iter().map(String::as_str)),
                    text,
                    body,
                }
            }
        };

        debug!(
            strategy = %self.strategy,
            lines = outcome.body.len(),
            added = outcome.summary.added,
            removed = outcome.summary.removed,
            "computed diff"
        );
        outcome
    }
}
