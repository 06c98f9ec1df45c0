use std::fmt;

use serde::{Deserialize, Serialize};

/// A unified diff between two canonical stylesheet texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedDiff {
    /// Label written on the `---` header line.
    pub old_label: String,
    /// Label written on the `+++` header line.
    pub new_label: String,
    /// Hunks in file order; empty when both sides are identical.
    #[serde(default)]
    pub hunks: Vec<DiffHunk>,
}

impl UnifiedDiff {
    /// Body lines (hunk headers and prefixed content), without the file header.
    #[must_use]
    pub fn body_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for hunk in &self.hunks {
            lines.push(hunk.header.to_string());
            lines.extend(hunk.lines.iter().map(ToString::to_string));
        }
        lines
    }

    /// Summary derived from the rendered body lines.
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_patch_lines(self.body_lines().iter().map(String::as_str))
    }

    /// Returns `true` when the two sides had no differences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {}", self.old_label)?;
        writeln!(f, "+++ {}", self.new_label)?;
        for line in self.body_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Counts of changed items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiffSummary {
    /// Number of added lines (textual) or rules (structural).
    pub added: u32,
    /// Number of removed lines (textual) or rules (structural).
    pub removed: u32,
    /// Number of modified rules; only reported by the structural strategy.
    #[serde(default)]
    pub modified: Option<u32>,
}

impl DiffSummary {
    /// A summary with nothing changed.
    pub const ZERO: Self = Self {
        added: 0,
        removed: 0,
        modified: None,
    };

    /// Summary for the textual strategy, which has no notion of modification.
    #[must_use]
    pub const fn new_textual(added: u32, removed: u32) -> Self {
        Self {
            added,
            removed,
            modified: None,
        }
    }

    /// Summary for the structural strategy.
    #[must_use]
    pub const fn new_structural(added: u32, removed: u32, modified: u32) -> Self {
        Self {
            added,
            removed,
            modified: Some(modified),
        }
    }

    /// Count `+` and `-` lines of a patch body.
    ///
    /// The `---`/`+++` file header must not be part of `lines`.
    pub fn from_patch_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        lines
            .into_iter()
            .fold(Self::ZERO, |mut summary, line| {
                if line.starts_with('+') {
                    summary.added += 1;
                } else if line.starts_with('-') {
                    summary.removed += 1;
                }
                summary
            })
    }

    /// Count the `Added:`/`Removed:`/`Modified:` entries of a structural report.
    pub fn from_detail_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut summary = Self::new_structural(0, 0, 0);
        for line in lines {
            match RuleChangeKind::from_detail_line(line) {
                Some(RuleChangeKind::Added) => summary.added += 1,
                Some(RuleChangeKind::Removed) => summary.removed += 1,
                Some(RuleChangeKind::Modified) => {
                    summary.modified = summary.modified.map(|count| count + 1);
                }
                None => {}
            }
        }
        summary
    }

    /// Returns `true` when nothing was added, removed or modified.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.modified.unwrap_or(0) == 0
    }
}

/// A diff hunk containing a contiguous set of changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    /// The range header describing the hunk offsets.
    pub header: DiffRange,
    /// Line-level changes inside the hunk.
    #[serde(default)]
    pub lines: Vec<DiffLine>,
}

/// The line number ranges referenced by a hunk header.
///
/// Starts are 0-based offsets into each side; rendering converts them to the
/// 1-based unified diff convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRange {
    /// Offset of the first line on the old side.
    pub old_start: u32,
    /// Number of lines covered on the old side.
    pub old_lines: u32,
    /// Offset of the first line on the new side.
    pub new_start: u32,
    /// Number of lines covered on the new side.
    pub new_lines: u32,
}

impl fmt::Display for DiffRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{} +{} @@",
            HunkSide(self.old_start, self.old_lines),
            HunkSide(self.new_start, self.new_lines)
        )
    }
}

struct HunkSide(u32, u32);

impl fmt::Display for HunkSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(start, len) = *self;
        match len {
            // An empty side points at the line before the insertion.
            0 => write!(f, "{start},0"),
            1 => write!(f, "{}", start + 1),
            _ => write!(f, "{},{len}", start + 1),
        }
    }
}

/// A single line within a diff hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// The role the line plays in the diff (context, addition, deletion).
    pub kind: DiffLineKind,
    /// Line text without the trailing newline.
    pub text: String,
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.text)
    }
}

/// Type of a line contained in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    /// Unchanged context line.
    Context,
    /// A newly added line.
    Addition,
    /// A deleted line.
    Deletion,
}

impl DiffLineKind {
    /// Marker character used in unified diff output.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Addition => '+',
            Self::Deletion => '-',
        }
    }
}

/// One entry of a structural (rule-by-rule) comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleChange {
    /// What happened to the rule.
    pub kind: RuleChangeKind,
    /// Label of the rule (selectors, at-rule name, ...).
    pub label: String,
    /// Position of the rule in its rule list.
    pub index: usize,
}

impl fmt::Display for RuleChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.label)
    }
}

/// Classification of a structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleChangeKind {
    /// Rule only exists in the second stylesheet.
    Added,
    /// Rule only exists in the first stylesheet.
    Removed,
    /// Rule exists at the same position in both with different content.
    Modified,
}

impl RuleChangeKind {
    /// Word used at the start of a detail line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Modified => "Modified",
        }
    }

    /// Recover the kind from a rendered detail line.
    #[must_use]
    pub fn from_detail_line(line: &str) -> Option<Self> {
        [Self::Added, Self::Removed, Self::Modified]
            .into_iter()
            .find(|kind| {
                line.strip_prefix(kind.as_str())
                    .is_some_and(|rest| rest.starts_with(':'))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_diff() -> UnifiedDiff {
        UnifiedDiff {
            old_label: "a.css".into(),
            new_label: "b.css".into(),
            hunks: vec![DiffHunk {
                header: DiffRange {
                    old_start: 0,
                    old_lines: 3,
                    new_start: 0,
                    new_lines: 3,
                },
                lines: vec![
                    DiffLine {
                        kind: DiffLineKind::Context,
                        text: "body {".into(),
                    },
                    DiffLine {
                        kind: DiffLineKind::Deletion,
                        text: "  color: black;".into(),
                    },
                    DiffLine {
                        kind: DiffLineKind::Addition,
                        text: "  color: white;".into(),
                    },
                    DiffLine {
                        kind: DiffLineKind::Context,
                        text: "}".into(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn display_writes_header_then_hunks() {
        let text = color_diff().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "--- a.css",
                "+++ b.css",
                "@@ -1,3 +1,3 @@",
                " body {",
                "-  color: black;",
                "+  color: white;",
                " }",
            ]
        );
    }

    #[test]
    fn summary_ignores_file_header() {
        let summary = color_diff().summary();
        assert_eq!(summary, DiffSummary::new_textual(1, 1));
    }

    #[test]
    fn hunk_side_formats_match_unified_convention() {
        let range = DiffRange {
            old_start: 4,
            old_lines: 0,
            new_start: 4,
            new_lines: 1,
        };
        assert_eq!(range.to_string(), "@@ -4,0 +5 @@");
    }

    #[test]
    fn detail_lines_are_counted_by_kind() {
        let summary = DiffSummary::from_detail_lines([
            "Removed: .a",
            "Modified: body",
            "Modified: @media screen",
            "Added: .z",
            "Addedd: not a detail",
        ]);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.modified, Some(2));
    }

    #[test]
    fn rule_change_round_trips_through_its_line() {
        let change = RuleChange {
            kind: RuleChangeKind::Modified,
            label: "h1, h2".into(),
            index: 3,
        };
        let line = change.to_string();
        assert_eq!(line, "Modified: h1, h2");
        assert_eq!(
            RuleChangeKind::from_detail_line(&line),
            Some(RuleChangeKind::Modified)
        );
    }

    #[test]
    fn encoded_uses_snake_case() {
        let json = serde_json::to_string(&DiffLineKind::Addition).expect("serialize line kind");
        assert_eq!(json, "\"addition\"");
        let kind: RuleChangeKind = serde_json::from_str("\"removed\"").expect("deserialize kind");
        assert_eq!(kind, RuleChangeKind::Removed);
    }
}
