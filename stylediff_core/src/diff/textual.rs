use similar::{ChangeTag, DiffOp, DiffTag, TextDiff};

use crate::{DiffHunk, DiffLine, DiffLineKind, DiffRange, UnifiedDiff};

/// Build a unified line diff between two texts.
#[must_use]
pub fn unified_diff(
    old: &str,
    new: &str,
    old_label: &str,
    new_label: &str,
    context_lines: usize,
) -> UnifiedDiff {
    let diff = TextDiff::from_lines(old, new);
    let hunks = diff
        .grouped_ops(context_lines)
        .iter()
        .filter(|group| group.iter().any(|op| op.tag() != DiffTag::Equal))
        .filter_map(|group| build_hunk(&diff, group))
        .collect();

    UnifiedDiff {
        old_label: old_label.to_owned(),
        new_label: new_label.to_owned(),
        hunks,
    }
}

fn build_hunk(diff: &TextDiff<'_, '_, '_, str>, ops: &[DiffOp]) -> Option<DiffHunk> {
    let first = ops.first()?;
    let last = ops.last()?;
    let old_range = first.old_range().start..last.old_range().end;
    let new_range = first.new_range().start..last.new_range().end;

    let lines = ops
        .iter()
        .flat_map(|op| diff.iter_changes(op))
        .map(|change| DiffLine {
            kind: match change.tag() {
                ChangeTag::Equal => DiffLineKind::Context,
                ChangeTag::Insert => DiffLineKind::Addition,
                ChangeTag::Delete => DiffLineKind::Deletion,
            },
            text: change.value().trim_end_matches(['\r', '\n']).to_owned(),
        })
        .collect();

    Some(DiffHunk {
        header: DiffRange {
            old_start: to_u32(old_range.start),
            old_lines: to_u32(old_range.len()),
            new_start: to_u32(new_range.start),
            new_lines: to_u32(new_range.len()),
        },
        lines,
    })
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
