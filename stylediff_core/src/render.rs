//! Terminal presentation of [`ComparisonResult`] values.

use std::io::{self, Write};

use console::Style;

use crate::{ComparisonResult, Error, Strategy};

/// Writes human-readable comparison output, optionally with ANSI colors.
#[derive(Debug, Clone)]
pub struct Renderer {
    addition: Style,
    deletion: Style,
    hunk: Style,
    modified: Style,
    warning: Style,
    error: Style,
    heading: Style,
    plain: Style,
}

impl Renderer {
    /// Build a renderer. With `colored` false every style is a no-op.
    #[must_use]
    pub fn new(colored: bool) -> Self {
        let style = |style: Style| style.force_styling(colored);
        Self {
            addition: style(Style::new().green()),
            deletion: style(Style::new().red()),
            hunk: style(Style::new().cyan()),
            modified: style(Style::new().yellow()),
            warning: style(Style::new().yellow()),
            error: style(Style::new().red().bold()),
            heading: style(Style::new().bold()),
            plain: Style::new(),
        }
    }

    /// Print warnings, the summary, the truncated diff window and the report path.
    ///
    /// # Errors
    ///
    /// Propagates failures from `out`.
    pub fn render(&self, out: &mut impl Write, result: &ComparisonResult) -> io::Result<()> {
        for warning in &result.warnings {
            writeln!(out, "{}", self.warning.apply_to(format!("Warning: {warning}")))?;
        }

        writeln!(out, "{}", self.heading.apply_to("Summary:"))?;
        match result.strategy {
            Strategy::Textual => {
                writeln!(out, "  Added lines: {}", result.summary.added)?;
                writeln!(out, "  Removed lines: {}", result.summary.removed)?;
            }
            Strategy::Structural => {
                writeln!(out, "  Added: {}", result.summary.added)?;
                writeln!(out, "  Removed: {}", result.summary.removed)?;
                writeln!(out, "  Modified: {}", result.summary.modified.unwrap_or(0))?;
            }
        }

        if result.total_lines == 0 {
            writeln!(out)?;
            writeln!(out, "No differences found.")?;
        } else {
            self.render_window(out, result)?;
        }

        if let Some(path) = &result.report_path {
            writeln!(out)?;
            writeln!(out, "Full diff report saved to: {path}")?;
        }
        Ok(())
    }

    fn render_window(&self, out: &mut impl Write, result: &ComparisonResult) -> io::Result<()> {
        let shown = result.lines.len();
        let (heading, unit) = match result.strategy {
            Strategy::Textual => (format!("Diff (showing first {shown} lines):"), "lines"),
            Strategy::Structural => (format!("Details (showing first {shown}):"), "changes"),
        };
        writeln!(out)?;
        writeln!(out, "{}", self.heading.apply_to(heading))?;

        for line in &result.lines {
            writeln!(out, "{}", self.style_for(line).apply_to(line))?;
        }

        let hidden = result.hidden_lines();
        if hidden > 0 {
            writeln!(out, "... and {hidden} more {unit}.")?;
        }
        Ok(())
    }

    fn style_for(&self, line: &str) -> &Style {
        if line.starts_with("@@") {
            &self.hunk
        } else if line.starts_with('+') || line.starts_with("Added:") {
            &self.addition
        } else if line.starts_with('-') || line.starts_with("Removed:") {
            &self.deletion
        } else if line.starts_with("Modified:") {
            &self.modified
        } else {
            &self.plain
        }
    }

    /// Print a failure, one line per message line.
    ///
    /// # Errors
    ///
    /// Propagates failures from `out`.
    pub fn render_error(&self, out: &mut impl Write, error: &Error) -> io::Result<()> {
        for line in error.to_string().lines() {
            writeln!(out, "{}", self.error.apply_to(format!("Error: {line}")))?;
        }
        Ok(())
    }
}
