//! File-level comparison of two stylesheets.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::{
    diff::{DiffEngine, Side},
    parser::parse_file,
    report::ReportWriter,
    ComparisonResult, Error, FileWarning, Result, Strategy, Stylesheet,
};

/// Knobs for [`compare_css`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Maximum number of diff lines kept for display (textual strategy).
    pub max_lines: usize,
    /// Maximum number of detail entries kept for display (structural strategy).
    pub max_details: usize,
    /// Write the complete diff to a report file.
    pub full_report: bool,
    /// Comparison strategy.
    pub strategy: Strategy,
    /// Directory that receives report files.
    pub report_dir: Utf8PathBuf,
}

impl CompareOptions {
    /// Default for [`CompareOptions::max_lines`].
    pub const DEFAULT_MAX_LINES: usize = 100;
    /// Default for [`CompareOptions::max_details`].
    pub const DEFAULT_MAX_DETAILS: usize = 10;

    /// Number of lines kept in [`ComparisonResult::lines`] for the configured strategy.
    #[must_use]
    pub const fn display_limit(&self) -> usize {
        match self.strategy {
            Strategy::Textual => self.max_lines,
            Strategy::Structural => self.max_details,
        }
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            max_lines: Self::DEFAULT_MAX_LINES,
            max_details: Self::DEFAULT_MAX_DETAILS,
            full_report: false,
            strategy: Strategy::default(),
            report_dir: Utf8PathBuf::from("."),
        }
    }
}

/// Compare two stylesheet files.
///
/// Both files are read and parsed before anything is compared; a failure on
/// either side aborts the comparison.
///
/// # Errors
///
/// Returns [`Error::FileRead`] or [`Error::Parse`] naming the failing file,
/// [`Error::Composite`] when both files fail, and [`Error::ReportWrite`] when
/// a requested report cannot be written.
pub fn compare_css(
    path_a: impl AsRef<Utf8Path>,
    path_b: impl AsRef<Utf8Path>,
    options: &CompareOptions,
) -> Result<ComparisonResult> {
    let (path_a, path_b) = (path_a.as_ref(), path_b.as_ref());

    let (old, new) = match (parse_file(path_a), parse_file(path_b)) {
        (Ok(old), Ok(new)) => (old, new),
        (Err(first), Err(second)) => {
            return Err(Error::Composite {
                first: Box::new(first),
                second: Box::new(second),
            })
        }
        (Err(error), Ok(_)) | (Ok(_), Err(error)) => return Err(error),
    };

    let outcome = DiffEngine::new(options.strategy).diff(
        Side::new(path_a.as_str(), &old),
        Side::new(path_b.as_str(), &new),
    );

    let total_lines = outcome.body.len();
    let mut lines = outcome.body;
    lines.truncate(options.display_limit());
    debug!(total_lines, shown = lines.len(), "truncated diff for display");

    let mut result = ComparisonResult {
        strategy: options.strategy,
        summary: outcome.summary,
        diff: outcome.text,
        lines,
        total_lines,
        warnings: file_warnings(path_a, &old)
            .chain(file_warnings(path_b, &new))
            .collect(),
        report_path: None,
    };

    if options.full_report {
        let path = ReportWriter::new(&options.report_dir).write(&result)?;
        info!(%path, "wrote full report");
        result.report_path = Some(path.into_string());
    }

    Ok(result)
}

fn file_warnings<'a>(
    path: &'a Utf8Path,
    sheet: &'a Stylesheet,
) -> impl Iterator<Item = FileWarning> + 'a {
    sheet.warnings.iter().map(move |warning| FileWarning {
        path: path.to_string(),
        line: warning.line,
        message: warning.message.clone(),
    })
}
