//! Full diff reports written next to the comparison.

use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};

use crate::{ComparisonResult, Error, Result, Strategy};

/// Writes complete comparison output to timestamped files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWriter {
    dir: Utf8PathBuf,
}

impl ReportWriter {
    /// Construct a writer targeting `dir`.
    pub fn new(dir: impl AsRef<Utf8Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File name for a report produced at `unix_millis`.
    #[must_use]
    pub fn file_name(strategy: Strategy, unix_millis: u128) -> String {
        match strategy {
            Strategy::Textual => format!("css_diff_report_{unix_millis}.diff"),
            Strategy::Structural => format!("css_comparison_report_{unix_millis}.txt"),
        }
    }

    /// Write the full diff of `result`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportWrite`] if the directory cannot be created or
    /// the file cannot be written.
    pub fn write(&self, result: &ComparisonResult) -> Result<Utf8PathBuf> {
        self.write_at(result, SystemTime::now())
    }

    /// Write the full diff of `result`, stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportWrite`] if the directory cannot be created or
    /// the file cannot be written.
    pub fn write_at(&self, result: &ComparisonResult, at: SystemTime) -> Result<Utf8PathBuf> {
        let millis = at
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis());
        let path = self.dir.join(Self::file_name(result.strategy, millis));

        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, &result.diff))
            .map_err(|source| Error::ReportWrite {
                path: path.to_string(),
                source,
            })?;

        Ok(path)
    }
}
