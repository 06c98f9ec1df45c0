//! Core library for comparing CSS stylesheets.
//!
//! The crate is layered around four responsibilities:
//! - lenient parsing into a rule list ([`parser`])
//! - canonical re-serialization ([`canonical`])
//! - textual and structural diffing ([`diff`])
//! - the file-level comparison, reports and terminal output ([`compare`],
//!   [`report`], [`render`])

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Canonical text form of parsed stylesheets.
pub mod canonical;
/// File-level comparison entry point.
pub mod compare;
/// Textual and structural diff strategies.
pub mod diff;
/// Stylesheet parsing built on `cssparser`.
pub mod parser;
/// Colored terminal output for comparison results.
pub mod render;
/// Full report files.
pub mod report;

pub use compare::{compare_css, CompareOptions};
pub use diff::{DiffEngine, DiffOutcome, Side};
pub use parser::{parse, parse_file, ParseError};
pub use render::Renderer;
pub use report::ReportWriter;
pub use stylediff_api::{
    AtRule, AtRuleBody, Comment, ComparisonResult, Declaration, DiffHunk, DiffLine, DiffLineKind,
    DiffRange, DiffSummary, FileWarning, ParseWarning, Rule, RuleChange, RuleChangeKind, Strategy,
    StyleRule, Stylesheet, UnifiedDiff,
};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stylesheet could not be read from disk.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that failed to load.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// Stylesheet text contained an unrecoverable syntax error.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path of the offending stylesheet.
        path: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// Both inputs failed to load.
    #[error("{first}\n{second}")]
    Composite {
        /// Failure for the first stylesheet.
        first: Box<Error>,
        /// Failure for the second stylesheet.
        second: Box<Error>,
    },
    /// Report file could not be written.
    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        /// Destination of the report.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Paths of the stylesheets involved in this failure.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::FileRead { path, .. }
            | Self::Parse { path, .. }
            | Self::ReportWrite { path, .. } => vec![path.as_str()],
            Self::Composite { first, second } => {
                let mut paths = first.paths();
                paths.extend(second.paths());
                paths
            }
        }
    }
}
