//! Command-line front end: `css-compare <file1> <file2> [--full-report]`.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{error::ErrorKind, ArgAction, Parser};
use stylediff_core::{compare_css, CompareOptions, Renderer, Strategy};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Compare two CSS files and summarize the differences.
#[derive(Debug, Parser)]
#[command(name = "css-compare", version, about)]
struct Cli {
    /// Original stylesheet
    file1: Utf8PathBuf,

    /// Stylesheet to compare against
    file2: Utf8PathBuf,

    /// Write the complete diff to a timestamped report file
    #[arg(long)]
    full_report: bool,

    /// Comparison strategy: `textual` or `structural`
    #[arg(long, env = "STYLEDIFF_STRATEGY", default_value_t = Strategy::Textual)]
    strategy: Strategy,

    /// Maximum diff lines shown by the textual strategy
    #[arg(long, env = "STYLEDIFF_MAX_LINES", default_value_t = CompareOptions::DEFAULT_MAX_LINES)]
    max_lines: usize,

    /// Maximum change entries shown by the structural strategy
    #[arg(long, env = "STYLEDIFF_MAX_DETAILS", default_value_t = CompareOptions::DEFAULT_MAX_DETAILS)]
    max_details: usize,

    /// Directory receiving full reports
    #[arg(long, env = "STYLEDIFF_REPORT_DIR", default_value = ".")]
    report_dir: Utf8PathBuf,

    /// Print the comparison result as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> CompareOptions {
        CompareOptions {
            max_lines: self.max_lines,
            max_details: self.max_details,
            full_report: self.full_report,
            strategy: self.strategy,
            report_dir: self.report_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let renderer = Renderer::new(!cli.no_color && console::colors_enabled_stderr());
            let mut stderr = io::stderr().lock();
            let _ = match err.downcast_ref::<stylediff_core::Error>() {
                Some(error) => renderer.render_error(&mut stderr, error),
                None => writeln!(stderr, "Error: {err:#}"),
            };
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    debug!(file1 = %cli.file1, file2 = %cli.file2, strategy = %cli.strategy, "comparing");
    let result = compare_css(&cli.file1, &cli.file2, &cli.options())?;

    let mut stdout = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &result).context("failed to encode result")?;
        writeln!(stdout)?;
    } else {
        Renderer::new(!cli.no_color && console::colors_enabled())
            .render(&mut stdout, &result)
            .context("failed to write output")?;
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("STYLEDIFF_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = Cli::try_parse_from([
            "css-compare",
            "a.css",
            "b.css",
            "--full-report",
            "--strategy",
            "structural",
            "--max-details",
            "3",
            "--report-dir",
            "out",
        ])
        .expect("valid arguments");
        let options = cli.options();
        assert!(options.full_report);
        assert_eq!(options.strategy, Strategy::Structural);
        assert_eq!(options.max_details, 3);
        assert_eq!(options.report_dir, Utf8PathBuf::from("out"));
        assert_eq!(cli.file1, Utf8PathBuf::from("a.css"));
    }

    #[test]
    fn missing_second_file_is_rejected() {
        let err = Cli::try_parse_from(["css-compare", "a.css"]).expect_err("missing argument");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
