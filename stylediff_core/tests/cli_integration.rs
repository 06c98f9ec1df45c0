use std::process::{Command, Output};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

struct Fixture {
    temp: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let root = Utf8Path::from_path(temp.path())
            .expect("utf8 tempdir")
            .to_path_buf();
        Self { temp, root }
    }

    fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_css-compare"))
            .args(args)
            .arg("--no-color")
            .current_dir(self.temp.path())
            .env_remove("STYLEDIFF_STRATEGY")
            .env_remove("STYLEDIFF_MAX_LINES")
            .env_remove("STYLEDIFF_MAX_DETAILS")
            .env_remove("STYLEDIFF_REPORT_DIR")
            .env_remove("STYLEDIFF_LOG")
            .output()
            .expect("run css-compare")
    }

    fn color_pair(&self) -> (Utf8PathBuf, Utf8PathBuf) {
        (
            self.write("a.css", "body {\n  color: black;\n}\n"),
            self.write("b.css", "body {\n  color: white;\n}\n"),
        )
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("utf8 stderr")
}

#[test]
fn differing_files_print_summary_and_diff() {
    let fixture = Fixture::new();
    let (a, b) = fixture.color_pair();

    let output = fixture.run(&[a.as_str(), b.as_str()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Summary:\n  Added lines: 1\n  Removed lines: 1\n"));
    assert!(out.contains("\n-  color: black;\n"));
    assert!(out.contains("\n+  color: white;\n"));
    assert!(!out.contains("saved to"));
}

#[test]
fn identical_files_exit_successfully() {
    let fixture = Fixture::new();
    let a = fixture.write("a.css", "a { margin: 0 }");
    let b = fixture.write("b.css", "a{margin:0}");

    let output = fixture.run(&[a.as_str(), b.as_str()]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No differences found."));
}

#[test]
fn missing_argument_exits_with_failure() {
    let fixture = Fixture::new();
    let a = fixture.write("a.css", "a { margin: 0 }");

    let output = fixture.run(&[a.as_str()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(!stderr(&output).is_empty());
}

#[test]
fn help_exits_successfully() {
    let output = Fixture::new().run(&["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--full-report"));
}

#[test]
fn unreadable_file_is_reported_on_stderr() {
    let fixture = Fixture::new();
    let a = fixture.write("a.css", "a { margin: 0 }");
    let missing = fixture.root.join("missing.css");

    let output = fixture.run(&[a.as_str(), missing.as_str()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(
        err.lines()
            .any(|line| line.starts_with("Error: failed to read") && line.contains("missing.css")),
        "stderr: {err}"
    );
}

#[test]
fn both_files_failing_prints_one_error_line_each() {
    let fixture = Fixture::new();
    let missing = fixture.root.join("missing.css");
    let broken = fixture.write("broken.css", "a { color: red }\nnot a rule\n");

    let output = fixture.run(&[missing.as_str(), broken.as_str()]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    let errors: Vec<&str> = err.lines().filter(|line| line.starts_with("Error: ")).collect();
    assert_eq!(errors.len(), 2, "stderr: {err}");
    assert!(errors[0].starts_with("Error: failed to read"));
    assert!(errors[1].starts_with("Error: failed to parse"));
}

#[test]
fn unparsable_css_is_reported_on_stderr() {
    let fixture = Fixture::new();
    let a = fixture.write("a.css", "a { margin: 0 }");
    let b = fixture.write("b.css", "a { margin: 0 }\n\n{ color: red }\n");

    let output = fixture.run(&[a.as_str(), b.as_str()]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(
        err.lines()
            .any(|line| line.starts_with("Error: failed to parse") && line.contains("b.css")),
        "stderr: {err}"
    );
}

#[test]
fn full_report_is_written_and_announced() {
    let fixture = Fixture::new();
    let (a, b) = fixture.color_pair();
    let reports = fixture.root.join("reports");

    let output = fixture.run(&[
        a.as_str(),
        b.as_str(),
        "--full-report",
        "--report-dir",
        reports.as_str(),
    ]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let path = out
        .lines()
        .find_map(|line| line.strip_prefix("Full diff report saved to: "))
        .expect("report line");
    assert!(path.starts_with(reports.as_str()));
    assert!(path.ends_with(".diff"));
    let report = std::fs::read_to_string(path).expect("read report");
    assert!(report.contains("\n-  color: black;\n"));
}

#[test]
fn json_output_carries_the_summary() {
    let fixture = Fixture::new();
    let (a, b) = fixture.color_pair();

    let output = fixture.run(&[a.as_str(), b.as_str(), "--json", "--strategy", "structural"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(value["strategy"], "structural");
    assert_eq!(value["summary"]["modified"], 1);
    assert_eq!(value["summary"]["added"], 0);
    assert!(value["report_path"].is_null());
}
