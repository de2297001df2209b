// Drives the built `sieve` binary against throwaway projects.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tmp")).unwrap();
        fs::create_dir_all(dir.path().join("packages")).unwrap();
        fs::write(
            dir.path().join(".sieve.toml"),
            "sandbox = \"build/sandbox\"\ncolor = false\n",
        )
        .unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn sandbox(&self) -> PathBuf {
        self.root().join("build/sandbox")
    }

    fn package(&self, name: &str, manifest: &str) {
        let dir = self.root().join("packages").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("metadata.toml"),
            format!("name = \"{name}\"\nversion = \"0.3.0\"\n"),
        )
        .unwrap();
        fs::write(dir.join("Sievefile"), manifest).unwrap();
    }

    fn sieve(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_sieve"))
            .args(args)
            .current_dir(self.root())
            .env("TMPDIR", self.root().join("tmp"))
            .env_remove("SIEVE_DEBUG")
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn passing_package_exits_zero() {
    let project = Project::new();
    project.package("demo", "lint: echo linting $PACKAGE\n");

    let output = project.sieve(&["test", "demo"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("# Straining 'demo (v0.3.0)'"));
    assert!(out.contains("lint                 | linting demo"));
    assert!(out.contains("SUCCESS!"));
    assert!(out.contains("Sieve marked build OK"));
    assert!(project.sandbox().join("sieve.out").is_file());
}

#[test]
fn failing_command_exits_one() {
    let project = Project::new();
    project.package("demo", "lint: true\ntest: false\n");

    let output = project.sieve(&["test", "demo"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("FAILURE!"));
    assert!(stdout(&output).contains("Sieve marked build as failure"));
}

#[test]
fn unknown_package_exits_100() {
    let project = Project::new();
    let output = project.sieve(&["test", "ghost"]);
    assert_eq!(output.status.code(), Some(100));
    assert!(stderr(&output).contains("could not find package 'ghost'"));
}

#[test]
fn missing_manifest_exits_110() {
    let project = Project::new();
    let dir = project.root().join("packages/bare");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("metadata.toml"), "").unwrap();

    let output = project.sieve(&["test", "bare"]);
    assert_eq!(output.status.code(), Some(110));
}

#[test]
fn broken_config_exits_2() {
    let project = Project::new();
    fs::write(project.root().join(".sieve.toml"), "package_paths = 7\n").unwrap();
    let output = project.sieve(&["test", "demo"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn only_and_except_conflict() {
    let project = Project::new();
    let output = project.sieve(&["test", "-o", "lint", "-e", "unit", "demo"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn only_filter_and_json_report() {
    let project = Project::new();
    project.package("demo", "lint: true\nunit: false\n");

    let output = project.sieve(&["test", "--only", "lint", "--report", "report.json", "demo"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let report = fs::read_to_string(project.root().join("report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value, serde_json::json!({"demo": {"lint": true}}));
}

#[test]
fn current_directory_is_tested_without_names() {
    let project = Project::new();
    fs::write(
        project.root().join("metadata.toml"),
        "name = \"local\"\nversion = \"2.0.0\"\n",
    )
    .unwrap();
    fs::write(project.root().join("Sievefile"), "here: echo $PACKAGE\n").unwrap();

    let output = project.sieve(&["test"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("# Straining 'local (v2.0.0)'"));
}

#[test]
fn version_prints_crate_version() {
    let project = Project::new();
    let output = project.sieve(&["version"]);
    assert_eq!(stdout(&output).trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn info_shows_resolved_sandbox() {
    let project = Project::new();
    let output = project.sieve(&["info"]);
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("Sieve ("));
    assert!(out.contains("build/sandbox"));
}
