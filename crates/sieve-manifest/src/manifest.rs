// manifest.rs — Sievefile loading and parsing.
//
// Parsing happens in a fixed order:
//   1. trim the whole file
//   2. substitute $PACKAGE and $SANDBOX (literal, global, single pass)
//   3. drop blank lines and `#` comments
//   4. split each remaining line on its first colon
//
// Substitution runs before comment filtering on purpose: a token that
// expands to something starting with `#` still yields a comment line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Replaced with the package name.
pub const PACKAGE_TOKEN: &str = "$PACKAGE";

/// Replaced with the absolute sandbox root.
pub const SANDBOX_TOKEN: &str = "$SANDBOX";

/// One `label: command` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCommand {
    pub label: String,
    pub command: String,
}

impl ManifestCommand {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// The parsed manifest of one package, in file order.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    package: String,
    commands: Vec<ManifestCommand>,
}

impl Manifest {
    /// Candidate manifest locations for a package, highest priority first.
    pub fn candidates(filename: &str, package_dir: &Path, sandbox_root: &Path) -> Vec<PathBuf> {
        vec![package_dir.join(filename), sandbox_root.join(filename)]
    }

    /// Locate and load the manifest for `package`.
    ///
    /// `package_dir` is searched first, then `sandbox_root`.
    pub fn for_package(
        filename: &str,
        package: &str,
        package_dir: &Path,
        sandbox_root: &Path,
    ) -> Result<Self, ManifestError> {
        let candidates = Self::candidates(filename, package_dir, sandbox_root);
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            return Err(ManifestError::NotFound {
                filename: filename.to_string(),
                package: package.to_string(),
                candidates,
            });
        };
        Self::load(path, package, sandbox_root)
    }

    /// Load and parse the manifest at `path`.
    pub fn load(
        path: impl AsRef<Path>,
        package: &str,
        sandbox_root: &Path,
    ) -> Result<Self, ManifestError> {
        let path = path.as_ref().to_path_buf();
        tracing::debug!(path = %path.display(), package, "loading manifest");
        let contents = fs::read_to_string(&path).map_err(|source| ManifestError::IoError {
            path: path.clone(),
            source,
        })?;
        let commands = Self::parse(&contents, package, sandbox_root);
        Ok(Self {
            path,
            package: package.to_string(),
            commands,
        })
    }

    /// Parse manifest text for `package`.
    pub fn parse(contents: &str, package: &str, sandbox_root: &Path) -> Vec<ManifestCommand> {
        let contents = substitute(contents.trim(), package, sandbox_root);

        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match line.split_once(':') {
                Some((label, command)) if !label.trim().is_empty() => {
                    let command = ManifestCommand::new(label.trim(), command.trim());
                    tracing::debug!(label = %command.label, command = %command.command, "parsed command");
                    Some(command)
                }
                _ => {
                    tracing::warn!(line, package, "skipping manifest line without a label");
                    None
                }
            })
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// All commands, unfiltered, in file order.
    pub fn commands(&self) -> &[ManifestCommand] {
        &self.commands
    }
}

/// Replace the manifest tokens with their values in a single pass.
///
/// Replacement text is never scanned again, so a package name or sandbox
/// path that happens to contain a token is inserted verbatim.
pub fn substitute(contents: &str, package: &str, sandbox_root: &Path) -> String {
    let sandbox = sandbox_root.display().to_string();
    let mut out = String::with_capacity(contents.len());
    let mut rest = contents;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(PACKAGE_TOKEN) {
            out.push_str(package);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(SANDBOX_TOKEN) {
            out.push_str(&sandbox);
            rest = after;
        } else {
            out.push('$');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn labels(commands: &[ManifestCommand]) -> Vec<&str> {
        commands.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn splits_on_first_colon_only() {
        let commands = Manifest::parse("foo: bar:baz", "demo", Path::new("/sb"));
        assert_eq!(commands, vec![ManifestCommand::new("foo", "bar:baz")]);
    }

    #[test]
    fn urls_survive_in_commands() {
        let commands = Manifest::parse(
            "fetch: curl -s http://localhost:8080/health",
            "demo",
            Path::new("/sb"),
        );
        assert_eq!(commands[0].command, "curl -s http://localhost:8080/health");
    }

    #[test]
    fn blank_lines_and_comments_are_dropped() {
        let text = "\n# header comment\nlint: rubocop\n\n   # indented comment\nunit: rspec\n\n";
        let commands = Manifest::parse(text, "demo", Path::new("/sb"));
        assert_eq!(labels(&commands), vec!["lint", "unit"]);
    }

    #[test]
    fn tokens_are_substituted_everywhere() {
        let text = "lint: foodcritic $SANDBOX/$PACKAGE\nunit: cd $PACKAGE && rspec $PACKAGE";
        let commands = Manifest::parse(text, "demo", Path::new("/tmp/sb"));
        assert_eq!(commands[0].command, "foodcritic /tmp/sb/demo");
        assert_eq!(commands[1].command, "cd demo && rspec demo");
    }

    #[test]
    fn substitution_happens_before_splitting_and_filtering() {
        // The package name contains a colon: it must end up in the command,
        // never shift the label split.
        let commands = Manifest::parse("echo: echo $PACKAGE", "a:b", Path::new("/sb"));
        assert_eq!(commands, vec![ManifestCommand::new("echo", "echo a:b")]);

        // A token that expands to a leading `#` becomes a comment.
        let commands = Manifest::parse("$PACKAGE: skipped\nkept: yes", "#off", Path::new("/sb"));
        assert_eq!(labels(&commands), vec!["kept"]);
    }

    #[test]
    fn substitution_is_applied_exactly_once() {
        // The replacement text contains the other token; it must not be expanded again.
        let out = substitute("x $PACKAGE", "$SANDBOX", Path::new("/sb"));
        assert_eq!(out, "x $SANDBOX");
        let out = substitute("x $SANDBOX", "demo", Path::new("/weird/$PACKAGE"));
        assert_eq!(out, "x /weird/$PACKAGE");
    }

    #[test]
    fn unknown_dollar_words_are_left_alone() {
        let out = substitute("echo $HOME $PACKAGES $", "demo", Path::new("/sb"));
        assert_eq!(out, "echo $HOME demoS $");
    }

    #[test]
    fn lines_without_label_are_skipped() {
        let commands = Manifest::parse("no colon here\n: empty label\nok: true", "demo", Path::new("/sb"));
        assert_eq!(labels(&commands), vec!["ok"]);
    }

    #[test]
    fn duplicate_labels_keep_file_order() {
        let commands = Manifest::parse("a: one\nb: two\na: three", "demo", Path::new("/sb"));
        assert_eq!(labels(&commands), vec!["a", "b", "a"]);
        assert_eq!(commands[2].command, "three");
    }

    #[test]
    fn for_package_prefers_package_dir() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        let sandbox = dir.path().join("sandbox");
        fs::create_dir_all(&pkg).unwrap();
        fs::create_dir_all(&sandbox).unwrap();
        fs::write(pkg.join("Sievefile"), "own: true").unwrap();
        fs::write(sandbox.join("Sievefile"), "shared: true").unwrap();

        let manifest = Manifest::for_package("Sievefile", "pkg", &pkg, &sandbox).unwrap();
        assert_eq!(labels(manifest.commands()), vec!["own"]);
        assert_eq!(manifest.path(), pkg.join("Sievefile"));
        assert_eq!(manifest.package(), "pkg");
    }

    #[test]
    fn for_package_falls_back_to_sandbox_root() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        let sandbox = dir.path().join("sandbox");
        fs::create_dir_all(&pkg).unwrap();
        fs::create_dir_all(&sandbox).unwrap();
        fs::write(sandbox.join("Sievefile"), "shared: echo $PACKAGE").unwrap();

        let manifest = Manifest::for_package("Sievefile", "pkg", &pkg, &sandbox).unwrap();
        assert_eq!(manifest.commands()[0].command, "echo pkg");
    }

    #[test]
    fn for_package_reports_all_candidates_when_missing() {
        let dir = tempdir().unwrap();
        let result = Manifest::for_package("Sievefile", "pkg", &dir.path().join("pkg"), dir.path());
        match result {
            Err(ManifestError::NotFound {
                filename,
                package,
                candidates,
            }) => {
                assert_eq!(filename, "Sievefile");
                assert_eq!(package, "pkg");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn absolute_filename_overrides_both_locations() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("Custom");
        fs::write(&custom, "custom: true").unwrap();

        let manifest = Manifest::for_package(
            custom.to_str().unwrap(),
            "pkg",
            &dir.path().join("pkg"),
            &dir.path().join("sandbox"),
        )
        .unwrap();
        assert_eq!(labels(manifest.commands()), vec!["custom"]);
    }
}
