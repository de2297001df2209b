// report.rs — Per-command results of a run.
//
// `package → label → passed`, both levels in insertion order. An entry
// exists only for commands that actually ran, so a fail-fast run has fewer
// entries than the manifests list.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RunError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunReport {
    results: IndexMap<String, IndexMap<String, bool>>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result. A repeated label within a package overwrites the
    /// earlier result but keeps its position.
    pub fn record(&mut self, package: &str, label: &str, passed: bool) {
        self.results
            .entry(package.to_string())
            .or_default()
            .insert(label.to_string(), passed);
        tracing::debug!(package, label, passed, "recorded result");
    }

    /// True when every recorded command passed. An empty report passes.
    pub fn success(&self) -> bool {
        self.results
            .values()
            .flat_map(|commands| commands.values())
            .all(|passed| *passed)
    }

    pub fn get(&self, package: &str, label: &str) -> Option<bool> {
        self.results.get(package)?.get(label).copied()
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn results_for(&self, package: &str) -> Option<&IndexMap<String, bool>> {
        self.results.get(package)
    }

    /// Number of recorded commands across all packages.
    pub fn len(&self) -> usize {
        self.results.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String, RunError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), RunError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RunError::Report {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| RunError::Report {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_report_succeeds() {
        let report = RunReport::new();
        assert!(report.success());
        assert!(report.is_empty());
    }

    #[test]
    fn any_failure_fails_regardless_of_order() {
        let mut first = RunReport::new();
        first.record("a", "lint", false);
        first.record("a", "test", true);
        assert!(!first.success());

        let mut second = RunReport::new();
        second.record("b", "test", true);
        second.record("a", "lint", false);
        assert!(!second.success());
    }

    #[test]
    fn keeps_insertion_order() {
        let mut report = RunReport::new();
        report.record("zeta", "z", true);
        report.record("alpha", "b", true);
        report.record("alpha", "a", true);
        assert_eq!(report.packages().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        let labels: Vec<&String> = report.results_for("alpha").unwrap().keys().collect();
        assert_eq!(labels, vec!["b", "a"]);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn json_is_nested_and_ordered() {
        let mut report = RunReport::new();
        report.record("demo", "lint", true);
        report.record("demo", "test", false);

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"demo": {"lint": true, "test": false}}));
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        let mut report = RunReport::new();
        report.record("demo", "lint", true);
        report.write_json(&path).unwrap();

        let back: RunReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
