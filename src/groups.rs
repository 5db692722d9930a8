//! Test groups: named aliases that expand to a fixed set of concrete tests.
//!
//! Group tables are supplied by the caller, either built in code or loaded
//! from a YAML/JSON document of the form
//!
//! ```yaml
//! smoke: [hello_works, stack_works]
//! memory:
//!   tests: [heap_overflow, stack_smash]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::diagnostics::MatrixError;

/// A named collection of concrete test identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestGroup {
    pub tests: Vec<String>,
}

impl TestGroup {
    pub fn new<I, S>(tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tests: tests.into_iter().map(Into::into).collect(),
        }
    }
}

/// Either a bare list or a `{ tests: [...] }` table.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroupEntry {
    List(Vec<String>),
    Table(TestGroup),
}

impl From<GroupEntry> for TestGroup {
    fn from(entry: GroupEntry) -> Self {
        match entry {
            GroupEntry::List(tests) => TestGroup { tests },
            GroupEntry::Table(group) => group,
        }
    }
}

/// Immutable mapping from group name to its member tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TestGroups {
    groups: BTreeMap<String, TestGroup>,
}

impl TestGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group, replacing any previous group of the same name.
    pub fn with_group(mut self, name: impl Into<String>, group: TestGroup) -> Self {
        self.groups.insert(name.into(), group);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TestGroup> {
        self.groups.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Expands `requested` into concrete test identifiers.
    ///
    /// A requested name that is a group expands to the group's members; any
    /// other name is taken as a test. Group lookup wins when a test and a group
    /// share a name. The result is de-duplicated and sorted so that parallel
    /// workers agree on the order regardless of how the request was written.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        let mut tests = BTreeSet::new();
        for name in requested {
            let name = name.as_ref();
            match self.groups.get(name) {
                Some(group) => {
                    trace!(group = name, members = group.tests.len(), "expanding test group");
                    tests.extend(group.tests.iter().cloned());
                }
                None => {
                    tests.insert(name.to_string());
                }
            }
        }
        tests.into_iter().collect()
    }

    /// Parses a group table from YAML (JSON is valid YAML, but is routed to
    /// `serde_json` when `name` ends in `.json` for sharper diagnostics).
    pub fn from_source(name: &str, content: &str) -> Result<Self, MatrixError> {
        let entries: BTreeMap<String, GroupEntry> = if name.ends_with(".json") {
            serde_json::from_str(content).map_err(|e| MatrixError::from_json(name, content, e))?
        } else {
            serde_yaml::from_str(content).map_err(|e| MatrixError::from_yaml(name, content, e))?
        };
        let groups = entries
            .into_iter()
            .map(|(name, entry)| (name, TestGroup::from(entry)))
            .collect();
        Ok(Self { groups })
    }

    /// Loads a group table from a YAML or JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| MatrixError::io("read", path, e))?;
        let groups = Self::from_source(&path.display().to_string(), &content)?;
        debug!(path = %path.display(), groups = groups.len(), "loaded test groups");
        Ok(groups)
    }
}

impl FromIterator<(String, TestGroup)> for TestGroups {
    fn from_iter<I: IntoIterator<Item = (String, TestGroup)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TestGroups {
        TestGroups::new()
            .with_group("G1", TestGroup::new(["t1", "t2"]))
            .with_group("G2", TestGroup::new(["t2", "t3"]))
    }

    #[test]
    fn test_resolve_expands_and_sorts() {
        assert_eq!(sample().resolve(&["t5", "G1"]), vec!["t1", "t2", "t5"]);
    }

    #[test]
    fn test_resolve_deduplicates_overlapping_groups() {
        assert_eq!(sample().resolve(&["G2", "G1", "t1"]), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_group_name_wins_over_test_name() {
        let groups = TestGroups::new().with_group("hello", TestGroup::new(["hello_a", "hello_b"]));
        assert_eq!(groups.resolve(&["hello"]), vec!["hello_a", "hello_b"]);
    }

    #[test]
    fn test_empty_request() {
        assert!(sample().resolve::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_empty_group_contributes_nothing() {
        let groups = TestGroups::new().with_group("empty", TestGroup::default());
        assert_eq!(groups.resolve(&["empty", "x"]), vec!["x"]);
    }

    #[test]
    fn test_from_yaml_accepts_both_shapes() {
        let yaml = "smoke: [b, a]\nmemory:\n  tests: [heap]\n";
        let groups = TestGroups::from_source("groups.yaml", yaml).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("smoke").unwrap().tests, vec!["b", "a"]);
        assert_eq!(groups.get("memory").unwrap().tests, vec!["heap"]);
        assert_eq!(groups.names().collect::<Vec<_>>(), vec!["memory", "smoke"]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"smoke": ["a"], "all": {"tests": ["a", "b"]}}"#;
        let groups = TestGroups::from_source("groups.json", json).unwrap();
        assert_eq!(groups.resolve(&["all", "smoke"]), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_table_is_parse_error() {
        let err = TestGroups::from_source("groups.yaml", "smoke: 3\n").unwrap_err();
        assert_eq!(err.error_type(), crate::diagnostics::ErrorType::Parse);
    }
}
