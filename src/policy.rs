//! Policy vocabulary: sentinel markers, sorted subsets, composite identifiers,
//! and the composition mode selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between member names of a composite policy identifier.
pub const COMPOSITE_SEPARATOR: &str = "-";

/// Policy names with special meaning to the composer.
///
/// A marker is never counted toward "the full combination" and any subset of
/// more than one policy that contains a marker is excluded from composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyMarker {
    /// `none`: run without any policy.
    NoPolicy,
    /// `testSimple`: the baseline simple test policy.
    TestSimple,
    /// `testComplex`: the baseline complex test policy.
    TestComplex,
}

impl PolicyMarker {
    pub const ALL: [PolicyMarker; 3] = [
        PolicyMarker::NoPolicy,
        PolicyMarker::TestSimple,
        PolicyMarker::TestComplex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyMarker::NoPolicy => "none",
            PolicyMarker::TestSimple => "testSimple",
            PolicyMarker::TestComplex => "testComplex",
        }
    }

    /// Recognizes a marker by exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|marker| marker.as_str() == name)
    }

    pub fn is_marker(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

impl fmt::Display for PolicyMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-empty, lexicographically sorted run of policy names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PolicySubset(Vec<String>);

impl PolicySubset {
    /// Builds a subset from names already in sorted order.
    ///
    /// Returns `None` for an empty or unsorted input.
    pub fn from_sorted(names: Vec<String>) -> Option<Self> {
        if names.is_empty() || names.windows(2).any(|pair| pair[0] > pair[1]) {
            return None;
        }
        Some(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    // Always false once constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.0.len() == 1
    }

    pub fn contains_marker(&self) -> bool {
        self.0.iter().any(|name| PolicyMarker::is_marker(name))
    }

    pub fn composite_id(&self) -> CompositeId {
        CompositeId(self.0.join(COMPOSITE_SEPARATOR))
    }
}

/// Hyphen-joined identifier of a composite policy, e.g. `cfi-heap-rwx`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeId(String);

impl CompositeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Splits the identifier back into its member policy names.
    pub fn members(&self) -> Vec<&str> {
        self.0.split(COMPOSITE_SEPARATOR).collect()
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CompositeId> for String {
    fn from(id: CompositeId) -> Self {
        id.0
    }
}

/// How the policy lists are turned into composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    /// Singletons plus the one full combination.
    #[default]
    Simple,
    /// Singletons plus every marker-free combination.
    Full,
    /// Pass the requested names through unchanged.
    None,
}

impl CompositeMode {
    /// Interprets a free-form selector the way the option layer always has:
    /// anything containing `simple` is simple, else anything containing `full`
    /// is full, else no composition.
    pub fn from_selector(selector: &str) -> Self {
        if selector.contains("simple") {
            CompositeMode::Simple
        } else if selector.contains("full") {
            CompositeMode::Full
        } else {
            CompositeMode::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeMode::Simple => "simple",
            CompositeMode::Full => "full",
            CompositeMode::None => "none",
        }
    }
}

impl FromStr for CompositeMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_selector(s))
    }
}

impl fmt::Display for CompositeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
