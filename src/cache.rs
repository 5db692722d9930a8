//! Rule-cache configuration pairs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::names::split_names;

/// One rule-cache configuration: a cache kind and its size.
///
/// The neutral pair `("", "")` means "no cache differentiation requested" and
/// keeps the cache out of generated test identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheConfig {
    pub kind: String,
    pub size: String,
}

impl CacheConfig {
    pub fn new(kind: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            size: size.into(),
        }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        self.kind.is_empty() && self.size.is_empty()
    }

    /// Display label: kind immediately followed by size, e.g. `dmhc16`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.size)
    }
}

/// Crosses cache kinds with cache sizes, kind-major.
///
/// Repeated kinds or sizes count once, at their first position. When the
/// cross-product has fewer than two entries there is nothing to vary, so the
/// single neutral pair is returned instead.
pub fn pair_caches(kinds: &str, sizes: &str) -> Vec<CacheConfig> {
    let kinds = first_occurrences(split_names(kinds));
    let sizes = first_occurrences(split_names(sizes));

    let pairs: Vec<CacheConfig> = kinds
        .iter()
        .flat_map(|kind| sizes.iter().map(move |size| CacheConfig::new(kind.as_str(), size.as_str())))
        .collect();

    if pairs.len() <= 1 {
        return vec![CacheConfig::neutral()];
    }
    pairs
}

fn first_occurrences(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names.into_iter().filter(|name| seen.insert(name.clone())).collect()
}
