//! Composite policy generation.
//!
//! A composite policy runs several atomic policies together and is named by
//! hyphen-joining its sorted members. Which subsets become composites depends
//! on the [`CompositeMode`]:
//!
//! - `simple`: every single policy, plus the one combination of all
//!   non-marker policies.
//! - `full`: every single policy, plus every combination free of markers.
//! - `none`: the requested names pass through untouched.

use std::collections::BTreeSet;

use tracing::trace;

use crate::permute::permute_policies;
use crate::policy::{CompositeId, CompositeMode, PolicyMarker};

/// Size of "the full combination": distinct requested names minus markers.
pub fn full_composite_size<S: AsRef<str>>(policies: &[S]) -> usize {
    let distinct: BTreeSet<&str> = policies.iter().map(|p| p.as_ref()).collect();
    let markers = distinct.iter().filter(|name| PolicyMarker::is_marker(name)).count();
    distinct.len() - markers
}

/// Renders the composite identifiers for `policies` under `simple` or `full`
/// filtering.
///
/// `simple == true` keeps singletons and the full combination only;
/// `simple == false` keeps singletons and every marker-free combination.
/// Membership in a marker is the authoritative exclusion for any subset larger
/// than one; the full size only selects which marker-free subset is "full".
pub fn composites<S: AsRef<str>>(policies: &[S], simple: bool) -> Vec<CompositeId> {
    let full_size = full_composite_size(policies);

    permute_policies(policies)
        .into_iter()
        .filter(|subset| {
            let keep = subset.is_singleton()
                || (!subset.contains_marker() && (!simple || subset.len() == full_size));
            trace!(subset = %subset.composite_id(), keep, "composite filter");
            keep
        })
        .map(|subset| subset.composite_id())
        .collect()
}

/// Produces one policy dimension: composites when a module prefix is present
/// and the mode composes, otherwise the requested names as given.
pub fn compose_dimension(policies: Vec<String>, mode: CompositeMode, module_present: bool) -> Vec<String> {
    if !module_present {
        return policies;
    }
    match mode {
        CompositeMode::Simple => into_strings(composites(&policies, true)),
        CompositeMode::Full => into_strings(composites(&policies, false)),
        CompositeMode::None => policies,
    }
}

fn into_strings(ids: Vec<CompositeId>) -> Vec<String> {
    ids.into_iter().map(CompositeId::into_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(policies: &[&str], simple: bool) -> Vec<String> {
        into_strings(composites(policies, simple))
    }

    #[test]
    fn test_simple_pair() {
        assert_eq!(rendered(&["a", "b"], true), vec!["a", "b", "a-b"]);
    }

    #[test]
    fn test_simple_excludes_marker_combinations() {
        assert_eq!(
            rendered(&["a", "b", "none"], true),
            vec!["a", "b", "none", "a-b"]
        );
    }

    #[test]
    fn test_full_pair_matches_simple() {
        assert_eq!(rendered(&["a", "b"], false), vec!["a", "b", "a-b"]);
    }

    #[test]
    fn test_full_three_keeps_every_combination() {
        assert_eq!(
            rendered(&["c", "a", "b"], false),
            vec!["a", "b", "c", "a-b", "a-c", "b-c", "a-b-c"]
        );
    }

    #[test]
    fn test_simple_three_keeps_only_full_combination() {
        assert_eq!(rendered(&["c", "a", "b"], true), vec!["a", "b", "c", "a-b-c"]);
    }

    #[test]
    fn test_full_with_markers() {
        assert_eq!(
            rendered(&["a", "b", "testSimple", "testComplex"], false),
            vec!["a", "b", "testComplex", "testSimple", "a-b"]
        );
    }

    #[test]
    fn test_only_markers_yield_singletons() {
        let markers = ["none", "testSimple", "testComplex"];
        assert_eq!(rendered(&markers, true), vec!["none", "testComplex", "testSimple"]);
        assert_eq!(rendered(&markers, false), vec!["none", "testComplex", "testSimple"]);
    }

    #[test]
    fn test_empty_list() {
        assert!(composites::<&str>(&[], true).is_empty());
        assert!(composites::<&str>(&[], false).is_empty());
    }

    #[test]
    fn test_single_policy_not_duplicated() {
        assert_eq!(rendered(&["heap"], true), vec!["heap"]);
    }

    #[test]
    fn test_full_composite_size_counts_distinct_non_markers() {
        assert_eq!(full_composite_size(&["a", "b", "none", "a"]), 2);
        assert_eq!(full_composite_size(&["none", "testSimple"]), 0);
        assert_eq!(full_composite_size::<&str>(&[]), 0);
    }

    #[test]
    fn test_dimension_passthrough_without_module() {
        let raw = vec!["b".to_string(), "a".to_string()];
        assert_eq!(compose_dimension(raw.clone(), CompositeMode::Simple, false), raw);
        assert_eq!(compose_dimension(raw.clone(), CompositeMode::None, true), raw);
        assert_eq!(
            compose_dimension(raw, CompositeMode::Full, true),
            vec!["a", "b", "a-b"]
        );
    }
}
