//! Enumeration of every policy subset to compose.

use tracing::trace;

use crate::policy::PolicySubset;

/// Returns every non-empty subset of `policies`.
///
/// The input is sorted and de-duplicated first. Subsets are ordered by
/// ascending size, and lexicographically within a size class; each subset is
/// itself sorted. Downstream filtering relies on this order: the first
/// entries are the singletons and the last entry is the full set.
pub fn permute_policies<S: AsRef<str>>(policies: &[S]) -> Vec<PolicySubset> {
    let mut sorted: Vec<String> = policies.iter().map(|p| p.as_ref().to_string()).collect();
    sorted.sort();
    sorted.dedup();

    let mut subsets = Vec::new();
    for size in 1..=sorted.len() {
        subsets.extend(combinations(&sorted, size));
    }
    trace!(policies = sorted.len(), subsets = subsets.len(), "permuted policies");
    subsets
}

/// All `size`-element combinations of `sorted`, in lexicographic index order.
fn combinations(sorted: &[String], size: usize) -> Vec<PolicySubset> {
    let n = sorted.len();
    if size == 0 || size > n {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..size).collect();
    loop {
        let names = indices.iter().map(|&i| sorted[i].clone()).collect();
        // indices are strictly increasing over a sorted, de-duplicated source
        if let Some(subset) = PolicySubset::from_sorted(names) {
            out.push(subset);
        }

        // Find the rightmost index that can still advance.
        let Some(pos) = (0..size).rev().find(|&i| indices[i] < n - size + i) else {
            break;
        };
        indices[pos] += 1;
        for i in pos + 1..size {
            indices[i] = indices[i - 1] + 1;
        }
    }
    out
}
