//! Parameter-matrix expansion.
//!
//! The expander turns [`SessionOptions`] into one ordered value list per test
//! dimension. It never builds the Cartesian product itself; that is left to
//! the caller's test framework. [`ParameterMatrix::cases`] is offered as a
//! convenience for callers that want the product materialized with
//! identifiers, and [`ParameterMatrix::fingerprint`] lets independent workers
//! check they computed the same matrix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::{pair_caches, CacheConfig};
use crate::compose::compose_dimension;
use crate::diagnostics::MatrixError;
use crate::groups::TestGroups;
use crate::names::split_names;
use crate::options::{SessionOptions, SessionSettings};
use crate::policy::CompositeMode;

/// Value appended to every global-policy dimension: "no global policy".
pub const NO_GLOBAL_POLICY: &str = "";

/// One axis of the test matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Runtime,
    Arch,
    Sim,
    Debug,
    GlobalPolicy,
    Policy,
    Test,
    Rc,
}

impl DimensionKind {
    /// Every dimension, in emission order.
    pub const ALL: [DimensionKind; 8] = [
        DimensionKind::Runtime,
        DimensionKind::Arch,
        DimensionKind::Sim,
        DimensionKind::Debug,
        DimensionKind::GlobalPolicy,
        DimensionKind::Policy,
        DimensionKind::Test,
        DimensionKind::Rc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DimensionKind::Runtime => "runtime",
            DimensionKind::Arch => "arch",
            DimensionKind::Sim => "sim",
            DimensionKind::Debug => "debug",
            DimensionKind::GlobalPolicy => "global_policy",
            DimensionKind::Policy => "policy",
            DimensionKind::Test => "test",
            DimensionKind::Rc => "rc",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DimensionKind {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DimensionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = DimensionKind::ALL.iter().map(|k| k.name()).collect();
                MatrixError::options(
                    format!("unknown dimension '{s}'"),
                    Some(format!("expected one of: {}", known.join(", "))),
                )
            })
    }
}

/// Parses a comma-separated dimension list such as `policy,test,rc`.
pub fn parse_dimensions(raw: &str) -> Result<Vec<DimensionKind>, MatrixError> {
    split_names(raw).iter().map(|name| name.parse()).collect()
}

/// A single value on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Flag(bool),
    Cache(CacheConfig),
}

impl ParamValue {
    /// Identifier fragment used when naming a case. Empty fragments are left
    /// out of case identifiers; a set flag reads `debug`.
    pub fn label(&self) -> String {
        match self {
            ParamValue::Text(text) => text.clone(),
            ParamValue::Flag(true) => "debug".to_string(),
            ParamValue::Flag(false) => String::new(),
            ParamValue::Cache(cache) => cache.label(),
        }
    }
}

/// One emitted dimension and its ordered values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub kind: DimensionKind,
    pub values: Vec<ParamValue>,
}

impl Dimension {
    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(ParamValue::label).collect()
    }
}

/// Computes each dimension's values from the session options.
pub struct MatrixExpander<'a> {
    options: &'a SessionOptions,
    groups: &'a TestGroups,
}

impl<'a> MatrixExpander<'a> {
    pub fn new(options: &'a SessionOptions, groups: &'a TestGroups) -> Self {
        Self { options, groups }
    }

    fn mode(&self) -> CompositeMode {
        let mode = self.options.composite_mode();
        if self.options.module_present() && mode == CompositeMode::None {
            warn!(
                selector = %self.options.composite,
                "composite selector names neither 'simple' nor 'full'; policies pass through"
            );
        }
        mode
    }

    pub fn policy_values(&self) -> Vec<String> {
        compose_dimension(
            split_names(&self.options.policies),
            self.mode(),
            self.options.module_present(),
        )
    }

    /// Global policies composed like policies, always ending in
    /// [`NO_GLOBAL_POLICY`].
    pub fn global_policy_values(&self) -> Vec<String> {
        let mut values = compose_dimension(
            split_names(&self.options.gpolicies),
            self.mode(),
            self.options.module_present(),
        );
        values.push(NO_GLOBAL_POLICY.to_string());
        values
    }

    pub fn test_values(&self) -> Vec<String> {
        self.groups.resolve(&split_names(&self.options.test))
    }

    pub fn rc_values(&self) -> Vec<CacheConfig> {
        pair_caches(&self.options.rule_cache, &self.options.rule_cache_size)
    }

    /// Values for a single dimension.
    pub fn values(&self, kind: DimensionKind) -> Vec<ParamValue> {
        let text = |values: Vec<String>| -> Vec<ParamValue> {
            values.into_iter().map(ParamValue::Text).collect()
        };
        match kind {
            DimensionKind::Runtime => vec![ParamValue::Text(self.options.runtime.clone())],
            DimensionKind::Arch => vec![ParamValue::Text(self.options.arch.clone())],
            DimensionKind::Sim => vec![ParamValue::Text(self.options.sim.clone())],
            DimensionKind::Debug => vec![ParamValue::Flag(self.options.debug())],
            DimensionKind::GlobalPolicy => text(self.global_policy_values()),
            DimensionKind::Policy => text(self.policy_values()),
            DimensionKind::Test => text(self.test_values()),
            DimensionKind::Rc => self.rc_values().into_iter().map(ParamValue::Cache).collect(),
        }
    }

    /// Expands the dimensions a test asks for.
    ///
    /// Asking for `policy` also yields `global_policy`; `global_policy` is
    /// never produced on its own. Output follows [`DimensionKind::ALL`] order
    /// regardless of request order, and repeated requests are ignored.
    pub fn expand(&self, requested: &[DimensionKind]) -> ParameterMatrix {
        let wants = |kind: DimensionKind| match kind {
            DimensionKind::GlobalPolicy => requested.contains(&DimensionKind::Policy),
            other => requested.contains(&other),
        };

        let dimensions: Vec<Dimension> = DimensionKind::ALL
            .into_iter()
            .filter(|&kind| wants(kind))
            .map(|kind| {
                let values = self.values(kind);
                debug!(dimension = kind.name(), values = values.len(), "expanded dimension");
                Dimension { kind, values }
            })
            .collect();

        ParameterMatrix {
            dimensions,
            settings: self.options.settings(),
        }
    }

    pub fn expand_all(&self) -> ParameterMatrix {
        self.expand(&DimensionKind::ALL)
    }
}

/// The expanded, per-dimension value lists for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterMatrix {
    pub dimensions: Vec<Dimension>,
    pub settings: SessionSettings,
}

impl ParameterMatrix {
    pub fn dimension(&self, kind: DimensionKind) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.kind == kind)
    }

    /// Number of cases the full product would contain.
    pub fn case_count(&self) -> usize {
        self.dimensions.iter().map(|d| d.values.len()).product()
    }

    /// Lazily walks the Cartesian product, last dimension varying fastest.
    pub fn cases(&self) -> Cases<'_> {
        let exhausted = self.dimensions.iter().any(|d| d.values.is_empty());
        Cases {
            matrix: self,
            cursor: vec![0; self.dimensions.len()],
            exhausted,
        }
    }

    /// Hex SHA-256 over dimension names and value contents, in order.
    ///
    /// Values are hashed by structure, not by label: every field is tagged
    /// and length-prefixed, so `("a", "16")` and `("a1", "6")` differ.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for dimension in &self.dimensions {
            hash_field(&mut hasher, dimension.kind.name());
            hasher.update((dimension.values.len() as u64).to_le_bytes());
            for value in &dimension.values {
                hash_value(&mut hasher, value);
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// One point of the Cartesian product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase<'a> {
    pub id: String,
    pub params: Vec<(DimensionKind, &'a ParamValue)>,
}

impl TestCase<'_> {
    pub fn get(&self, kind: DimensionKind) -> Option<&ParamValue> {
        self.params.iter().find(|(k, _)| *k == kind).map(|(_, v)| *v)
    }
}

/// Iterator returned by [`ParameterMatrix::cases`].
pub struct Cases<'a> {
    matrix: &'a ParameterMatrix,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl<'a> Iterator for Cases<'a> {
    type Item = TestCase<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let params: Vec<(DimensionKind, &'a ParamValue)> = self
            .matrix
            .dimensions
            .iter()
            .zip(&self.cursor)
            .map(|(dimension, &i)| (dimension.kind, &dimension.values[i]))
            .collect();
        let id = params
            .iter()
            .map(|(_, value)| value.label())
            .filter(|label| !label.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        // Advance the odometer.
        self.exhausted = true;
        for (pos, dimension) in self.matrix.dimensions.iter().enumerate().rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < dimension.values.len() {
                self.exhausted = false;
                break;
            }
            self.cursor[pos] = 0;
        }

        Some(TestCase { id, params })
    }
}

fn hash_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

fn hash_value(hasher: &mut Sha256, value: &ParamValue) {
    match value {
        ParamValue::Text(text) => {
            hasher.update(b"T");
            hash_field(hasher, text);
        }
        ParamValue::Flag(flag) => {
            hasher.update(b"F");
            hasher.update([u8::from(*flag)]);
        }
        ParamValue::Cache(cache) => {
            hasher.update(b"C");
            hash_field(hasher, &cache.kind);
            hash_field(hasher, &cache.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::TestGroup;

    fn options() -> SessionOptions {
        SessionOptions {
            policies: "rwx,heap".into(),
            gpolicies: "contextswitch".into(),
            test: "smoke,printf_works".into(),
            module: "osv.frtos.main".into(),
            rule_cache: "finite,dmhc".into(),
            rule_cache_size: "16".into(),
            runtime: "frtos".into(),
            sim: "qemu".into(),
            ..SessionOptions::default()
        }
    }

    fn groups() -> TestGroups {
        TestGroups::new().with_group("smoke", TestGroup::new(["hello_works", "stack_works"]))
    }

    fn texts(values: &[ParamValue]) -> Vec<String> {
        values.iter().map(ParamValue::label).collect()
    }

    #[test]
    fn test_expand_all_dimensions() {
        let opts = options();
        let groups = groups();
        let matrix = MatrixExpander::new(&opts, &groups).expand_all();

        let kinds: Vec<DimensionKind> = matrix.dimensions.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, DimensionKind::ALL.to_vec());

        let policy = matrix.dimension(DimensionKind::Policy).unwrap();
        assert_eq!(texts(&policy.values), vec!["heap", "rwx", "heap-rwx"]);

        let global = matrix.dimension(DimensionKind::GlobalPolicy).unwrap();
        assert_eq!(texts(&global.values), vec!["contextswitch", ""]);

        let tests = matrix.dimension(DimensionKind::Test).unwrap();
        assert_eq!(texts(&tests.values), vec!["hello_works", "printf_works", "stack_works"]);

        let rc = matrix.dimension(DimensionKind::Rc).unwrap();
        assert_eq!(texts(&rc.values), vec!["finite16", "dmhc16"]);

        let arch = matrix.dimension(DimensionKind::Arch).unwrap();
        assert_eq!(arch.values, vec![ParamValue::Text("rv32".into())]);
        let debug = matrix.dimension(DimensionKind::Debug).unwrap();
        assert_eq!(debug.values, vec![ParamValue::Flag(false)]);
    }

    #[test]
    fn test_without_module_policies_pass_through() {
        let opts = SessionOptions {
            module: String::new(),
            ..options()
        };
        let groups = TestGroups::new();
        let expander = MatrixExpander::new(&opts, &groups);
        assert_eq!(expander.policy_values(), vec!["rwx", "heap"]);
        assert_eq!(expander.global_policy_values(), vec!["contextswitch", ""]);
    }

    #[test]
    fn test_global_policy_always_ends_with_empty() {
        for composite in ["simple", "full", "none"] {
            let opts = SessionOptions {
                composite: composite.into(),
                gpolicies: "a,b,none".into(),
                ..options()
            };
            let groups = TestGroups::new();
            let values = MatrixExpander::new(&opts, &groups).global_policy_values();
            assert_eq!(values.last().map(String::as_str), Some(NO_GLOBAL_POLICY));
        }
    }

    #[test]
    fn test_empty_global_policies_still_tests_none() {
        let opts = SessionOptions::default();
        let groups = TestGroups::new();
        let values = MatrixExpander::new(&opts, &groups).global_policy_values();
        assert_eq!(values, vec![NO_GLOBAL_POLICY]);
    }

    #[test]
    fn test_requested_dimensions_only() {
        let opts = options();
        let groups = groups();
        let expander = MatrixExpander::new(&opts, &groups);

        let matrix = expander.expand(&[DimensionKind::Test, DimensionKind::Policy, DimensionKind::Test]);
        let kinds: Vec<DimensionKind> = matrix.dimensions.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DimensionKind::GlobalPolicy, DimensionKind::Policy, DimensionKind::Test]
        );

        let matrix = expander.expand(&[DimensionKind::GlobalPolicy]);
        assert!(matrix.dimensions.is_empty());
    }

    #[test]
    fn test_cases_walk_product_last_fastest() {
        let opts = options();
        let groups = groups();
        let matrix = MatrixExpander::new(&opts, &groups).expand(&[DimensionKind::Policy, DimensionKind::Rc]);

        let ids: Vec<String> = matrix.cases().map(|case| case.id).collect();
        assert_eq!(matrix.case_count(), 2 * 3 * 2);
        assert_eq!(ids.len(), matrix.case_count());
        assert_eq!(ids[0], "contextswitch-heap-finite16");
        assert_eq!(ids[1], "contextswitch-heap-dmhc16");
        assert_eq!(ids[6], "heap-finite16");
        assert_eq!(ids.last().map(String::as_str), Some("heap-rwx-dmhc16"));
    }

    #[test]
    fn test_case_lookup_by_dimension() {
        let opts = options();
        let groups = groups();
        let matrix = MatrixExpander::new(&opts, &groups).expand(&[DimensionKind::Test]);
        let first = matrix.cases().next().unwrap();
        assert_eq!(
            first.get(DimensionKind::Test),
            Some(&ParamValue::Text("hello_works".into()))
        );
        assert_eq!(first.get(DimensionKind::Rc), None);
    }

    #[test]
    fn test_empty_dimension_yields_no_cases() {
        let opts = SessionOptions::default();
        let groups = TestGroups::new();
        let matrix = MatrixExpander::new(&opts, &groups).expand(&[DimensionKind::Test]);
        assert_eq!(matrix.case_count(), 0);
        assert_eq!(matrix.cases().count(), 0);
    }

    #[test]
    fn test_neutral_cache_stays_out_of_ids() {
        let opts = SessionOptions {
            test: "t1".into(),
            ..SessionOptions::default()
        };
        let groups = TestGroups::new();
        let matrix = MatrixExpander::new(&opts, &groups).expand(&[DimensionKind::Test, DimensionKind::Rc]);
        let ids: Vec<String> = matrix.cases().map(|case| case.id).collect();
        assert_eq!(ids, vec!["t1"]);
    }

    #[test]
    fn test_fingerprint_is_stable_and_order_sensitive() {
        let groups = groups();
        let a = options();
        let b = SessionOptions {
            test: "printf_works,smoke".into(),
            policies: "heap,rwx".into(),
            ..options()
        };
        let fa = MatrixExpander::new(&a, &groups).expand_all().fingerprint();
        let fb = MatrixExpander::new(&b, &groups).expand_all().fingerprint();
        assert_eq!(fa, fb);
        assert_eq!(fa.len(), 64);

        let c = SessionOptions {
            rule_cache: "dmhc,finite".into(),
            ..options()
        };
        let fc = MatrixExpander::new(&c, &groups).expand_all().fingerprint();
        assert_ne!(fa, fc);
    }

    #[test]
    fn test_fingerprint_separates_caches_with_equal_labels() {
        let groups = TestGroups::new();
        let split_at_kind = SessionOptions {
            rule_cache: "a,b".into(),
            rule_cache_size: "16".into(),
            ..SessionOptions::default()
        };
        let split_at_size = SessionOptions {
            rule_cache: "a1,b1".into(),
            rule_cache_size: "6".into(),
            ..SessionOptions::default()
        };
        let first = MatrixExpander::new(&split_at_kind, &groups).expand(&[DimensionKind::Rc]);
        let second = MatrixExpander::new(&split_at_size, &groups).expand(&[DimensionKind::Rc]);

        let rc = |m: &ParameterMatrix| m.dimension(DimensionKind::Rc).unwrap().labels();
        assert_eq!(rc(&first), rc(&second));
        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_debug_flag() {
        let groups = TestGroups::new();
        let off = SessionOptions::default();
        let on = SessionOptions {
            isp_debug: "debug".into(),
            ..SessionOptions::default()
        };
        let a = MatrixExpander::new(&off, &groups).expand(&[DimensionKind::Debug]);
        let b = MatrixExpander::new(&on, &groups).expand(&[DimensionKind::Debug]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(
            parse_dimensions("policy,,rc").unwrap(),
            vec![DimensionKind::Policy, DimensionKind::Rc]
        );
        let err = parse_dimensions("policy,flavour").unwrap_err();
        assert!(err.to_string().contains("flavour"));
    }
}
