//! Composite policy generation and test-parameter matrix expansion.
//!
//! Raw option strings flow through the modules in this order:
//! [`names`] splits them, [`groups`] resolves test groups, [`permute`] and
//! [`compose`] build composite policies, [`cache`] pairs rule-cache settings,
//! and [`matrix`] assembles one ordered value list per test dimension.

pub use crate::diagnostics::{ErrorType, MatrixError};

pub mod cache;
pub mod cli;
pub mod compose;
pub mod diagnostics;
pub mod groups;
pub mod matrix;
pub mod names;
pub mod options;
pub mod permute;
pub mod policy;

pub use crate::cache::{pair_caches, CacheConfig};
pub use crate::compose::{composites, full_composite_size};
pub use crate::groups::{TestGroup, TestGroups};
pub use crate::matrix::{Dimension, DimensionKind, MatrixExpander, ParamValue, ParameterMatrix, TestCase};
pub use crate::names::split_names;
pub use crate::options::{SessionOptions, SessionSettings};
pub use crate::permute::permute_policies;
pub use crate::policy::{CompositeId, CompositeMode, PolicyMarker, PolicySubset};
