//! Data model, dependency constraint evaluation, and validation for CMIF manifests.
//!
//! This crate defines the schema layer: versions and version ranges with their
//! total ordering (`Version`, `VersionRange`), the recursive dependency
//! constraint tree and its evaluator (`Dependency`), file and archive records,
//! the root `Manifest` with JSON parsing, the accumulating validator
//! (`validate`), and a mechanical JSON Schema export (`manifest_schema`).

pub mod dependency;
pub mod file;
pub mod manifest;
pub mod schema;
pub mod types;
pub mod validate;
pub mod version;

pub use dependency::{
    AbstractDependency, Dependency, DependencyGroup, NotVersionDependency, RangeDependency,
    VersionDependency,
};
pub use file::{Archive, FileProvides, FileTrait};
pub use manifest::{parse_manifest_file, parse_manifest_str, Manifest, ManifestError};
pub use schema::manifest_schema;
pub use types::{Digest, Name, Uri};
pub use validate::{validate, validate_with, Violation, ViolationKind};
pub use version::{Version, VersionRange, MAX_COMPONENT};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction and evaluation failures.
///
/// These are raised immediately and are not recoverable by the failing call;
/// the caller has to fix its input. [`validate`] reports the same conditions
/// as accumulated [`Violation`]s instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{field} out of range: {reason}")]
    Range { field: &'static str, reason: String },
    #[error("{field} does not match pattern {pattern}: '{value}'")]
    PatternMismatch {
        field: &'static str,
        pattern: &'static str,
        value: String,
    },
    #[error("structural error: {0}")]
    Structural(String),
    #[error("dependency tree deeper than {limit} levels")]
    DepthExceeded { limit: usize },
    #[error("dependency tree has more than {limit} nodes")]
    NodeLimitExceeded { limit: usize },
}

/// Resource ceilings applied while walking untrusted dependency trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Maximum nesting depth; a lone leaf has depth 1.
    pub max_depth: usize,
    /// Maximum number of nodes visited in a single tree.
    pub max_nodes: usize,
}

impl Limits {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    pub const DEFAULT_MAX_NODES: usize = 10_000;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }
}
