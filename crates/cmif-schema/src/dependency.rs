//! Recursive dependency constraint trees and their evaluation against a candidate version.

use crate::types::{Name, Uri};
use crate::version::{Version, VersionRange};
use crate::{Limits, SchemaError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::trace;

/// A node of a dependency constraint tree, discriminated on the wire by `type`.
///
/// Every node carries a `name` and an optional `source`; the variant decides
/// the payload. Trees own their children, so a node can never be its own
/// descendant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Dependency {
    /// The base discriminator. Accepted on input, never evaluable.
    #[serde(rename = "abstract-dependency")]
    Abstract(AbstractDependency),
    #[serde(rename = "range-dependency")]
    Range(RangeDependency),
    #[serde(rename = "version-dependency", alias = "varsion-dependency")]
    Version(VersionDependency),
    #[serde(rename = "not-version-dependency")]
    Not(NotVersionDependency),
    #[serde(rename = "and-version-dependency")]
    And(DependencyGroup),
    #[serde(rename = "or-version-dependency")]
    Or(DependencyGroup),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbstractDependency {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Uri>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeDependency {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Uri>,
    pub range: VersionRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionDependency {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Uri>,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotVersionDependency {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Uri>,
    pub target: Box<Dependency>,
}

/// Items joined with AND or OR, depending on the enclosing variant.
///
/// Decoding rejects an empty `items` list. Groups assembled by hand with no
/// items are reported by validation and refused by evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyGroup {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Uri>,
    #[serde(deserialize_with = "non_empty_items")]
    pub items: Vec<Dependency>,
}

fn non_empty_items<'de, D>(deserializer: D) -> Result<Vec<Dependency>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Dependency>::deserialize(deserializer)?;
    if items.is_empty() {
        return Err(serde::de::Error::custom(
            "dependency group items must not be empty",
        ));
    }
    Ok(items)
}

impl Dependency {
    pub fn range(name: impl Into<Name>, range: VersionRange) -> Self {
        Self::Range(RangeDependency {
            name: name.into(),
            source: None,
            range,
        })
    }

    pub fn exact(name: impl Into<Name>, version: Version) -> Self {
        Self::Version(VersionDependency {
            name: name.into(),
            source: None,
            version,
        })
    }

    pub fn not(name: impl Into<Name>, target: Dependency) -> Self {
        Self::Not(NotVersionDependency {
            name: name.into(),
            source: None,
            target: Box::new(target),
        })
    }

    /// AND-group over `items`; fails when `items` is empty.
    pub fn all_of(name: impl Into<Name>, items: Vec<Dependency>) -> Result<Self, SchemaError> {
        Ok(Self::And(DependencyGroup::new(name, items)?))
    }

    /// OR-group over `items`; fails when `items` is empty.
    pub fn any_of(name: impl Into<Name>, items: Vec<Dependency>) -> Result<Self, SchemaError> {
        Ok(Self::Or(DependencyGroup::new(name, items)?))
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<Uri>) -> Self {
        let slot = match &mut self {
            Self::Abstract(d) => &mut d.source,
            Self::Range(d) => &mut d.source,
            Self::Version(d) => &mut d.source,
            Self::Not(d) => &mut d.source,
            Self::And(g) | Self::Or(g) => &mut g.source,
        };
        *slot = Some(source.into());
        self
    }

    pub fn name(&self) -> &Name {
        match self {
            Self::Abstract(d) => &d.name,
            Self::Range(d) => &d.name,
            Self::Version(d) => &d.name,
            Self::Not(d) => &d.name,
            Self::And(g) | Self::Or(g) => &g.name,
        }
    }

    pub fn source(&self) -> Option<&Uri> {
        match self {
            Self::Abstract(d) => d.source.as_ref(),
            Self::Range(d) => d.source.as_ref(),
            Self::Version(d) => d.source.as_ref(),
            Self::Not(d) => d.source.as_ref(),
            Self::And(g) | Self::Or(g) => g.source.as_ref(),
        }
    }

    /// The wire discriminator of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Abstract(_) => "abstract-dependency",
            Self::Range(_) => "range-dependency",
            Self::Version(_) => "version-dependency",
            Self::Not(_) => "not-version-dependency",
            Self::And(_) => "and-version-dependency",
            Self::Or(_) => "or-version-dependency",
        }
    }

    /// Direct children: the negated target or the group items.
    pub fn children(&self) -> &[Dependency] {
        match self {
            Self::Abstract(_) | Self::Range(_) | Self::Version(_) => &[],
            Self::Not(d) => std::slice::from_ref(&*d.target),
            Self::And(g) | Self::Or(g) => &g.items,
        }
    }

    /// Total number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Length of the longest root-to-leaf path; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children().iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Test `v` against this tree with the default [`Limits`].
    pub fn satisfies(&self, v: &Version) -> Result<bool, SchemaError> {
        self.satisfies_with(v, &Limits::default())
    }

    /// Test `v` against this tree.
    ///
    /// The whole tree is checked against `limits` and for evaluability first,
    /// so errors do not depend on item order or on which branches a
    /// short-circuit would skip. Evaluation itself is pure.
    pub fn satisfies_with(&self, v: &Version, limits: &Limits) -> Result<bool, SchemaError> {
        self.check_evaluable(limits)?;
        let result = self.eval(v);
        trace!("{} {} {v}: {result}", self.kind(), self.name());
        Ok(result)
    }

    /// Fail if the tree exceeds `limits`, contains an abstract node, or has an empty group.
    pub fn check_evaluable(&self, limits: &Limits) -> Result<(), SchemaError> {
        let mut visited = 0;
        self.check_node(1, limits, &mut visited)
    }

    fn check_node(
        &self,
        depth: usize,
        limits: &Limits,
        visited: &mut usize,
    ) -> Result<(), SchemaError> {
        if depth > limits.max_depth {
            return Err(SchemaError::DepthExceeded {
                limit: limits.max_depth,
            });
        }
        *visited += 1;
        if *visited > limits.max_nodes {
            return Err(SchemaError::NodeLimitExceeded {
                limit: limits.max_nodes,
            });
        }
        match self {
            Self::Abstract(d) => {
                return Err(SchemaError::Structural(format!(
                    "abstract-dependency '{}' cannot be evaluated",
                    d.name
                )));
            }
            Self::And(g) | Self::Or(g) if g.items.is_empty() => {
                return Err(SchemaError::Structural(format!(
                    "{} '{}' has no items",
                    self.kind(),
                    g.name
                )));
            }
            _ => {}
        }
        for child in self.children() {
            child.check_node(depth + 1, limits, visited)?;
        }
        Ok(())
    }

    fn eval(&self, v: &Version) -> bool {
        match self {
            Self::Abstract(_) => false,
            Self::Range(d) => d.range.contains(v),
            Self::Version(d) => d.version == *v,
            Self::Not(d) => !d.target.eval(v),
            Self::And(g) => g.items.iter().all(|item| item.eval(v)),
            Self::Or(g) => g.items.iter().any(|item| item.eval(v)),
        }
    }
}

impl DependencyGroup {
    pub fn new(name: impl Into<Name>, items: Vec<Dependency>) -> Result<Self, SchemaError> {
        let name = name.into();
        if items.is_empty() {
            return Err(SchemaError::Structural(format!(
                "dependency group '{name}' has no items"
            )));
        }
        Ok(Self {
            name,
            source: None,
            items,
        })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, items: &[Dependency], op: &str| {
            f.write_str("(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str(")")
        };
        match self {
            Self::Abstract(d) => write!(f, "{} <abstract>", d.name),
            Self::Range(d) => write!(f, "{} in {}", d.name, d.range),
            Self::Version(d) => write!(f, "{} == {}", d.name, d.version),
            Self::Not(d) => write!(f, "!{}", d.target),
            Self::And(g) => join(f, &g.items, "&&"),
            Self::Or(g) => join(f, &g.items, "||"),
        }
    }
}
