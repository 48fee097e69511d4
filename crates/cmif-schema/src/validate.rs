//! Single-pass manifest validation that accumulates every violation.
//!
//! Version components and range bounds are checked when the values are
//! built, so a constructed [`Manifest`] always carries valid versions. This
//! pass covers what construction leaves open: name, digest and URI patterns,
//! group and discriminator structure, tree size, and duplicate dependencies.

use crate::dependency::Dependency;
use crate::file::FileProvides;
use crate::manifest::Manifest;
use crate::types::{Digest, Name, Uri, DIGEST_PATTERN, NAME_PATTERN};
use crate::Limits;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A name, digest or architecture failing its pattern.
    PatternMismatch,
    /// Empty group, abstract node, or missing required content.
    Structural,
    /// Two deep-equal top-level dependency trees.
    DuplicateDependency,
    DepthExceeded,
    NodeLimitExceeded,
    InvalidUri,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PatternMismatch => "pattern-mismatch",
            Self::Structural => "structural",
            Self::DuplicateDependency => "duplicate-dependency",
            Self::DepthExceeded => "depth-exceeded",
            Self::NodeLimitExceeded => "node-limit-exceeded",
            Self::InvalidUri => "invalid-uri",
        };
        f.write_str(s)
    }
}

/// One problem found in a manifest, located by a path such as
/// `dependencies[1].items[0].name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.path, self.kind, self.message)
    }
}

/// Validate with the default [`Limits`]. An empty result means the manifest is well-formed.
pub fn validate(manifest: &Manifest) -> Vec<Violation> {
    validate_with(manifest, &Limits::default())
}

pub fn validate_with(manifest: &Manifest, limits: &Limits) -> Vec<Violation> {
    let mut v = Validator {
        limits,
        violations: Vec::new(),
    };

    v.name("name", &manifest.name);
    if let Some(origin) = &manifest.origin {
        v.absolute_uri("origin", origin);
    }
    for (i, archive) in manifest.sources.iter().enumerate() {
        if let Some(uri) = &archive.uri {
            v.absolute_uri(&format!("sources[{i}].uri"), uri);
        }
        if let Some(hash) = &archive.hash {
            v.digest(&format!("sources[{i}].hash"), hash);
        }
    }

    let mut bounded = Vec::with_capacity(manifest.dependencies.len());
    for (i, dep) in manifest.dependencies.iter().enumerate() {
        if v.tree(&format!("dependencies[{i}]"), dep) {
            bounded.push((i, dep));
        }
    }
    v.duplicates(&bounded);

    for (i, provide) in manifest.provides.iter().enumerate() {
        v.provide(&format!("provides[{i}]"), provide);
    }

    debug!(
        "validated manifest '{}': {} violation(s)",
        manifest.name,
        v.violations.len()
    );
    v.violations
}

#[derive(Default)]
struct TreeWalk {
    visited: usize,
    truncated: bool,
}

struct Validator<'a> {
    limits: &'a Limits,
    violations: Vec<Violation>,
}

impl Validator<'_> {
    fn push(&mut self, kind: ViolationKind, path: &str, message: String) {
        self.violations.push(Violation {
            kind,
            path: path.to_owned(),
            message,
        });
    }

    fn name(&mut self, path: &str, name: &Name) {
        if !name.is_well_qualified() {
            self.push(
                ViolationKind::PatternMismatch,
                path,
                format!("'{name}' does not match {NAME_PATTERN}"),
            );
        }
    }

    fn digest(&mut self, path: &str, digest: &Digest) {
        if !digest.is_well_formed() {
            self.push(
                ViolationKind::PatternMismatch,
                path,
                format!("'{digest}' does not match {DIGEST_PATTERN}"),
            );
        }
    }

    fn absolute_uri(&mut self, path: &str, uri: &Uri) {
        if !uri.is_absolute() {
            self.push(
                ViolationKind::InvalidUri,
                path,
                format!("'{uri}' is not an absolute URI"),
            );
        }
    }

    fn provide(&mut self, path: &str, provide: &FileProvides) {
        if let Some(uri) = &provide.uri {
            if !uri.is_reference() {
                self.push(
                    ViolationKind::InvalidUri,
                    &format!("{path}.uri"),
                    format!("'{uri}' is not a URI reference"),
                );
            }
        }
        if let Some(hash) = &provide.hash {
            self.digest(&format!("{path}.hash"), hash);
        }
        if let Some(arch) = &provide.architecture {
            self.name(&format!("{path}.architecture"), arch);
        }
        for (j, t) in provide.traits.iter().enumerate() {
            if t.language.trim().is_empty() {
                self.push(
                    ViolationKind::Structural,
                    &format!("{path}.traits[{j}].language"),
                    "file trait must name an implementation language".to_owned(),
                );
            }
        }
    }

    /// Check one top-level tree. Returns false when the tree exceeded the
    /// limits and was only partially inspected.
    fn tree(&mut self, path: &str, root: &Dependency) -> bool {
        let mut walk = TreeWalk::default();
        self.node(path, root, 1, &mut walk);
        !walk.truncated
    }

    /// Returns false once the node budget is spent and the walk must stop.
    /// A branch past the depth ceiling is skipped but its siblings are still checked.
    fn node(&mut self, path: &str, node: &Dependency, depth: usize, walk: &mut TreeWalk) -> bool {
        if depth > self.limits.max_depth {
            self.push(
                ViolationKind::DepthExceeded,
                path,
                format!("nesting deeper than {} levels", self.limits.max_depth),
            );
            walk.truncated = true;
            return true;
        }
        walk.visited += 1;
        if walk.visited > self.limits.max_nodes {
            self.push(
                ViolationKind::NodeLimitExceeded,
                path,
                format!("tree has more than {} nodes", self.limits.max_nodes),
            );
            walk.truncated = true;
            return false;
        }

        self.name(&format!("{path}.name"), node.name());
        if let Some(source) = node.source() {
            self.absolute_uri(&format!("{path}.source"), source);
        }

        match node {
            Dependency::Abstract(_) => self.push(
                ViolationKind::Structural,
                &format!("{path}.type"),
                "abstract-dependency is not a concrete dependency".to_owned(),
            ),
            Dependency::Not(d) => {
                return self.node(&format!("{path}.target"), &d.target, depth + 1, walk);
            }
            Dependency::And(g) | Dependency::Or(g) => {
                if g.items.is_empty() {
                    self.push(
                        ViolationKind::Structural,
                        &format!("{path}.items"),
                        format!("{} must have at least one item", node.kind()),
                    );
                }
                for (j, item) in g.items.iter().enumerate() {
                    if !self.node(&format!("{path}.items[{j}]"), item, depth + 1, walk) {
                        return false;
                    }
                }
            }
            Dependency::Range(_) | Dependency::Version(_) => {}
        }
        true
    }

    fn duplicates(&mut self, deps: &[(usize, &Dependency)]) {
        let mut seen: HashMap<&Dependency, usize> = HashMap::with_capacity(deps.len());
        for &(i, dep) in deps {
            if let Some(first) = seen.get(dep) {
                self.push(
                    ViolationKind::DuplicateDependency,
                    &format!("dependencies[{i}]"),
                    format!("'{}' duplicates dependencies[{first}]", dep.name()),
                );
            } else {
                seen.insert(dep, i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{AbstractDependency, DependencyGroup};
    use crate::file::{Archive, FileTrait};
    use crate::version::{Version, VersionRange};

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn base() -> Manifest {
        Manifest::new("zlib", v("1.3.1"), v("1"))
    }

    fn kinds(violations: &[Violation]) -> Vec<ViolationKind> {
        violations.iter().map(|x| x.kind).collect()
    }

    #[test]
    fn clean_manifest_has_no_violations() {
        let mut m = base();
        m.origin = Some(Uri::new("https://zlib.net"));
        m.sources.push(Archive::new(
            "https://zlib.net/zlib-1.3.1.tar.gz",
            "9855b6d802d7fe5b7bd5b196a2271655",
        ));
        m.dependencies.push(Dependency::range(
            "glibc",
            VersionRange::new(v("2.17"), v("3")).unwrap(),
        ));
        m.provides.push(FileProvides {
            name: Some("zlib.h".to_owned()),
            uri: Some(Uri::new("usr/include/zlib.h")),
            architecture: Some(Name::new("noarch")),
            traits: vec![FileTrait::new("c")],
            ..FileProvides::default()
        });
        assert_eq!(validate(&m), Vec::new());
    }

    #[test]
    fn reports_every_broken_field() {
        let mut m = Manifest::new("bad name", v("1"), v("1"));
        m.sources.push(Archive::new("https://example.org/a.tgz", "not-a-digest"));
        let violations = validate(&m);
        assert!(violations.len() >= 2, "{violations:?}");
        assert_eq!(violations[0].path, "name");
        assert_eq!(violations[1].path, "sources[0].hash");
        assert!(kinds(&violations)
            .iter()
            .all(|k| *k == ViolationKind::PatternMismatch));
    }

    #[test]
    fn flags_deep_equal_duplicates() {
        let mut m = base();
        m.dependencies.push(Dependency::exact("make", v("4")));
        m.dependencies.push(Dependency::exact("cmake", v("3")));
        m.dependencies.push(Dependency::exact("make", v("4.0.0")));
        let violations = validate(&m);
        assert_eq!(kinds(&violations), vec![ViolationKind::DuplicateDependency]);
        assert_eq!(violations[0].path, "dependencies[2]");
        assert!(violations[0].message.contains("dependencies[0]"));
    }

    #[test]
    fn same_name_different_trees_are_not_duplicates() {
        let mut m = base();
        m.dependencies.push(Dependency::exact("make", v("4")));
        m.dependencies
            .push(Dependency::not("make", Dependency::exact("make", v("4"))));
        m.dependencies
            .push(Dependency::exact("make", v("4")).with_source("https://gnu.org"));
        assert!(validate(&m).is_empty());
    }

    #[test]
    fn flags_empty_groups_and_abstract_nodes() {
        let mut m = base();
        let empty = Dependency::And(DependencyGroup {
            name: Name::new("x"),
            source: None,
            items: Vec::new(),
        });
        let abstract_node = Dependency::Abstract(AbstractDependency {
            name: Name::new("y"),
            source: None,
        });
        m.dependencies
            .push(Dependency::any_of("z", vec![empty, abstract_node]).unwrap());
        let violations = validate(&m);
        let paths: Vec<&str> = violations.iter().map(|x| x.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["dependencies[0].items[0].items", "dependencies[0].items[1].type"]
        );
        assert!(kinds(&violations)
            .iter()
            .all(|k| *k == ViolationKind::Structural));
    }

    #[test]
    fn checks_nested_names_and_sources() {
        let mut m = base();
        let inner = Dependency::exact("bad/name", v("1")).with_source("relative/path");
        m.dependencies.push(Dependency::not("ok", inner));
        let violations = validate(&m);
        assert_eq!(
            kinds(&violations),
            vec![ViolationKind::PatternMismatch, ViolationKind::InvalidUri]
        );
        assert_eq!(violations[0].path, "dependencies[0].target.name");
        assert_eq!(violations[1].path, "dependencies[0].target.source");
    }

    #[test]
    fn depth_limit_stops_descent_and_skips_duplicate_check() {
        let mut node = Dependency::exact("leaf", v("1"));
        for _ in 0..5 {
            node = Dependency::not("n", node);
        }
        let mut m = base();
        m.dependencies.push(node.clone());
        m.dependencies.push(node);
        let limits = Limits {
            max_depth: 3,
            ..Limits::default()
        };
        let violations = validate_with(&m, &limits);
        assert_eq!(
            kinds(&violations),
            vec![ViolationKind::DepthExceeded, ViolationKind::DepthExceeded]
        );
        assert_eq!(violations[0].path, "dependencies[0].target.target.target");
    }

    #[test]
    fn too_deep_item_does_not_hide_its_siblings() {
        let mut deep = Dependency::exact("leaf", v("1"));
        for _ in 0..5 {
            deep = Dependency::not("n", deep);
        }
        let group = Dependency::any_of("g", vec![deep, Dependency::exact("bad name", v("1"))])
            .unwrap();
        let mut m = base();
        m.dependencies.push(group.clone());
        m.dependencies.push(group);
        let limits = Limits {
            max_depth: 3,
            ..Limits::default()
        };
        let violations = validate_with(&m, &limits);
        assert_eq!(
            kinds(&violations),
            vec![
                ViolationKind::DepthExceeded,
                ViolationKind::PatternMismatch,
                ViolationKind::DepthExceeded,
                ViolationKind::PatternMismatch,
            ]
        );
        assert_eq!(violations[0].path, "dependencies[0].items[0].target.target");
        assert_eq!(violations[1].path, "dependencies[0].items[1].name");
    }

    #[test]
    fn node_limit_is_reported() {
        let items = (0..5).map(|i| Dependency::exact("x", v(&i.to_string()))).collect();
        let mut m = base();
        m.dependencies.push(Dependency::any_of("x", items).unwrap());
        let limits = Limits {
            max_nodes: 3,
            ..Limits::default()
        };
        let violations = validate_with(&m, &limits);
        assert_eq!(kinds(&violations), vec![ViolationKind::NodeLimitExceeded]);
    }

    #[test]
    fn checks_provides() {
        let mut m = base();
        m.provides.push(FileProvides {
            uri: Some(Uri::new("http://[::1")),
            hash: Some(Digest::new(
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            )),
            architecture: Some(Name::new("x86 64")),
            traits: vec![FileTrait::new("  ")],
            ..FileProvides::default()
        });
        let violations = validate(&m);
        assert_eq!(
            kinds(&violations),
            vec![
                ViolationKind::InvalidUri,
                ViolationKind::PatternMismatch,
                ViolationKind::PatternMismatch,
                ViolationKind::Structural,
            ]
        );
        assert_eq!(violations[3].path, "provides[0].traits[0].language");
    }

    #[test]
    fn origin_must_be_absolute() {
        let mut m = base();
        m.origin = Some(Uri::new("zlib.net"));
        let violations = validate(&m);
        assert_eq!(kinds(&violations), vec![ViolationKind::InvalidUri]);
        assert_eq!(
            violations[0].to_string(),
            "origin: [invalid-uri] 'zlib.net' is not an absolute URI"
        );
    }

    #[test]
    fn violation_serializes_kind_in_kebab_case() {
        let violation = Violation {
            kind: ViolationKind::DuplicateDependency,
            path: "dependencies[1]".to_owned(),
            message: "dup".to_owned(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["kind"], "duplicate-dependency");
    }
}
