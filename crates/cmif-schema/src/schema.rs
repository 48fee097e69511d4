//! JSON Schema export for the manifest wire format.
//!
//! The document is assembled from the same constants the data model uses and
//! is purely descriptive; validation never consults it.

use crate::types::{DIGEST_PATTERN, NAME_PATTERN};
use crate::version::MAX_COMPONENT;
use serde_json::{json, Map, Value};

pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-04/schema#";

/// Union of every dependency discriminator, referenced wherever a tree node may appear.
const DEPENDENCY_DEF: &str = "dependency";

const DEPENDENCY_KINDS: [&str; 6] = [
    "abstract-dependency",
    "range-dependency",
    "version-dependency",
    "not-version-dependency",
    "and-version-dependency",
    "or-version-dependency",
];

/// Misspelled discriminator still accepted for `version-dependency`.
const VERSION_KIND_ALIAS: &str = "varsion-dependency";

fn discriminators(kind: &str) -> Vec<&str> {
    if kind == "version-dependency" {
        vec![kind, VERSION_KIND_ALIAS]
    } else {
        vec![kind]
    }
}

fn reference(definition: &str) -> Value {
    json!({ "$ref": format!("#/definitions/{definition}") })
}

fn version() -> Value {
    let component = |description: &str| {
        json!({
            "type": "number",
            "multipleOf": 1,
            "minimum": 0,
            "maximum": MAX_COMPONENT,
            "description": description,
        })
    };
    json!({
        "type": "object",
        "description": "X.Y.Z version specification; components are called <MAJOR>.<MINOR>.<BUILD>",
        "properties": {
            "major": component("major version number"),
            "minor": component("minor version number"),
            "build": component("build version number"),
        },
        "required": ["major"],
    })
}

fn version_range() -> Value {
    json!({
        "type": "object",
        "description": "version range with independently exclusive or inclusive bounds",
        "properties": {
            "version_start": reference("version"),
            "version_end": reference("version"),
            "start_exclusive": {
                "type": "boolean",
                "description": "make the start specification exclusive",
            },
            "end_exclusive": {
                "type": "boolean",
                "description": "make the end specification exclusive",
            },
        },
        "required": ["version_start", "version_end"],
    })
}

/// One concrete dependency definition: the shared base fields plus `payload`.
fn dependency_node(kind: &str, description: &str, payload: &[(&str, Value)]) -> Value {
    let mut properties = Map::new();
    properties.insert(
        "type".to_owned(),
        json!({ "type": "string", "enum": discriminators(kind) }),
    );
    properties.insert(
        "name".to_owned(),
        json!({ "type": "string", "pattern": NAME_PATTERN, "description": "name of the dependency" }),
    );
    properties.insert(
        "source".to_owned(),
        json!({ "type": "string", "format": "uri", "description": "URI source of the dependency" }),
    );
    let mut required = vec![json!("type"), json!("name")];
    for (field, schema) in payload {
        properties.insert((*field).to_owned(), schema.clone());
        required.push(json!(field));
    }
    json!({
        "type": "object",
        "description": description,
        "properties": properties,
        "required": required,
    })
}

fn group_items(description: &str) -> Value {
    json!({
        "type": "array",
        "items": reference(DEPENDENCY_DEF),
        "minItems": 1,
        "description": description,
    })
}

fn digest(description: &str) -> Value {
    json!({ "type": "string", "pattern": DIGEST_PATTERN, "description": description })
}

fn file_trait() -> Value {
    let flag = |description: &str| json!({ "type": "boolean", "description": description });
    json!({
        "type": "object",
        "description": "basic properties of a provided file",
        "properties": {
            "is_executable": flag("true for executable binaries"),
            "is_library": flag("true for library binaries"),
            "is_header": flag("true for header files"),
            "is_source": flag("true for source files"),
            "language": { "type": "string", "description": "implementation language" },
        },
        "required": ["language"],
    })
}

fn file_provide() -> Value {
    json!({
        "type": "object",
        "description": "a single file provided by the artifact",
        "properties": {
            "name": { "type": "string", "description": "basename of the file" },
            "uri": { "type": "string", "format": "uri", "description": "chroot relative uri of the file" },
            "hash": digest("128-bit hex digest of the file"),
            "architecture": {
                "type": "string",
                "pattern": NAME_PATTERN,
                "description": "architecture description string",
            },
            "traits": {
                "type": "array",
                "items": reference("file-trait"),
                "description": "traits of the file",
            },
        },
    })
}

fn archive() -> Value {
    json!({
        "type": "object",
        "description": "a source archive",
        "properties": {
            "uri": { "type": "string", "format": "uri", "description": "location of the archive" },
            "hash": digest("128-bit hex digest of the archive"),
        },
    })
}

fn manifest_properties() -> Value {
    json!({
        "artifact_version": reference("version"),
        "manifest_version": reference("version"),
        "sources": {
            "type": "array",
            "items": reference("archive"),
            "description": "all source archives for the artifact",
        },
        "origin": {
            "type": "string",
            "format": "uri",
            "description": "authoritative source of the artifact",
        },
        "name": { "type": "string", "pattern": NAME_PATTERN, "description": "name of the artifact" },
        "licenses": {
            "type": "array",
            "items": { "type": "string" },
            "description": "licenses applicable to the artifact",
        },
        "dependencies": {
            "type": "array",
            "items": reference(DEPENDENCY_DEF),
            "uniqueItems": true,
            "description": "list of artifact dependencies",
        },
        "provides": {
            "type": "array",
            "items": reference("file-provide"),
            "description": "list of provided files",
        },
    })
}

fn definitions() -> Map<String, Value> {
    let mut defs = Map::new();
    defs.insert("version".to_owned(), version());
    defs.insert("version-range".to_owned(), version_range());
    defs.insert(
        "abstract-dependency".to_owned(),
        dependency_node(
            "abstract-dependency",
            "base for dependencies; each dependency has a name and a source URI",
            &[],
        ),
    );
    defs.insert(
        "range-dependency".to_owned(),
        dependency_node(
            "range-dependency",
            "version range dependency",
            &[("range", reference("version-range"))],
        ),
    );
    defs.insert(
        "version-dependency".to_owned(),
        dependency_node(
            "version-dependency",
            "exact version dependency",
            &[("version", reference("version"))],
        ),
    );
    defs.insert(
        "not-version-dependency".to_owned(),
        dependency_node(
            "not-version-dependency",
            "negates the result of another dependency",
            &[("target", reference(DEPENDENCY_DEF))],
        ),
    );
    defs.insert(
        "and-version-dependency".to_owned(),
        dependency_node(
            "and-version-dependency",
            "collates items under an AND clause",
            &[("items", group_items("items to join with AND"))],
        ),
    );
    defs.insert(
        "or-version-dependency".to_owned(),
        dependency_node(
            "or-version-dependency",
            "collates items under an OR clause",
            &[("items", group_items("items to join with OR"))],
        ),
    );
    defs.insert(
        DEPENDENCY_DEF.to_owned(),
        json!({ "oneOf": DEPENDENCY_KINDS.into_iter().map(reference).collect::<Vec<_>>() }),
    );
    defs.insert("file-trait".to_owned(), file_trait());
    defs.insert("file-provide".to_owned(), file_provide());
    defs.insert("archive".to_owned(), archive());
    defs
}

/// The JSON Schema describing a manifest document.
pub fn manifest_schema() -> Value {
    json!({
        "$schema": SCHEMA_DIALECT,
        "id": "manifest",
        "type": "object",
        "description": "manifest of a build or package artifact",
        "definitions": definitions(),
        "properties": manifest_properties(),
        "required": ["artifact_version", "manifest_version", "name"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_refs<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(r)) = map.get("$ref") {
                    out.push(r);
                }
                map.values().for_each(|v| collect_refs(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
            _ => {}
        }
    }

    #[test]
    fn every_ref_resolves() {
        let schema = manifest_schema();
        let mut refs = Vec::new();
        collect_refs(&schema, &mut refs);
        assert!(!refs.is_empty());
        for r in refs {
            let id = r.strip_prefix("#/definitions/").expect("local ref");
            assert!(schema["definitions"].get(id).is_some(), "dangling {r}");
        }
    }

    #[test]
    fn defines_every_record() {
        let schema = manifest_schema();
        for id in [
            "version",
            "version-range",
            "file-trait",
            "file-provide",
            "archive",
            DEPENDENCY_DEF,
        ]
        .into_iter()
        .chain(DEPENDENCY_KINDS)
        {
            assert!(schema["definitions"].get(id).is_some(), "missing {id}");
        }
    }

    #[test]
    fn dependency_discriminators_are_pinned() {
        let schema = manifest_schema();
        for kind in DEPENDENCY_KINDS {
            assert_eq!(
                schema["definitions"][kind]["properties"]["type"]["enum"],
                json!(discriminators(kind))
            );
        }
        assert_eq!(
            schema["definitions"]["version-dependency"]["properties"]["type"]["enum"],
            json!(["version-dependency", "varsion-dependency"])
        );
        assert_eq!(
            schema["definitions"]["and-version-dependency"]["required"],
            json!(["type", "name", "items"])
        );
    }

    #[test]
    fn patterns_come_from_the_model() {
        let schema = manifest_schema();
        assert_eq!(schema["properties"]["name"]["pattern"], NAME_PATTERN);
        assert_eq!(
            schema["definitions"]["archive"]["properties"]["hash"]["pattern"],
            DIGEST_PATTERN
        );
        assert_eq!(
            schema["definitions"]["version"]["properties"]["minor"]["maximum"],
            999
        );
        assert_eq!(schema["properties"]["dependencies"]["uniqueItems"], true);
    }

    #[test]
    fn version_components_admit_integral_floats() {
        let major = &manifest_schema()["definitions"]["version"]["properties"]["major"];
        assert_eq!(major["type"], "number");
        assert_eq!(major["multipleOf"], 1);
        let decoded: crate::Version = serde_json::from_str(r#"{"major": 2.0}"#).unwrap();
        assert_eq!(decoded.major(), 2);
    }
}
