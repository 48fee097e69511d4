use super::{json_pretty, load_manifest, EXIT_SUCCESS};
use std::path::Path;

pub fn run(manifest_path: &Path, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;

    if json {
        let dependencies: Vec<_> = manifest
            .dependencies
            .iter()
            .map(|d| {
                serde_json::json!({
                    "name": d.name(),
                    "kind": d.kind(),
                    "nodes": d.node_count(),
                    "depth": d.depth(),
                })
            })
            .collect();
        let payload = serde_json::json!({
            "name": manifest.name,
            "artifact_version": manifest.artifact_version.to_string(),
            "manifest_version": manifest.manifest_version.to_string(),
            "origin": manifest.origin,
            "licenses": manifest.licenses,
            "sources": manifest.sources.len(),
            "dependencies": dependencies,
            "provides": manifest.provides.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("name:              {}", manifest.name);
        println!("artifact_version:  {}", manifest.artifact_version);
        println!("manifest_version:  {}", manifest.manifest_version);
        println!(
            "origin:            {}",
            manifest.origin.as_deref().unwrap_or("(none)")
        );
        println!("licenses:          {}", manifest.licenses.join(", "));
        println!("sources:           {}", manifest.sources.len());
        println!("provides:          {}", manifest.provides.len());
        println!("dependencies:      {}", manifest.dependencies.len());
        for d in &manifest.dependencies {
            println!("  {:<24} {:<24} {d}", d.name().as_str(), d.kind());
        }
    }
    Ok(EXIT_SUCCESS)
}
