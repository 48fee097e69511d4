use super::{colorize_verdict, json_pretty, load_manifest, EXIT_SUCCESS, EXIT_UNSATISFIED};
use cmif_schema::{Limits, Version};
use std::path::Path;
use tracing::debug;

pub fn run(
    manifest_path: &Path,
    dependency: &str,
    version: &str,
    limits: &Limits,
    json: bool,
) -> Result<u8, String> {
    let candidate: Version = version
        .parse()
        .map_err(|e| format!("invalid version '{version}': {e}"))?;
    let manifest = load_manifest(manifest_path)?;

    let mut results = Vec::new();
    for (index, tree) in manifest.dependencies_named(dependency).enumerate() {
        let satisfied = tree
            .satisfies_with(&candidate, limits)
            .map_err(|e| format!("cannot evaluate '{dependency}' constraint #{index}: {e}"))?;
        debug!("{tree} at {candidate}: {satisfied}");
        results.push((tree, satisfied));
    }
    if results.is_empty() {
        return Err(format!(
            "no dependency named '{dependency}' in {}",
            manifest_path.display()
        ));
    }
    let all_satisfied = results.iter().all(|(_, ok)| *ok);

    if json {
        let constraints: Vec<_> = results
            .iter()
            .map(|(tree, ok)| {
                serde_json::json!({
                    "kind": tree.kind(),
                    "constraint": tree.to_string(),
                    "satisfied": ok,
                })
            })
            .collect();
        let payload = serde_json::json!({
            "dependency": dependency,
            "version": candidate.to_string(),
            "satisfied": all_satisfied,
            "constraints": constraints,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        for (tree, ok) in &results {
            println!("{} {tree}", colorize_verdict(*ok));
        }
        println!(
            "{dependency} {candidate}: {}",
            if all_satisfied {
                "satisfied"
            } else {
                "not satisfied"
            }
        );
    }

    if all_satisfied {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_UNSATISFIED)
    }
}
