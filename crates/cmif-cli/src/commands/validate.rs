use super::{json_pretty, load_manifest, EXIT_INVALID_MANIFEST, EXIT_SUCCESS};
use cmif_schema::{validate_with, Limits};
use std::path::Path;

pub fn run(manifest_path: &Path, limits: &Limits, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    let violations = validate_with(&manifest, limits);

    if json {
        let payload = serde_json::json!({
            "manifest": manifest_path.display().to_string(),
            "name": manifest.name,
            "valid": violations.is_empty(),
            "violations": violations,
        });
        println!("{}", json_pretty(&payload)?);
    } else if violations.is_empty() {
        println!("{}: valid", manifest_path.display());
    } else {
        println!(
            "{}: {} violation(s)",
            manifest_path.display(),
            violations.len()
        );
        for v in &violations {
            println!("  {v}");
        }
    }

    if violations.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_INVALID_MANIFEST)
    }
}
