pub mod check;
pub mod completions;
pub mod inspect;
pub mod man_pages;
pub mod schema;
pub mod validate;

use cmif_schema::{parse_manifest_file, Manifest};
use console::Style;
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_INVALID_MANIFEST: u8 = 3;
pub const EXIT_UNSATISFIED: u8 = 4;
pub const EXIT_CONFIG_ERROR: u8 = 5;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn load_manifest(path: &Path) -> Result<Manifest, String> {
    parse_manifest_file(path).map_err(|e| e.to_string())
}

pub fn colorize_verdict(ok: bool) -> String {
    if ok {
        Style::new().green().apply_to("ok").to_string()
    } else {
        Style::new().red().bold().apply_to("FAIL").to_string()
    }
}
