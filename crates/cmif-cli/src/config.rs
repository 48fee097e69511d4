use cmif_schema::Limits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_MAX_DEPTH: &str = "CMIF_MAX_DEPTH";
pub const ENV_MAX_NODES: &str = "CMIF_MAX_NODES";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub limits: Limits,
}

impl CliConfig {
    /// Load `~/.config/cmif/config.toml`, falling back to defaults when it does not exist.
    pub fn load_default() -> Result<Self, String> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("config error: failed to read {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| format!("config error: invalid {}: {e}", path.display()))?;
        ensure_positive("limits.max_depth", config.limits.max_depth)?;
        ensure_positive("limits.max_nodes", config.limits.max_nodes)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `CMIF_MAX_DEPTH` / `CMIF_MAX_NODES` overrides from `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            self.limits.max_depth = parse_limit(ENV_MAX_DEPTH, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_NODES) {
            self.limits.max_nodes = parse_limit(ENV_MAX_NODES, &raw)?;
        }
        Ok(self)
    }
}

fn parse_limit(var: &str, raw: &str) -> Result<usize, String> {
    let n = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("config error: {var} must be a positive integer, got '{raw}'"))?;
    ensure_positive(var, n)
}

fn ensure_positive(key: &str, n: usize) -> Result<usize, String> {
    if n == 0 {
        return Err(format!(
            "config error: {key} must be a positive integer, got '0'"
        ));
    }
    Ok(n)
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config/cmif/config.toml"))
}
