//! Exporter configuration (TOML).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// What traversal does with a nested module member.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NestedNamespaces {
    /// Recurse into the nested module.
    #[default]
    Descend,
    /// Leave nested modules alone; only the requested module is scanned.
    Ignore,
}

/// Exporter configuration.
///
/// Missing fields default to the layout of a stock game install.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Ancestor directory name searched upwards from the tool location
    /// (compared case-insensitively).
    pub ancestor_dir: String,

    /// Subdirectory of the ancestor that receives exported descriptions.
    pub descriptions_dir: String,

    /// Extension of written description files.
    pub file_extension: String,

    pub nested_namespaces: NestedNamespaces,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            ancestor_dir: "The Sims 4".to_string(),
            descriptions_dir: "Descriptions".to_string(),
            file_extension: "tdesc".to_string(),
            nested_namespaces: NestedNamespaces::Descend,
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ancestor_dir.trim().is_empty() {
            return Err(anyhow!("ancestor_dir must be non-empty"));
        }
        if self.descriptions_dir.trim().is_empty() {
            return Err(anyhow!("descriptions_dir must be non-empty"));
        }
        if self.file_extension.trim().is_empty() || self.file_extension.contains(['/', '\\']) {
            return Err(anyhow!(
                "file_extension must be a non-empty name without separators"
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ExporterConfig::default()`.
pub fn load_config(path: &Path) -> Result<ExporterConfig> {
    if !path.exists() {
        let cfg = ExporterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ExporterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
