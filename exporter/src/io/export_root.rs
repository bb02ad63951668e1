//! Locating the directory that receives exported descriptions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::io::config::ExporterConfig;

/// Finds `<ancestor>/<descriptions>` above a start directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRootLocator {
    pub start: PathBuf,
    pub ancestor_dir: String,
    pub descriptions_dir: String,
}

impl ExportRootLocator {
    pub fn new(start: impl Into<PathBuf>, cfg: &ExporterConfig) -> Self {
        Self {
            start: start.into(),
            ancestor_dir: cfg.ancestor_dir.clone(),
            descriptions_dir: cfg.descriptions_dir.clone(),
        }
    }

    /// Locator starting at the directory of the running executable.
    pub fn from_current_exe(cfg: &ExporterConfig) -> Result<Self> {
        let exe = std::env::current_exe().context("locate current executable")?;
        let dir = exe
            .parent()
            .with_context(|| format!("executable has no parent {}", exe.display()))?;
        Ok(Self::new(dir, cfg))
    }

    /// Nearest directory (the start itself included) named like the ancestor,
    /// joined with the descriptions directory.
    pub fn locate(&self) -> Option<PathBuf> {
        find_ancestor(&self.start, &self.ancestor_dir).map(|dir| dir.join(&self.descriptions_dir))
    }
}

fn find_ancestor<'a>(start: &'a Path, name: &str) -> Option<&'a Path> {
    let wanted = name.to_lowercase();
    start.ancestors().find(|dir| {
        dir.file_name()
            .is_some_and(|file_name| file_name.to_string_lossy().to_lowercase() == wanted)
    })
}
