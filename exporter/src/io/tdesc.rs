//! TDESC serialization of tuned classes.
//!
//! The [`Serializer`] trait is the only contract the exporter relies on.
//! [`TdescWriter`] is the production implementation; tests use scripted
//! serializers that never touch the filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::types::TunedClass;
use crate::host::HostRuntime;

/// Writes the description of one tuned class.
pub trait Serializer {
    /// Export `class` into `output_dir`.
    ///
    /// `Ok(false)` means the class could not be described; errors are
    /// reserved for failures the caller cannot classify.
    fn export_class(&self, class: &TunedClass, output_dir: &Path, type_tag: &str) -> Result<bool>;
}

/// On-disk TDESC document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TdescDocument<'a> {
    pub class: &'a str,
    pub module: &'a str,
    pub instance_type: &'a str,
    pub tunables: Vec<TunableDescription<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TunableDescription<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub tunable_type: &'a str,
    pub default: &'a Value,
    /// Injected attributes, ordered by name; unset ones are omitted.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<&'a str, Value>,
}

/// Serializer backed by a loaded [`HostRuntime`].
pub struct TdescWriter<'a> {
    host: &'a HostRuntime,
    extension: String,
}

impl<'a> TdescWriter<'a> {
    pub fn new(host: &'a HostRuntime, extension: impl Into<String>) -> Self {
        Self {
            host,
            extension: extension.into(),
        }
    }

    pub fn file_path(&self, class: &TunedClass, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", class.name, self.extension))
    }

    /// Build the document for `class`, or `None` without bookkeeping.
    pub fn describe<'b>(
        &'b self,
        class: &'b TunedClass,
        type_tag: &'b str,
    ) -> Option<TdescDocument<'b>> {
        let fields = self.host.tunables_of(class)?;
        let mut tunables = Vec::with_capacity(fields.len());
        for (name, id) in fields {
            let slots = self.host.slots(*id)?;
            tunables.push(TunableDescription {
                name,
                tunable_type: &slots.tunable_type,
                default: &slots.default,
                attributes: self.host.attributes().injected_values(*id),
            });
        }
        Some(TdescDocument {
            class: &class.name,
            module: &class.module,
            instance_type: type_tag,
            tunables,
        })
    }
}

impl Serializer for TdescWriter<'_> {
    #[instrument(skip_all, fields(class = %class.qualified_name(), type_tag = %type_tag))]
    fn export_class(&self, class: &TunedClass, output_dir: &Path, type_tag: &str) -> Result<bool> {
        let Some(document) = self.describe(class, type_tag) else {
            debug!("no tunable bookkeeping for class");
            return Ok(false);
        };
        fs::create_dir_all(output_dir)
            .with_context(|| format!("create output dir {}", output_dir.display()))?;
        let path = self.file_path(class, output_dir);
        let mut buf = serde_json::to_string_pretty(&document).context("serialize tdesc")?;
        buf.push('\n');
        fs::write(&path, buf).with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), tunables = document.tunables.len(), "tdesc written");
        Ok(true)
    }
}
