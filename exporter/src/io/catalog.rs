//! Host catalog: the module graph and tunable declarations, stored as TOML.
//!
//! ```toml
//! [[modules]]
//! name = "mods.buffs"
//!
//! [[modules.members]]
//! kind = "tuned_class"
//! name = "MoodBuff"
//! manager_path = "Tuning/Buff"
//! type_tag = "buff"
//!
//! [[modules.members.tunables]]
//! field = "duration"
//! type = "int"
//! default = 5
//! deprecated = true
//!
//! [[modules.members]]
//! kind = "module"
//! name = "extra"
//! target = "mods.buffs.extra"
//! ```
//!
//! A tunable's field name is keyed `field`, so `name` is free to pass through
//! as a construction keyword like any other.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleSpec {
    /// Fully qualified module name.
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberSpec {
    /// Nested namespace bound under `name`. The member counts as defined by
    /// the parent of `target`, so an aliased foreign module is not local.
    Module { name: String, target: String },
    TunedClass {
        name: String,
        manager_path: String,
        type_tag: String,
        /// Defining module when the class is re-exported from elsewhere.
        #[serde(default)]
        defined_in: Option<String>,
        #[serde(default)]
        tunables: Vec<TunableSpec>,
    },
    Other {
        name: String,
        #[serde(default)]
        defined_in: Option<String>,
    },
}

impl MemberSpec {
    pub fn name(&self) -> &str {
        match self {
            MemberSpec::Module { name, .. }
            | MemberSpec::TunedClass { name, .. }
            | MemberSpec::Other { name, .. } => name,
        }
    }
}

/// One tunable field of a tuned class: native slots plus construction keywords.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TunableSpec {
    /// Name of the class field the tunable is bound to.
    pub field: String,
    #[serde(rename = "type")]
    pub tunable_type: String,
    #[serde(default)]
    pub default: Value,
    /// Remaining keys, passed to the constructor as keyword arguments.
    #[serde(flatten)]
    pub kwargs: BTreeMap<String, Value>,
}

impl Catalog {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(anyhow!("module name must be non-empty"));
            }
            if !seen.insert(module.name.as_str()) {
                return Err(anyhow!("duplicate module '{}'", module.name));
            }
            let mut members = HashSet::new();
            for member in &module.members {
                if member.name().trim().is_empty() {
                    return Err(anyhow!("{}: member name must be non-empty", module.name));
                }
                if !members.insert(member.name()) {
                    return Err(anyhow!(
                        "{}: duplicate member '{}'",
                        module.name,
                        member.name()
                    ));
                }
            }
        }
        for module in &self.modules {
            for member in &module.members {
                let MemberSpec::Module { name, target } = member else {
                    continue;
                };
                if !seen.contains(target.as_str()) {
                    return Err(anyhow!(
                        "{}.{}: unknown module '{}'",
                        module.name,
                        name,
                        target
                    ));
                }
            }
        }
        Ok(())
    }
}

pub fn parse_catalog(contents: &str) -> Result<Catalog> {
    let catalog: Catalog = toml::from_str(contents).context("parse catalog toml")?;
    catalog.validate()?;
    Ok(catalog)
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_catalog(&contents).with_context(|| format!("load catalog {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
[[modules]]
name = "mods.buffs"

[[modules.members]]
kind = "tuned_class"
name = "MoodBuff"
manager_path = "Tuning/Buff"
type_tag = "buff"

[[modules.members.tunables]]
field = "duration"
type = "int"
default = 5
deprecated = true
description = "Minutes the buff lasts."

[[modules.members]]
kind = "other"
name = "helper"

[[modules.members]]
kind = "module"
name = "extra"
target = "mods.buffs.extra"

[[modules]]
name = "mods.buffs.extra"
"#;

    #[test]
    fn parses_members_and_keywords() {
        let catalog = parse_catalog(SAMPLE).expect("parse");
        assert_eq!(catalog.modules.len(), 2);
        let members = &catalog.modules[0].members;
        assert_eq!(members.len(), 3);

        let MemberSpec::TunedClass { tunables, .. } = &members[0] else {
            panic!("expected tuned class, got {:?}", members[0]);
        };
        let tunable = &tunables[0];
        assert_eq!(tunable.tunable_type, "int");
        assert_eq!(tunable.default, json!(5));
        assert_eq!(tunable.kwargs.get("deprecated"), Some(&json!(true)));
        assert_eq!(tunable.field, "duration");
        assert!(!tunable.kwargs.contains_key("field"));
    }

    #[test]
    fn name_is_a_construction_keyword() {
        let raw = r#"
[[modules]]
name = "mods"

[[modules.members]]
kind = "tuned_class"
name = "MoodBuff"
manager_path = "Tuning/Buff"
type_tag = "buff"

[[modules.members.tunables]]
field = "duration"
type = "int"
name = "Duration"
"#;
        let catalog = parse_catalog(raw).expect("parse");
        let MemberSpec::TunedClass { tunables, .. } = &catalog.modules[0].members[0] else {
            panic!("expected tuned class");
        };
        assert_eq!(tunables[0].field, "duration");
        assert_eq!(tunables[0].kwargs.get("name"), Some(&json!("Duration")));
    }

    #[test]
    fn rejects_unknown_module_target() {
        let raw = r#"
[[modules]]
name = "mods"

[[modules.members]]
kind = "module"
name = "missing"
target = "mods.missing"
"#;
        let err = parse_catalog(raw).expect_err("should fail");
        assert!(err.to_string().contains("unknown module 'mods.missing'"));
    }

    #[test]
    fn rejects_duplicate_modules() {
        let raw = r#"
[[modules]]
name = "mods"

[[modules]]
name = "mods"
"#;
        let err = parse_catalog(raw).expect_err("should fail");
        assert!(err.to_string().contains("duplicate module"));
    }

    #[test]
    fn load_reports_path_on_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("host.toml");
        let err = load_catalog(&path).expect_err("missing");
        assert!(format!("{err:#}").contains("host.toml"));
    }
}
