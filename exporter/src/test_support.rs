//! Test-only helpers: in-memory namespaces, scripted serializers, and a
//! throwaway game install layout.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::namespace::Namespaces;
use crate::core::types::{Member, TunedClass};
use crate::io::tdesc::Serializer;

/// Namespaces backed by a fixed module -> members map.
#[derive(Debug, Clone, Default)]
pub struct StaticNamespaces {
    modules: BTreeMap<String, Vec<Member>>,
}

impl StaticNamespaces {
    pub fn with_module(mut self, name: &str, members: Vec<Member>) -> Self {
        self.modules.insert(name.to_string(), members);
        self
    }
}

impl Namespaces for StaticNamespaces {
    fn contains_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    fn members(&self, module: &str) -> Vec<Member> {
        let mut members = self.modules.get(module).cloned().unwrap_or_default();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }
}

/// One recorded `export_class` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerCall {
    pub class: String,
    pub output_dir: PathBuf,
    pub type_tag: String,
}

/// Serializer that replays queued outcomes and records its calls.
///
/// `Err(message)` entries are returned as errors carrying `message`. Once the
/// queue is empty, the fallback outcome is used (or an error if none).
#[derive(Debug, Default)]
pub struct ScriptedSerializer {
    outcomes: RefCell<VecDeque<Result<bool, String>>>,
    fallback: Option<bool>,
    calls: RefCell<Vec<SerializerCall>>,
}

impl ScriptedSerializer {
    pub fn new(outcomes: Vec<Result<bool, String>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            ..Self::default()
        }
    }

    /// Serializer that returns `outcome` for every call.
    pub fn always(outcome: bool) -> Self {
        Self {
            fallback: Some(outcome),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SerializerCall> {
        self.calls.borrow().clone()
    }
}

impl Serializer for ScriptedSerializer {
    fn export_class(&self, class: &TunedClass, output_dir: &Path, type_tag: &str) -> Result<bool> {
        self.calls.borrow_mut().push(SerializerCall {
            class: class.qualified_name(),
            output_dir: output_dir.to_path_buf(),
            type_tag: type_tag.to_string(),
        });
        match self.outcomes.borrow_mut().pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(anyhow!(message)),
            None => self
                .fallback
                .ok_or_else(|| anyhow!("scripted serializer exhausted")),
        }
    }
}

/// Temp directory laid out as `<tmp>/The Sims 4/Mods/tools`.
pub struct GameInstall {
    _temp: TempDir,
    pub game_dir: PathBuf,
    pub tool_dir: PathBuf,
}

impl GameInstall {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let game_dir = temp.path().join("The Sims 4");
        let tool_dir = game_dir.join("Mods").join("tools");
        fs::create_dir_all(&tool_dir)?;
        Ok(Self {
            _temp: temp,
            game_dir,
            tool_dir,
        })
    }

    pub fn descriptions_dir(&self) -> PathBuf {
        self.game_dir.join("Descriptions")
    }
}
