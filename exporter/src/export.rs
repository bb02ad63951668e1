//! Orchestration for `export_tdesc`.
//!
//! A run resolves the output root and the requested module, then either
//! exports one named class or walks the module for every tuned class defined
//! in it. The first failed export ends the run. Every outcome, failures
//! included, is reported as text lines on the [`Output`]; nothing propagates
//! past [`Exporter::run`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::namespace::{Namespaces, find_tuned_class};
use crate::core::types::{MemberKind, RunPhase, TunedClass};
use crate::io::config::NestedNamespaces;
use crate::io::export_root::ExportRootLocator;
use crate::io::output::Output;
use crate::io::tdesc::Serializer;

pub const USAGE: [&str; 3] = [
    "Usage:",
    "export_tdesc my.module",
    "export_tdesc my.module MyClass",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No module named '{0}'")]
    ModuleNotFound(String),
    #[error("no '{ancestor}' directory found above {}", .start.display())]
    ExportRootNotFound { ancestor: String, start: PathBuf },
    #[error("Failed to export {0}")]
    ExportFailed(String),
    #[error("{class} would overwrite the description of {previous} in {}", .dir.display())]
    DuplicateTarget {
        class: String,
        previous: String,
        dir: PathBuf,
    },
    #[error(transparent)]
    Serializer(#[from] anyhow::Error),
}

/// State and result of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRun {
    pub module_name: String,
    pub class_name: Option<String>,
    pub export_root: Option<PathBuf>,
    pub phase: RunPhase,
    /// Qualified names of exported classes, in export order.
    pub exported: Vec<String>,
    /// Written targets (output dir + lowercased class name) -> qualified name.
    targets: BTreeMap<PathBuf, String>,
}

impl ExportRun {
    fn new(module_name: &str, class_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            class_name: (!class_name.is_empty()).then(|| class_name.to_string()),
            export_root: None,
            phase: RunPhase::Idle,
            exported: Vec::new(),
            targets: BTreeMap::new(),
        }
    }

    /// True when the run finished and exported at least one class.
    pub fn succeeded(&self) -> bool {
        self.phase == RunPhase::Done && !self.exported.is_empty()
    }

    fn transition(&mut self, phase: RunPhase) {
        debug!(from = ?self.phase, to = ?phase, module = %self.module_name, "run phase");
        self.phase = phase;
    }
}

pub struct Exporter<'a, N, S> {
    namespaces: &'a N,
    serializer: &'a S,
    locator: &'a ExportRootLocator,
    nested: NestedNamespaces,
}

impl<'a, N: Namespaces, S: Serializer> Exporter<'a, N, S> {
    pub fn new(
        namespaces: &'a N,
        serializer: &'a S,
        locator: &'a ExportRootLocator,
        nested: NestedNamespaces,
    ) -> Self {
        Self {
            namespaces,
            serializer,
            locator,
            nested,
        }
    }

    /// Run one export and report progress on `out`.
    ///
    /// An empty `module_name` prints usage and returns before any lookup.
    /// An empty `class_name` exports every tuned class of the module.
    pub fn run(&self, module_name: &str, class_name: &str, out: &mut dyn Output) -> ExportRun {
        let mut run = ExportRun::new(module_name, class_name);
        if module_name.is_empty() {
            for line in USAGE {
                out.emit(line);
            }
            return run;
        }

        out.emit(&format!("Exporting TDESC for {module_name}.{class_name}..."));
        if let Err(err) = self.execute(&mut run, out) {
            warn!(%err, module = module_name, "tdesc export failed");
            out.emit(&format!("Error: {err}"));
            run.transition(RunPhase::Failed);
        }
        run
    }

    fn execute(&self, run: &mut ExportRun, out: &mut dyn Output) -> Result<(), ExportError> {
        run.transition(RunPhase::Validating);
        let root = self
            .locator
            .locate()
            .ok_or_else(|| ExportError::ExportRootNotFound {
                ancestor: self.locator.ancestor_dir.clone(),
                start: self.locator.start.clone(),
            })?;
        run.export_root = Some(root.clone());

        let module = run.module_name.clone();
        if !self.namespaces.contains_module(&module) {
            return Err(ExportError::ModuleNotFound(module));
        }

        match run.class_name.clone() {
            Some(class_name) => {
                let members = self.namespaces.members(&module);
                let Some(class) = find_tuned_class(&members, &class_name) else {
                    out.emit("Could not find class in module.");
                    run.transition(RunPhase::Failed);
                    return Ok(());
                };
                run.transition(RunPhase::Exporting);
                if !self.export_class(class, &root, run)? {
                    out.emit("Error during TDESC export");
                    run.transition(RunPhase::Failed);
                    return Ok(());
                }
                run.exported.push(class.qualified_name());
            }
            None => {
                run.transition(RunPhase::Traversing);
                let mut visited = BTreeSet::from([module.clone()]);
                self.export_module(&module, &root, run, &mut visited)?;
                if run.exported.is_empty() {
                    out.emit(&format!("No tunables found in {module}"));
                    run.transition(RunPhase::Failed);
                    return Ok(());
                }
            }
        }

        out.emit(&format!("Done. Files have been saved to {}.", root.display()));
        run.transition(RunPhase::Done);
        Ok(())
    }

    /// Export every tuned class defined in `module`, stopping at the first failure.
    fn export_module(
        &self,
        module: &str,
        root: &Path,
        run: &mut ExportRun,
        visited: &mut BTreeSet<String>,
    ) -> Result<(), ExportError> {
        for member in self.namespaces.members(module) {
            if !member.is_local_to(module) {
                debug!(module, member = %member.name, "skipping imported member");
                continue;
            }
            match &member.kind {
                MemberKind::Module(child) => match self.nested {
                    NestedNamespaces::Descend => {
                        if visited.insert(child.clone()) {
                            self.export_module(child, root, run, visited)?;
                        }
                    }
                    NestedNamespaces::Ignore => {
                        debug!(module, child = %child, "nested module not scanned");
                    }
                },
                MemberKind::TunedClass(class) => {
                    run.transition(RunPhase::Exporting);
                    if !self.export_class(class, root, run)? {
                        return Err(ExportError::ExportFailed(class.to_string()));
                    }
                    run.exported.push(class.qualified_name());
                    run.transition(RunPhase::Traversing);
                }
                MemberKind::Other => {}
            }
        }
        Ok(())
    }

    /// Export one class into its manager directory.
    ///
    /// Descriptions are named after the short class name, so a second class
    /// with the same name under the same manager fails the run instead of
    /// replacing the first file. Names are compared case-insensitively.
    fn export_class(
        &self,
        class: &TunedClass,
        root: &Path,
        run: &mut ExportRun,
    ) -> Result<bool, ExportError> {
        let manager = &class.tuning_manager;
        let output_dir = root.join(manager.base_name());
        let target = output_dir.join(class.name.to_lowercase());
        if let Some(previous) = run.targets.get(&target) {
            return Err(ExportError::DuplicateTarget {
                class: class.qualified_name(),
                previous: previous.clone(),
                dir: output_dir,
            });
        }
        let exported = self
            .serializer
            .export_class(class, &output_dir, &manager.type_tag)?;
        if exported {
            info!(class = %class.qualified_name(), dir = %output_dir.display(), "exported tdesc");
            run.targets.insert(target, class.qualified_name());
        }
        Ok(exported)
    }
}
