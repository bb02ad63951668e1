//! Shared types between the host adapter and the exporter.

use std::fmt;

/// Opaque identity of a host instance, issued by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u64);

/// Descriptor owned by a tuning definition class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningManager {
    /// Output location hint; only its final component is used.
    pub path: String,
    /// Instance type tag passed to the serializer.
    pub type_tag: String,
}

impl TuningManager {
    /// Final path component of the location hint.
    pub fn base_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|part| !part.is_empty())
            .unwrap_or("")
    }
}

/// A class tagged as a tuning definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunedClass {
    pub name: String,
    /// Module the class was defined in.
    pub module: String,
    pub tuning_manager: TuningManager,
}

impl TunedClass {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

impl fmt::Display for TunedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.qualified_name())
    }
}

/// Classification of a namespace member, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// A nested namespace, by qualified module name.
    Module(String),
    TunedClass(TunedClass),
    /// Anything else (functions, constants, untagged classes).
    Other,
}

/// One named member of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    /// Module the member object was defined in, if the host knows it.
    pub defining_module: Option<String>,
    pub kind: MemberKind,
}

impl Member {
    /// True if the member was defined in `module` rather than imported into it.
    pub fn is_local_to(&self, module: &str) -> bool {
        self.defining_module.as_deref() == Some(module)
    }

    pub fn as_tuned_class(&self) -> Option<&TunedClass> {
        match &self.kind {
            MemberKind::TunedClass(class) => Some(class),
            _ => None,
        }
    }
}

/// Phase of a single export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Validating,
    Traversing,
    Exporting,
    Done,
    Failed,
}
