//! In-process model of the host's sealed tuning classes.
//!
//! `TunableBase` instances have a fixed slot layout ([`TunableSlots`]); every
//! other field the exporter needs lives in the type's [`AttributeTable`].
//! Two host operations are modelled as [`Intercepted`] so start-up code can
//! extend them without changing their definitions:
//!
//! - `TunableBase.__init__` fills the slots and ignores keyword arguments.
//! - `TuningAttrCleanupHelper.perform_cleanup` runs after loading and drops
//!   the per-class tunable bookkeeping.
//!
//! [`HostRuntime::install_standing_hooks`] wraps both for the lifetime of the
//! runtime: cleanup becomes a no-op, and construction copies recognised
//! keywords into the injected attributes.

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::attribute::{AttributeError, AttributeTable};
use crate::core::injection::{init_arg_map, inject_tunable_attrs};
use crate::core::intercept::Intercepted;
use crate::core::namespace::Namespaces;
use crate::core::types::{InstanceId, Member, MemberKind, TunedClass, TuningManager};
use crate::io::catalog::{Catalog, MemberSpec, TunableSpec};

pub const TUNABLE_BASE: &str = "TunableBase";
pub const TUNABLE_NATIVE_SLOTS: [&str; 2] = ["tunable_type", "default"];

/// Native storage of a `TunableBase` instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TunableSlots {
    pub tunable_type: String,
    pub default: Value,
}

/// Arguments of a `TunableBase` construction call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstructArgs {
    pub tunable_type: String,
    pub default: Value,
    pub kwargs: BTreeMap<String, Value>,
}

impl From<&TunableSpec> for ConstructArgs {
    fn from(spec: &TunableSpec) -> Self {
        Self {
            tunable_type: spec.tunable_type.clone(),
            default: spec.default.clone(),
            kwargs: spec.kwargs.clone(),
        }
    }
}

/// Host state the intercepted operations run against.
#[derive(Debug)]
pub struct HostState {
    instances: Vec<TunableSlots>,
    attributes: AttributeTable,
    /// Tunable fields per tuned class (qualified name), in declaration order.
    class_tunables: BTreeMap<String, Vec<(String, InstanceId)>>,
    modules: BTreeMap<String, Vec<Member>>,
}

impl HostState {
    fn new() -> Self {
        Self {
            instances: Vec::new(),
            attributes: AttributeTable::new(TUNABLE_BASE, TUNABLE_NATIVE_SLOTS),
            class_tunables: BTreeMap::new(),
            modules: BTreeMap::new(),
        }
    }
}

pub struct HostRuntime {
    state: HostState,
    construct: Intercepted<HostState, ConstructArgs, InstanceId>,
    cleanup: Intercepted<HostState, (), ()>,
    hooks_installed: bool,
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime {
    /// Runtime with the host's original operations and no hooks.
    pub fn new() -> Self {
        let construct = Intercepted::new(
            TUNABLE_BASE,
            "__init__",
            |state: &mut HostState, args: ConstructArgs| {
                let id = InstanceId(state.instances.len() as u64);
                state.instances.push(TunableSlots {
                    tunable_type: args.tunable_type,
                    default: args.default,
                });
                id
            },
        );
        let cleanup = Intercepted::new(
            "TuningAttrCleanupHelper",
            "perform_cleanup",
            |state: &mut HostState, ()| {
                debug!(
                    classes = state.class_tunables.len(),
                    "purging tunable bookkeeping"
                );
                state.class_tunables.clear();
            },
        );
        Self {
            state: HostState::new(),
            construct,
            cleanup,
            hooks_installed: false,
        }
    }

    /// Build a runtime from a catalog: hooks first, then modules, then
    /// tunables, then the post-load cleanup.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        catalog.validate()?;
        let mut host = Self::new();
        host.install_standing_hooks();

        for module in &catalog.modules {
            host.add_module(&module.name);
        }
        for module in &catalog.modules {
            for member in &module.members {
                host.load_member(&module.name, member);
            }
        }

        host.finish_loading();
        Ok(host)
    }

    /// Install the permanent interceptions. Returns `false` if already installed.
    pub fn install_standing_hooks(&mut self) -> bool {
        if self.hooks_installed {
            return false;
        }
        let injected = inject_tunable_attrs(&mut self.state.attributes);
        debug!(count = injected.len(), "injected tunable attributes");

        // Bookkeeping must outlive loading: the serializer reads it.
        self.cleanup.wrap(|_original, _state, ()| {});

        let arg_map = init_arg_map();
        self.construct.wrap(move |original, state, args| {
            let kwargs = args.kwargs.clone();
            let id = original(&mut *state, args);
            for (arg_name, value) in kwargs {
                let Some(attr) = arg_map.get(arg_name.as_str()) else {
                    continue;
                };
                if !state.attributes.is_injected(attr) {
                    continue;
                }
                if let Err(err) = state.attributes.set(id, attr, value) {
                    warn!(%err, attr, "could not store construction keyword");
                }
            }
            id
        });

        self.hooks_installed = true;
        true
    }

    pub fn hooks_installed(&self) -> bool {
        self.hooks_installed
    }

    /// Call `TunableBase.__init__` through whatever wrappers are installed.
    pub fn construct_tunable(&mut self, args: ConstructArgs) -> InstanceId {
        self.construct.call(&mut self.state, args)
    }

    /// Run the post-load cleanup operation.
    pub fn finish_loading(&mut self) {
        self.cleanup.call(&mut self.state, ());
    }

    pub fn construct_op(&self) -> &Intercepted<HostState, ConstructArgs, InstanceId> {
        &self.construct
    }

    pub fn cleanup_op(&self) -> &Intercepted<HostState, (), ()> {
        &self.cleanup
    }

    pub fn add_module(&mut self, name: &str) {
        self.state.modules.entry(name.to_string()).or_default();
    }

    pub fn add_member(&mut self, module: &str, member: Member) {
        self.state
            .modules
            .entry(module.to_string())
            .or_default()
            .push(member);
    }

    /// Record the tunable fields of a tuned class.
    pub fn register_tunables(&mut self, class: &TunedClass, tunables: Vec<(String, InstanceId)>) {
        self.state
            .class_tunables
            .insert(class.qualified_name(), tunables);
    }

    /// Tunable fields of a class, or `None` once bookkeeping was purged.
    pub fn tunables_of(&self, class: &TunedClass) -> Option<&[(String, InstanceId)]> {
        self.state
            .class_tunables
            .get(&class.qualified_name())
            .map(Vec::as_slice)
    }

    pub fn slots(&self, id: InstanceId) -> Option<&TunableSlots> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.state.instances.get(index))
    }

    pub fn attribute(&self, id: InstanceId, name: &str) -> Result<Value, AttributeError> {
        self.state.attributes.get(id, name)
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.state.attributes
    }

    fn load_member(&mut self, module: &str, spec: &MemberSpec) {
        let member = match spec {
            MemberSpec::Module { name, target } => Member {
                name: name.clone(),
                defining_module: parent_module(target).map(str::to_string),
                kind: MemberKind::Module(target.clone()),
            },
            MemberSpec::TunedClass {
                name,
                manager_path,
                type_tag,
                defined_in,
                tunables,
            } => {
                let defining = defined_in.clone().unwrap_or_else(|| module.to_string());
                let class = TunedClass {
                    name: name.clone(),
                    module: defining.clone(),
                    tuning_manager: TuningManager {
                        path: manager_path.clone(),
                        type_tag: type_tag.clone(),
                    },
                };
                // Re-exports carry no fields of their own.
                if defined_in.is_none() {
                    let fields = tunables
                        .iter()
                        .map(|tunable| (tunable.field.clone(), self.construct_tunable(tunable.into())))
                        .collect();
                    self.register_tunables(&class, fields);
                }
                Member {
                    name: name.clone(),
                    defining_module: Some(defining),
                    kind: MemberKind::TunedClass(class),
                }
            }
            MemberSpec::Other { name, defined_in } => Member {
                name: name.clone(),
                defining_module: Some(defined_in.clone().unwrap_or_else(|| module.to_string())),
                kind: MemberKind::Other,
            },
        };
        self.add_member(module, member);
    }
}

impl Namespaces for HostRuntime {
    fn contains_module(&self, module: &str) -> bool {
        self.state.modules.contains_key(module)
    }

    fn members(&self, module: &str) -> Vec<Member> {
        let mut members = self
            .state
            .modules
            .get(module)
            .cloned()
            .unwrap_or_default();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }
}

fn parent_module(qualified: &str) -> Option<&str> {
    qualified.rsplit_once('.').map(|(parent, _)| parent)
}
