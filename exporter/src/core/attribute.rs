//! Identity-keyed side tables for attributes a sealed type cannot store.
//!
//! Host types with a fixed slot layout reject new per-instance fields. An
//! [`AttributeTable`] keeps the extra fields outside the instance: one
//! [`AttributeStore`] per injected attribute name, keyed by [`InstanceId`].
//!
//! Reads never fail for a missing entry; they return the neutral value.
//! Entries are only dropped when the neutral value is written, so a store
//! holds on to every instance it has seen for as long as it lives.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;
use thiserror::Error;

use crate::core::types::InstanceId;

/// Values with a distinguished "nothing stored" state.
pub trait Neutral: Sized {
    fn neutral() -> Self;
    fn is_neutral(&self) -> bool;
}

impl Neutral for Value {
    fn neutral() -> Self {
        Value::Null
    }

    fn is_neutral(&self) -> bool {
        self.is_null()
    }
}

impl<T> Neutral for Option<T> {
    fn neutral() -> Self {
        None
    }

    fn is_neutral(&self) -> bool {
        self.is_none()
    }
}

/// Per-instance storage for a single attribute.
#[derive(Debug, Clone)]
pub struct AttributeStore<V = Value> {
    storage: HashMap<InstanceId, V>,
}

impl<V> Default for AttributeStore<V> {
    fn default() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }
}

impl<V: Neutral + Clone> AttributeStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value for `instance`, or the neutral value.
    pub fn get(&self, instance: InstanceId) -> V {
        self.storage
            .get(&instance)
            .cloned()
            .unwrap_or_else(V::neutral)
    }

    /// Insert or overwrite; writing the neutral value removes the entry.
    pub fn set(&mut self, instance: InstanceId, value: V) {
        if value.is_neutral() {
            self.storage.remove(&instance);
        } else {
            self.storage.insert(instance, value);
        }
    }

    /// Number of instances holding a non-neutral value.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("'{type_name}' object has no attribute '{name}'")]
    UnknownAttribute { type_name: String, name: String },
    #[error("'{type_name}.{name}' is a native slot, not an injected attribute")]
    NativeSlot { type_name: String, name: String },
}

/// Attribute layout of one sealed host type.
///
/// Native slots are fixed when the table is created. Injected attributes are
/// added afterwards with [`AttributeTable::inject_into`] and read back through
/// [`AttributeTable::get`] / [`AttributeTable::set`] as if they were fields.
#[derive(Debug, Clone)]
pub struct AttributeTable {
    type_name: String,
    native: BTreeSet<String>,
    injected: BTreeMap<String, AttributeStore>,
}

impl AttributeTable {
    pub fn new<I, S>(type_name: impl Into<String>, native_slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            native: native_slots.into_iter().map(Into::into).collect(),
            injected: BTreeMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// True if `name` is a native slot or an injected attribute.
    pub fn exposes(&self, name: &str) -> bool {
        self.native.contains(name) || self.injected.contains_key(name)
    }

    pub fn is_injected(&self, name: &str) -> bool {
        self.injected.contains_key(name)
    }

    /// Attach a fresh store named `name` unless the type already exposes it.
    ///
    /// Returns `false` when nothing was injected, leaving any existing store
    /// and its entries untouched.
    pub fn inject_into(&mut self, name: &str) -> bool {
        if self.exposes(name) {
            return false;
        }
        self.injected
            .insert(name.to_string(), AttributeStore::new());
        true
    }

    pub fn get(&self, instance: InstanceId, name: &str) -> Result<Value, AttributeError> {
        self.store(name).map(|store| store.get(instance))
    }

    pub fn set(
        &mut self,
        instance: InstanceId,
        name: &str,
        value: Value,
    ) -> Result<(), AttributeError> {
        if self.native.contains(name) {
            return Err(self.native_slot(name));
        }
        match self.injected.get_mut(name) {
            Some(store) => {
                store.set(instance, value);
                Ok(())
            }
            None => Err(AttributeError::UnknownAttribute {
                type_name: self.type_name.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Non-neutral injected attributes of `instance`, ordered by name.
    pub fn injected_values(&self, instance: InstanceId) -> BTreeMap<&str, Value> {
        self.injected
            .iter()
            .map(|(name, store)| (name.as_str(), store.get(instance)))
            .filter(|(_, value)| !value.is_null())
            .collect()
    }

    pub fn store(&self, name: &str) -> Result<&AttributeStore, AttributeError> {
        if self.native.contains(name) {
            return Err(self.native_slot(name));
        }
        self.injected
            .get(name)
            .ok_or_else(|| AttributeError::UnknownAttribute {
                type_name: self.type_name.clone(),
                name: name.to_string(),
            })
    }

    fn native_slot(&self, name: &str) -> AttributeError {
        AttributeError::NativeSlot {
            type_name: self.type_name.clone(),
            name: name.to_string(),
        }
    }
}
