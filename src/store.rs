use std::collections::BTreeMap;
use tracing::debug;

use crate::schema::OptionSpec;
use crate::types::Value;

/// Current value of every option, keyed by option name
/// Keys always match the schema the store was last initialized with
#[derive(Debug, Default, Clone)]
pub struct ValueStore {
    values: BTreeMap<String, Value>,
    defaults: BTreeMap<String, Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one entry per option with its resolved initial value
    /// Entries for names no longer in the schema are dropped
    pub fn initialize(&mut self, schema: &[OptionSpec]) {
        self.defaults = schema
            .iter()
            .map(|spec| (spec.name.clone(), spec.initial.clone()))
            .collect();
        self.values = self.defaults.clone();
        debug!(count = self.values.len(), "Initialized option values");
    }

    /// Restore the initial values of the schema last passed to `initialize`
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        debug!(count = self.values.len(), "Reset option values to defaults");
    }

    /// Overwrite one value verbatim (no range clamping)
    /// Returns false and leaves the store untouched for unknown names
    pub fn set_value(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                debug!(option = %name, value = %value, "Updated option value");
                *slot = value;
                true
            }
            None => {
                debug!(option = %name, "Ignoring value for unknown option");
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}
