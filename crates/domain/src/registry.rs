//! Device state registry — last committed state per contributing device.

use std::collections::{BTreeMap, HashMap};

use crate::device::{DeviceKey, DeviceState};

/// Maps each [`DeviceKey`] to the last state the thermometer committed for it.
///
/// Keys appear lazily, on the first event that references them. Any overwrite
/// is accepted, including a repeat of the current state; transition rules live
/// in the [estimator](crate::estimator), not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRegistry {
    states: HashMap<DeviceKey, DeviceState>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful to seed a registry.
    #[must_use]
    pub fn with(mut self, key: DeviceKey, state: DeviceState) -> Self {
        self.set(key, state);
        self
    }

    /// Last committed state for `key`, or `None` before its first observation.
    #[must_use]
    pub fn get(&self, key: DeviceKey) -> Option<DeviceState> {
        self.states.get(&key).copied()
    }

    /// Replace the entry for `key` with `state`.
    pub fn set(&mut self, key: DeviceKey, state: DeviceState) {
        self.states.insert(key, state);
    }

    /// Whether any door or window is currently recorded as `OPEN`.
    #[must_use]
    pub fn any_open(&self) -> bool {
        self.states.values().any(|state| state.is_open())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Ordered, string-keyed copy for read-only callers.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, DeviceState> {
        self.states
            .iter()
            .map(|(key, state)| (key.to_string(), *state))
            .collect()
    }
}
