//! Readings and notifications produced by the thermometer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::DeviceState;
use crate::time::Timestamp;

/// One committed room temperature estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub temperature: f64,
    pub timestamp: Timestamp,
}

/// Read-only view of a session: estimate plus last known device states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub temperature: f64,
    pub devices: BTreeMap<String, DeviceState>,
    pub subscribed: bool,
    pub timestamp: Timestamp,
}

/// Acknowledgment returned by `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ack: bool,
}

impl Default for Ack {
    fn default() -> Self {
        Self { ack: true }
    }
}

/// Something the thermometer pushes to its downstream listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A new estimate, produced by ingesting an event.
    Temperature(Emission),
    /// Re-emission of the last computed state while subscribed.
    Periodic(StateSnapshot),
    /// Subscription ended.
    Ack(Ack),
}
