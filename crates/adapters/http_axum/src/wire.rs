//! Outbound WebSocket messages.
//!
//! Notifications are translated into the shapes thermometer clients expect:
//!
//! ```json
//! {"type":"thermometerTemp","dateTime":"…","temp":21.5}
//! {"type":"thermometer","dateTime":"…","temperature":21.5,"states":{"door":"CLOSED"}}
//! {"ack":true}
//! {"error":"invalid message type \"sprinkler\""}
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use homesim_domain::device::DeviceState;
use homesim_domain::reading::{Ack, Notification};
use homesim_domain::time::Timestamp;

/// Anything the server pushes over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Reading(Reading),
    Ack(Ack),
    Error { error: String },
}

/// Thermometer readings, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Reading {
    /// Estimate produced by an inbound event.
    #[serde(rename = "thermometerTemp", rename_all = "camelCase")]
    ThermometerTemp { date_time: Timestamp, temp: f64 },
    /// Periodic re-emission while subscribed.
    #[serde(rename = "thermometer", rename_all = "camelCase")]
    Thermometer {
        date_time: Timestamp,
        temperature: f64,
        states: BTreeMap<String, DeviceState>,
    },
}

impl OutboundMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

impl From<Notification> for OutboundMessage {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::Temperature(emission) => Self::Reading(Reading::ThermometerTemp {
                date_time: emission.timestamp,
                temp: emission.temperature,
            }),
            Notification::Periodic(snapshot) => Self::Reading(Reading::Thermometer {
                date_time: snapshot.timestamp,
                temperature: snapshot.temperature,
                states: snapshot.devices,
            }),
            Notification::Ack(ack) => Self::Ack(ack),
        }
    }
}
