//! Event — something a contributing device (or a client) told the thermometer.
//!
//! Events form a closed set; anything else is rejected at the boundary by
//! [`Event::decode`] so that business logic only ever sees known variants.

mod wire;

use crate::device::{DeviceKey, DeviceState, WindowId};
use crate::error::{EventError, ValidationError};

/// Decoded inbound event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    WindowChanged { id: WindowId, state: DeviceState },
    DoorChanged { state: DeviceState },
    HeatpumpStateChanged { state: DeviceState },
    HeatpumpTempChanged { temp: f64 },
    /// Full heatpump report: state and output temperature together.
    HeatpumpChanged { state: DeviceState, temp: f64 },
    OutdoorTemperature { temp: f64 },
    Subscribe,
    Unsubscribe,
}

impl Event {
    /// Decode a wire JSON message (see the crate docs for the accepted shapes).
    ///
    /// # Errors
    ///
    /// Returns an [`EventError`] for empty or unparsable input, a missing or
    /// unknown `type`, missing fields, invalid states and non-numeric
    /// temperatures.
    pub fn decode(text: &str) -> Result<Self, EventError> {
        wire::decode(text)
    }

    /// Check invariants that decoding guarantees but direct construction may not:
    /// finite temperatures, and states that fit the device they target.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::HeatpumpTempChanged { temp }
            | Self::HeatpumpChanged { temp, .. }
            | Self::OutdoorTemperature { temp }
                if !temp.is_finite() =>
            {
                Err(ValidationError::NonFiniteTemperature(temp))
            }
            _ => match self.device_update() {
                Some((key, state)) => state.ensure_fits(key).map(|_| ()),
                None => Ok(()),
            },
        }
    }

    /// `Subscribe` and `Unsubscribe` drive the session lifecycle and never
    /// touch the estimate.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Subscribe | Self::Unsubscribe)
    }

    /// The registry entry this event commits once the estimate is computed.
    #[must_use]
    pub fn device_update(&self) -> Option<(DeviceKey, DeviceState)> {
        match *self {
            Self::WindowChanged { id, state } => Some((DeviceKey::Window(id), state)),
            Self::DoorChanged { state } => Some((DeviceKey::Door, state)),
            Self::HeatpumpStateChanged { state } | Self::HeatpumpChanged { state, .. } => {
                Some((DeviceKey::Heatpump, state))
            }
            Self::HeatpumpTempChanged { .. }
            | Self::OutdoorTemperature { .. }
            | Self::Subscribe
            | Self::Unsubscribe => None,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WindowChanged { .. } => "window_changed",
            Self::DoorChanged { .. } => "door_changed",
            Self::HeatpumpStateChanged { .. } => "heatpump_state_changed",
            Self::HeatpumpTempChanged { .. } => "heatpump_temp_changed",
            Self::HeatpumpChanged { .. } => "heatpump_changed",
            Self::OutdoorTemperature { .. } => "outdoor_temperature",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}
