//! Device keys and discrete device states.
//!
//! The thermometer tracks three kinds of contributing device: a single door,
//! a single heatpump, and any number of windows keyed by numeric id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EventError, ValidationError};

/// Numeric window identifier, assigned sequentially from 1.
pub type WindowId = u32;

/// Identifies one contributing device in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKey {
    Door,
    Heatpump,
    Window(WindowId),
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Door => f.write_str("door"),
            Self::Heatpump => f.write_str("heatpump"),
            Self::Window(id) => write!(f, "window:{id}"),
        }
    }
}

/// Discrete state of a door, window, or heatpump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    #[serde(rename = "OPEN", alias = "open")]
    Open,
    #[serde(rename = "CLOSED", alias = "closed")]
    Closed,
    #[serde(rename = "ON", alias = "on")]
    On,
    #[serde(rename = "OFF", alias = "off")]
    Off,
}

impl DeviceState {
    /// Whether this state lets outdoor air in.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Check that `self` is a state the given device kind can be in.
    ///
    /// Doors and windows are `OPEN`/`CLOSED`; the heatpump is `ON`/`OFF`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedState`] otherwise.
    pub fn ensure_fits(self, key: DeviceKey) -> Result<Self, ValidationError> {
        let fits = match key {
            DeviceKey::Door | DeviceKey::Window(_) => matches!(self, Self::Open | Self::Closed),
            DeviceKey::Heatpump => matches!(self, Self::On | Self::Off),
        };
        if fits {
            Ok(self)
        } else {
            Err(ValidationError::UnsupportedState {
                device: match key {
                    DeviceKey::Door => "door",
                    DeviceKey::Heatpump => "heatpump",
                    DeviceKey::Window(_) => "window",
                },
                state: self.to_string(),
            })
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("OPEN"),
            Self::Closed => f.write_str("CLOSED"),
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
        }
    }
}

impl FromStr for DeviceState {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            _ => Err(EventError::InvalidState(s.to_owned())),
        }
    }
}

/// The simulated front door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub state: DeviceState,
}

/// One simulated window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub state: DeviceState,
}

/// The simulated heatpump: on/off plus its output temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heatpump {
    pub state: DeviceState,
    pub temperature: f64,
}
