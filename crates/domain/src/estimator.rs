//! Temperature estimator — the pure rule set behind the thermometer.
//!
//! [`estimate`] takes an event, the current estimate, and the registry
//! **before** the event's own state is committed, and returns the new
//! estimate. Exactly one rule applies per event:
//!
//! | Event | Condition on the prior registry | Effect |
//! |-------|---------------------------------|--------|
//! | window / door change | prior `OPEN`, new state not `OPEN` | `+1.0` |
//! | window / door change | prior `CLOSED`, new state not `CLOSED` | `-1.0` |
//! | heatpump state change | see [`HeatpumpStateRule`] | none by default |
//! | heatpump temperature | prior heatpump `ON` | average with the heatpump temperature |
//! | full heatpump report | state rule, then the temperature rule under the new state | both |
//! | outdoor temperature | guard passes, see [`OutdoorGuard`] | average with the outdoor temperature |
//! | subscribe / unsubscribe | | none |
//!
//! No rounding is applied; full precision carries over between events.

use serde::{Deserialize, Serialize};

use crate::device::{DeviceKey, DeviceState};
use crate::event::Event;
use crate::registry::DeviceRegistry;

/// Draft gained or lost when an aperture leaves a recorded extreme state.
pub const DRAFT_STEP: f64 = 1.0;

/// When an outdoor reading is allowed to pull the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutdoorGuard {
    /// Only while no door or window is recorded `OPEN`; open apertures are
    /// already accounted for by the draft step.
    #[default]
    AnyOpen,
    /// Only while the door is not `OPEN` and the heatpump is not `ON`.
    /// Windows are ignored.
    DoorClosedHeatpumpOff,
}

/// How a heatpump on/off change affects the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatpumpStateRule {
    /// State changes never move the estimate; only temperature changes do.
    #[default]
    Ignore,
    /// Switching away from `OFF` adds a step, switching away from `ON`
    /// removes one.
    Step,
}

/// Tunable parts of the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorPolicy {
    pub outdoor_guard: OutdoorGuard,
    pub heatpump_state: HeatpumpStateRule,
}

/// Compute the new room temperature for `event`.
///
/// `registry` must be the state *before* `event` is committed.
#[must_use]
pub fn estimate(
    event: &Event,
    current: f64,
    registry: &DeviceRegistry,
    policy: EstimatorPolicy,
) -> f64 {
    match *event {
        Event::WindowChanged { id, state } => {
            current + draft(registry.get(DeviceKey::Window(id)), state)
        }
        Event::DoorChanged { state } => current + draft(registry.get(DeviceKey::Door), state),
        Event::HeatpumpStateChanged { state } => {
            heatpump_state(current, registry.get(DeviceKey::Heatpump), state, policy)
        }
        Event::HeatpumpTempChanged { temp } => {
            heatpump_temperature(current, registry.get(DeviceKey::Heatpump), temp)
        }
        Event::HeatpumpChanged { state, temp } => {
            // state first, then the temperature as seen by the new state
            let stepped = heatpump_state(current, registry.get(DeviceKey::Heatpump), state, policy);
            heatpump_temperature(stepped, Some(state), temp)
        }
        Event::OutdoorTemperature { temp } => {
            if outdoor_applies(registry, policy.outdoor_guard) {
                blend(current, temp)
            } else {
                current
            }
        }
        Event::Subscribe | Event::Unsubscribe => current,
    }
}

fn draft(prior: Option<DeviceState>, next: DeviceState) -> f64 {
    match prior {
        Some(DeviceState::Open) if next != DeviceState::Open => DRAFT_STEP,
        Some(DeviceState::Closed) if next != DeviceState::Closed => -DRAFT_STEP,
        _ => 0.0,
    }
}

fn heatpump_state(
    current: f64,
    prior: Option<DeviceState>,
    next: DeviceState,
    policy: EstimatorPolicy,
) -> f64 {
    match policy.heatpump_state {
        HeatpumpStateRule::Ignore => current,
        HeatpumpStateRule::Step => current + heatpump_step(prior, next),
    }
}

fn heatpump_temperature(current: f64, state: Option<DeviceState>, temp: f64) -> f64 {
    if state == Some(DeviceState::On) {
        blend(current, temp)
    } else {
        current
    }
}

fn heatpump_step(prior: Option<DeviceState>, next: DeviceState) -> f64 {
    match prior {
        Some(DeviceState::Off) if next != DeviceState::Off => DRAFT_STEP,
        Some(DeviceState::On) if next != DeviceState::On => -DRAFT_STEP,
        _ => 0.0,
    }
}

fn outdoor_applies(registry: &DeviceRegistry, guard: OutdoorGuard) -> bool {
    match guard {
        OutdoorGuard::AnyOpen => !registry.any_open(),
        OutdoorGuard::DoorClosedHeatpumpOff => {
            registry.get(DeviceKey::Door) != Some(DeviceState::Open)
                && registry.get(DeviceKey::Heatpump) != Some(DeviceState::On)
        }
    }
}

/// Thermal inertia: a new reading nudges the estimate halfway.
fn blend(current: f64, reading: f64) -> f64 {
    (current + reading) / 2.0
}
