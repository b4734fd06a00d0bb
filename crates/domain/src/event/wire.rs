//! Wire JSON decoding for inbound thermometer messages.
//!
//! Every message carries a `type` discriminator:
//!
//! | `type` | payload |
//! |--------|---------|
//! | `subscribe`, `unsubscribe` | none (`target` is ignored) |
//! | `windows` | `valueId`, `value.state` |
//! | `door` | `value.state` |
//! | `heatpump` | `value.state`, `value.temp`, or both (full report) |
//! | `heatpump/state` | `value.state` |
//! | `heatpump/temperature` | `value.temp` |
//! | `temperature` | `value.temp` or top-level `temp` |
//!
//! Device objects serialised by older peers use `_state` / `_temperature`;
//! both are accepted as aliases. Temperatures may be JSON numbers or numeric
//! strings.

use serde::Deserialize;
use serde_json::Value;

use super::Event;
use crate::device::{DeviceKey, DeviceState, WindowId};
use crate::error::EventError;

#[derive(Debug, Default, Deserialize)]
struct DevicePayload {
    #[serde(default, alias = "_state")]
    state: Option<String>,
    #[serde(default, alias = "_temperature", alias = "temperature")]
    temp: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowMessage {
    #[serde(default)]
    value_id: Option<RawId>,
    #[serde(default)]
    value: Option<DevicePayload>,
}

#[derive(Debug, Deserialize)]
struct DeviceMessage {
    #[serde(default)]
    value: Option<DevicePayload>,
}

#[derive(Debug, Deserialize)]
struct TemperatureMessage {
    #[serde(default)]
    temp: Option<Numeric>,
    #[serde(default)]
    value: Option<DevicePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Numeric {
    fn into_temperature(self) -> Result<f64, EventError> {
        match self {
            Self::Number(temp) => Ok(temp),
            Self::Text(text) => match text.trim().parse::<f64>() {
                Ok(temp) if temp.is_finite() => Ok(temp),
                _ => Err(EventError::NonNumericTemperature(text)),
            },
            Self::Other(other) => Err(EventError::NonNumericTemperature(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(u64),
    Text(String),
    Other(Value),
}

impl RawId {
    fn into_window_id(self) -> Result<WindowId, EventError> {
        let (parsed, raw) = match self {
            Self::Int(id) => (WindowId::try_from(id).ok(), id.to_string()),
            Self::Text(text) => (text.trim().parse::<WindowId>().ok(), text),
            Self::Other(other) => (None, other.to_string()),
        };
        match parsed {
            Some(id) if id > 0 => Ok(id),
            _ => Err(EventError::InvalidWindowId(raw)),
        }
    }
}

pub(super) fn decode(text: &str) -> Result<Event, EventError> {
    if text.trim().is_empty() {
        return Err(EventError::Empty);
    }
    let value: Value = serde_json::from_str(text).map_err(EventError::InvalidJson)?;
    decode_value(value)
}

fn decode_value(value: Value) -> Result<Event, EventError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(EventError::MissingType)?
        .to_owned();

    match kind.as_str() {
        "subscribe" => Ok(Event::Subscribe),
        "unsubscribe" => Ok(Event::Unsubscribe),
        "windows" => {
            let msg: WindowMessage = parse(value)?;
            let id = msg
                .value_id
                .ok_or(EventError::MissingField("valueId"))?
                .into_window_id()?;
            let state = required_state(msg.value, DeviceKey::Window(id))?;
            Ok(Event::WindowChanged { id, state })
        }
        "door" => {
            let msg: DeviceMessage = parse(value)?;
            let state = required_state(msg.value, DeviceKey::Door)?;
            Ok(Event::DoorChanged { state })
        }
        "heatpump" => {
            let msg: DeviceMessage = parse(value)?;
            let payload = msg.value.ok_or(EventError::MissingField("value"))?;
            match (payload.state, payload.temp) {
                (Some(state), None) => Ok(Event::HeatpumpStateChanged {
                    state: fitting_state(&state, DeviceKey::Heatpump)?,
                }),
                (None, Some(temp)) => Ok(Event::HeatpumpTempChanged {
                    temp: temp.into_temperature()?,
                }),
                (Some(state), Some(temp)) => Ok(Event::HeatpumpChanged {
                    state: fitting_state(&state, DeviceKey::Heatpump)?,
                    temp: temp.into_temperature()?,
                }),
                (None, None) => Err(EventError::MissingField("value.state")),
            }
        }
        "heatpump/state" => {
            let msg: DeviceMessage = parse(value)?;
            let state = required_state(msg.value, DeviceKey::Heatpump)?;
            Ok(Event::HeatpumpStateChanged { state })
        }
        "heatpump/temperature" => {
            let msg: DeviceMessage = parse(value)?;
            let temp = msg
                .value
                .and_then(|payload| payload.temp)
                .ok_or(EventError::MissingField("value.temp"))?
                .into_temperature()?;
            Ok(Event::HeatpumpTempChanged { temp })
        }
        "temperature" => {
            let msg: TemperatureMessage = parse(value)?;
            let temp = msg
                .value
                .and_then(|payload| payload.temp)
                .or(msg.temp)
                .ok_or(EventError::MissingField("value.temp"))?
                .into_temperature()?;
            Ok(Event::OutdoorTemperature { temp })
        }
        _ => Err(EventError::UnknownType(kind)),
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, EventError> {
    serde_json::from_value(value).map_err(EventError::InvalidPayload)
}

fn required_state(
    payload: Option<DevicePayload>,
    key: DeviceKey,
) -> Result<DeviceState, EventError> {
    let state = payload
        .and_then(|payload| payload.state)
        .ok_or(EventError::MissingField("value.state"))?;
    fitting_state(&state, key)
}

fn fitting_state(raw: &str, key: DeviceKey) -> Result<DeviceState, EventError> {
    raw.parse::<DeviceState>()?
        .ensure_fits(key)
        .map_err(|_| EventError::InvalidState(raw.to_owned()))
}
