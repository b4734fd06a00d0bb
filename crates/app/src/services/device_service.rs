//! Device service — the simulated door, windows, heatpump and outdoor sensor.
//!
//! Every change is forwarded to the [`ThermometerService`] as an [`Event`]
//! before it is committed locally, so a rejected change leaves both sides
//! untouched. Wire messages from clients enter here too, through
//! [`DeviceService::handle_message`], so the device model and the
//! thermometer registry never disagree.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use homesim_domain::device::{DeviceState, Door, Heatpump, Window, WindowId};
use homesim_domain::error::{HomeSimError, NotFoundError};
use homesim_domain::event::Event;
use homesim_domain::reading::{Ack, Emission, StateSnapshot};
use homesim_domain::time::Timestamp;

use crate::ports::NotificationPublisher;
use crate::services::thermometer_service::ThermometerService;

/// Devices present when the service starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialDevices {
    pub windows: u32,
    pub door: DeviceState,
    pub heatpump_state: DeviceState,
    pub heatpump_temperature: f64,
}

impl Default for InitialDevices {
    fn default() -> Self {
        Self {
            windows: 1,
            door: DeviceState::Closed,
            heatpump_state: DeviceState::Off,
            heatpump_temperature: 24.0,
        }
    }
}

/// Outcome of one handled wire message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Reading(Emission),
    /// `None` when a subscription was already running.
    Subscribed(Option<StateSnapshot>),
    Unsubscribed(Ack),
}

struct Devices {
    door: Door,
    heatpump: Heatpump,
    windows: BTreeMap<WindowId, Window>,
    next_window: WindowId,
    outdoor: Vec<Emission>,
}

impl Devices {
    fn apply(&mut self, event: Event, timestamp: Timestamp) {
        match event {
            Event::DoorChanged { state } => self.door.state = state,
            Event::WindowChanged { id, state } => {
                self.windows.insert(id, Window { id, state });
            }
            Event::HeatpumpStateChanged { state } => self.heatpump.state = state,
            Event::HeatpumpTempChanged { temp } => self.heatpump.temperature = temp,
            Event::HeatpumpChanged { state, temp } => {
                self.heatpump = Heatpump {
                    state,
                    temperature: temp,
                };
            }
            Event::OutdoorTemperature { temp } => self.outdoor.push(Emission {
                temperature: temp,
                timestamp,
            }),
            Event::Subscribe | Event::Unsubscribe => {}
        }
    }
}

/// Application service for the simulated devices.
pub struct DeviceService<P> {
    devices: Mutex<Devices>,
    thermometer: Arc<ThermometerService<P>>,
}

impl<P> DeviceService<P>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    /// Create the devices described by `initial`. Nothing is forwarded until
    /// [`announce`](Self::announce) is called.
    pub fn new(initial: InitialDevices, thermometer: Arc<ThermometerService<P>>) -> Self {
        let windows: BTreeMap<_, _> = (1..=initial.windows)
            .map(|id| {
                (
                    id,
                    Window {
                        id,
                        state: DeviceState::Closed,
                    },
                )
            })
            .collect();
        Self {
            devices: Mutex::new(Devices {
                door: Door {
                    state: initial.door,
                },
                heatpump: Heatpump {
                    state: initial.heatpump_state,
                    temperature: initial.heatpump_temperature,
                },
                next_window: initial.windows.saturating_add(1),
                windows,
                outdoor: Vec::new(),
            }),
            thermometer,
        }
    }

    /// Report every current device state to the thermometer so its registry
    /// starts out complete.
    ///
    /// # Errors
    ///
    /// Returns a validation error when an initial state does not fit its
    /// device.
    pub async fn announce(&self) -> Result<(), HomeSimError> {
        let devices = self.devices.lock().await;
        self.thermometer
            .ingest(Event::DoorChanged {
                state: devices.door.state,
            })
            .await?;
        self.thermometer
            .ingest(Event::HeatpumpStateChanged {
                state: devices.heatpump.state,
            })
            .await?;
        for window in devices.windows.values() {
            self.thermometer
                .ingest(Event::WindowChanged {
                    id: window.id,
                    state: window.state,
                })
                .await?;
        }
        tracing::info!(windows = devices.windows.len(), "announced initial devices");
        Ok(())
    }

    /// Decode a wire message and handle it.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Event`] for undecodable input, plus every
    /// error [`handle`](Self::handle) may return.
    pub async fn handle_message(&self, text: &str) -> Result<Reply, HomeSimError> {
        let event = Event::decode(text).inspect_err(|err| {
            tracing::warn!(error = %err, kind = %err.kind(), "rejected inbound message");
        })?;
        self.handle(event).await
    }

    /// Route a decoded event: control events drive the thermometer's
    /// subscription, device events go through the device model.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] for a window that was never added,
    /// or [`HomeSimError::Validation`] when the event is inconsistent.
    #[tracing::instrument(skip(self, event), fields(event = event.name()))]
    pub async fn handle(&self, event: Event) -> Result<Reply, HomeSimError> {
        match event {
            Event::Subscribe => Ok(Reply::Subscribed(self.thermometer.subscribe().await)),
            Event::Unsubscribe => Ok(Reply::Unsubscribed(self.thermometer.unsubscribe().await)),
            _ => {
                let (emission, _devices) = self.commit(event).await?;
                Ok(Reply::Reading(emission))
            }
        }
    }

    /// Forward `event` to the thermometer and, once accepted, apply it to the
    /// device model. The returned guard keeps the model locked so callers
    /// read back exactly what was committed.
    async fn commit(
        &self,
        event: Event,
    ) -> Result<(Emission, MutexGuard<'_, Devices>), HomeSimError> {
        let mut devices = self.devices.lock().await;
        if let Event::WindowChanged { id, .. } = event
            && !devices.windows.contains_key(&id)
        {
            return Err(window_not_found(id));
        }
        let emission = self.thermometer.ingest(event).await?;
        devices.apply(event, emission.timestamp);
        Ok((emission, devices))
    }

    pub async fn door(&self) -> Door {
        self.devices.lock().await.door
    }

    /// Open or close the door.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `state` is not `OPEN`/`CLOSED`.
    #[tracing::instrument(skip(self))]
    pub async fn set_door(&self, state: DeviceState) -> Result<Door, HomeSimError> {
        let (_, devices) = self.commit(Event::DoorChanged { state }).await?;
        Ok(devices.door)
    }

    pub async fn heatpump(&self) -> Heatpump {
        self.devices.lock().await.heatpump
    }

    /// Switch the heatpump on or off.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `state` is not `ON`/`OFF`.
    #[tracing::instrument(skip(self))]
    pub async fn set_heatpump_state(&self, state: DeviceState) -> Result<Heatpump, HomeSimError> {
        let (_, devices) = self.commit(Event::HeatpumpStateChanged { state }).await?;
        Ok(devices.heatpump)
    }

    /// Change the heatpump's output temperature.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `temperature` is not finite.
    #[tracing::instrument(skip(self))]
    pub async fn set_heatpump_temperature(
        &self,
        temperature: f64,
    ) -> Result<Heatpump, HomeSimError> {
        let (_, devices) = self
            .commit(Event::HeatpumpTempChanged { temp: temperature })
            .await?;
        Ok(devices.heatpump)
    }

    /// Set state and output temperature in one step, as the backend's full
    /// heatpump report does.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `state` is not `ON`/`OFF` or
    /// `temperature` is not finite.
    #[tracing::instrument(skip(self))]
    pub async fn set_heatpump(
        &self,
        state: DeviceState,
        temperature: f64,
    ) -> Result<Heatpump, HomeSimError> {
        let (_, devices) = self
            .commit(Event::HeatpumpChanged {
                state,
                temp: temperature,
            })
            .await?;
        Ok(devices.heatpump)
    }

    /// All windows, ordered by id.
    pub async fn windows(&self) -> Vec<Window> {
        self.devices.lock().await.windows.values().copied().collect()
    }

    /// Look up a window by id.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when no window with `id` exists.
    pub async fn window(&self, id: WindowId) -> Result<Window, HomeSimError> {
        let devices = self.devices.lock().await;
        devices
            .windows
            .get(&id)
            .copied()
            .ok_or_else(|| window_not_found(id))
    }

    /// Install a new window with the next free id and report it.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `state` is not `OPEN`/`CLOSED`.
    #[tracing::instrument(skip(self))]
    pub async fn add_window(&self, state: DeviceState) -> Result<Window, HomeSimError> {
        let mut devices = self.devices.lock().await;
        let id = devices.next_window;
        self.thermometer
            .ingest(Event::WindowChanged { id, state })
            .await?;
        let window = Window { id, state };
        devices.windows.insert(id, window);
        devices.next_window = id.saturating_add(1);
        tracing::info!(window = id, "window added");
        Ok(window)
    }

    /// Open or close an existing window.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] for an unknown `id`, or
    /// [`HomeSimError::Validation`] when `state` is not `OPEN`/`CLOSED`.
    #[tracing::instrument(skip(self))]
    pub async fn set_window(
        &self,
        id: WindowId,
        state: DeviceState,
    ) -> Result<Window, HomeSimError> {
        self.commit(Event::WindowChanged { id, state }).await?;
        Ok(Window { id, state })
    }

    /// Store an outdoor reading and forward it to the thermometer.
    ///
    /// Returns the room estimate after the reading was ingested.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `temperature` is not finite.
    pub async fn record_outdoor(&self, temperature: f64) -> Result<Emission, HomeSimError> {
        let (room, _devices) = self
            .commit(Event::OutdoorTemperature { temp: temperature })
            .await?;
        tracing::debug!(outdoor = temperature, room = room.temperature, "outdoor reading");
        Ok(room)
    }

    /// Outdoor readings recorded so far, oldest first.
    pub async fn outdoor_history(&self) -> Vec<Emission> {
        self.devices.lock().await.outdoor.clone()
    }

    /// Room estimates committed so far, oldest first.
    pub async fn room_history(&self) -> Vec<Emission> {
        self.thermometer.history().await
    }
}

fn window_not_found(id: WindowId) -> HomeSimError {
    NotFoundError {
        entity: "Window",
        id: id.to_string(),
    }
    .into()
}
