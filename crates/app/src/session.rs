//! Aggregation session — the thermometer's state and its update ordering.
//!
//! A session owns the running estimate, the device state registry, the
//! history of estimates and the subscription state. It is a plain
//! single-owner value; [`ThermometerService`](crate::services::thermometer_service::ThermometerService)
//! provides the mutual exclusion around it.

use homesim_domain::error::HomeSimError;
use homesim_domain::error::ValidationError;
use homesim_domain::estimator::{EstimatorPolicy, estimate};
use homesim_domain::event::Event;
use homesim_domain::id::SubscriptionId;
use homesim_domain::reading::{Ack, Emission, StateSnapshot};
use homesim_domain::registry::DeviceRegistry;
use homesim_domain::time::{Timestamp, now};

/// Whether periodic re-emission is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    #[default]
    Idle,
    Subscribed(SubscriptionId),
}

/// Stateful wrapper around the estimator.
#[derive(Debug, Clone)]
pub struct AggregationSession {
    temperature: f64,
    last_update: Timestamp,
    registry: DeviceRegistry,
    history: Vec<Emission>,
    subscription: SubscriptionState,
    policy: EstimatorPolicy,
}

impl AggregationSession {
    /// Start a session at `initial_temperature`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteTemperature`] for NaN or infinite values.
    pub fn new(initial_temperature: f64, policy: EstimatorPolicy) -> Result<Self, ValidationError> {
        if !initial_temperature.is_finite() {
            return Err(ValidationError::NonFiniteTemperature(initial_temperature));
        }
        Ok(Self {
            temperature: initial_temperature,
            last_update: now(),
            registry: DeviceRegistry::new(),
            history: Vec::new(),
            subscription: SubscriptionState::Idle,
            policy,
        })
    }

    /// Ingest `event`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`ingest_at`](Self::ingest_at).
    pub fn ingest(&mut self, event: &Event) -> Result<Emission, HomeSimError> {
        self.ingest_at(event, now())
    }

    /// Ingest `event` as of `timestamp`.
    ///
    /// The estimate is computed against the registry as it was *before* this
    /// event, then committed, then the registry entry is replaced. Control
    /// events do not reach the estimator; they return the current estimate
    /// and leave history untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error (and changes nothing) when the event carries
    /// a non-finite temperature or a state that does not fit its device.
    pub fn ingest_at(
        &mut self,
        event: &Event,
        timestamp: Timestamp,
    ) -> Result<Emission, HomeSimError> {
        event.validate()?;
        if event.is_control() {
            return Ok(self.current_emission());
        }

        self.temperature = estimate(event, self.temperature, &self.registry, self.policy);
        self.last_update = timestamp;
        if let Some((key, state)) = event.device_update() {
            self.registry.set(key, state);
        }

        let emission = self.current_emission();
        self.history.push(emission);
        Ok(emission)
    }

    /// Enter `Subscribed`. Returns the fresh subscription id, or `None` when
    /// already subscribed.
    pub fn subscribe(&mut self) -> Option<SubscriptionId> {
        match self.subscription {
            SubscriptionState::Subscribed(_) => None,
            SubscriptionState::Idle => {
                let id = SubscriptionId::new();
                self.subscription = SubscriptionState::Subscribed(id);
                Some(id)
            }
        }
    }

    /// Return to `Idle`. Any periodic emitter holding the previous id must
    /// stop once it observes the change.
    pub fn unsubscribe(&mut self) -> Ack {
        self.subscription = SubscriptionState::Idle;
        Ack::default()
    }

    /// The active subscription id, if any.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        match self.subscription {
            SubscriptionState::Idle => None,
            SubscriptionState::Subscribed(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription().is_some()
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn history(&self) -> &[Emission] {
        &self.history
    }

    #[must_use]
    pub fn policy(&self) -> EstimatorPolicy {
        self.policy
    }

    /// The last committed estimate with its commit time.
    #[must_use]
    pub fn current_emission(&self) -> Emission {
        Emission {
            temperature: self.temperature,
            timestamp: self.last_update,
        }
    }

    /// Read-only view stamped with `timestamp`.
    #[must_use]
    pub fn snapshot(&self, timestamp: Timestamp) -> StateSnapshot {
        StateSnapshot {
            temperature: self.temperature,
            devices: self.registry.snapshot(),
            subscribed: self.is_subscribed(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::device::{DeviceKey, DeviceState};
    use homesim_domain::estimator::OutdoorGuard;

    fn session(initial: f64) -> AggregationSession {
        AggregationSession::new(initial, EstimatorPolicy::default()).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn should_reject_non_finite_initial_temperature() {
        assert!(AggregationSession::new(f64::INFINITY, EstimatorPolicy::default()).is_err());
    }

    #[test]
    fn should_estimate_against_registry_before_the_event() {
        let mut s = session(20.0);
        s.ingest(&Event::DoorChanged {
            state: DeviceState::Closed,
        })
        .unwrap();

        // prior CLOSED -> OPEN must step down; with the registry updated
        // first the prior would already be OPEN and nothing would change
        let emission = s
            .ingest(&Event::DoorChanged {
                state: DeviceState::Open,
            })
            .unwrap();
        assert_close(emission.temperature, 19.0);
        assert_eq!(s.registry().get(DeviceKey::Door), Some(DeviceState::Open));
    }

    #[test]
    fn should_adjust_only_once_for_repeated_identical_states() {
        let mut s = session(20.0);
        let open = Event::DoorChanged {
            state: DeviceState::Open,
        };
        let closed = Event::DoorChanged {
            state: DeviceState::Closed,
        };

        s.ingest(&open).unwrap();
        assert_close(s.ingest(&closed).unwrap().temperature, 21.0);
        assert_close(s.ingest(&closed).unwrap().temperature, 21.0);
        assert_close(s.ingest(&closed).unwrap().temperature, 21.0);
    }

    #[test]
    fn should_average_outdoor_temperature_when_everything_closed() {
        let mut s = session(20.0);
        s.ingest(&Event::DoorChanged {
            state: DeviceState::Closed,
        })
        .unwrap();
        s.ingest(&Event::HeatpumpStateChanged {
            state: DeviceState::Off,
        })
        .unwrap();

        let emission = s.ingest(&Event::OutdoorTemperature { temp: 30.0 }).unwrap();
        assert_close(emission.temperature, 25.0);
    }

    #[test]
    fn should_ignore_outdoor_temperature_while_door_open() {
        let mut s = session(20.0);
        s.ingest(&Event::DoorChanged {
            state: DeviceState::Open,
        })
        .unwrap();

        let emission = s.ingest(&Event::OutdoorTemperature { temp: 30.0 }).unwrap();
        assert_close(emission.temperature, 20.0);
    }

    #[test]
    fn should_apply_window_draft_and_record_new_state() {
        // OPEN -> CLOSED at 22.0 is 23.0, not 21.0: leaving OPEN adds the
        // draft step.
        let mut s = session(22.0);
        s.ingest(&Event::WindowChanged {
            id: 1,
            state: DeviceState::Open,
        })
        .unwrap();

        let emission = s
            .ingest(&Event::WindowChanged {
                id: 1,
                state: DeviceState::Closed,
            })
            .unwrap();
        assert_close(emission.temperature, 23.0);
        assert_eq!(
            s.registry().get(DeviceKey::Window(1)),
            Some(DeviceState::Closed)
        );
    }

    #[test]
    fn should_blend_heatpump_temperature_only_when_on() {
        let mut on = session(20.0);
        on.ingest(&Event::HeatpumpStateChanged {
            state: DeviceState::On,
        })
        .unwrap();
        assert_close(
            on.ingest(&Event::HeatpumpTempChanged { temp: 28.0 })
                .unwrap()
                .temperature,
            24.0,
        );

        let mut off = session(20.0);
        off.ingest(&Event::HeatpumpStateChanged {
            state: DeviceState::Off,
        })
        .unwrap();
        assert_close(
            off.ingest(&Event::HeatpumpTempChanged { temp: 28.0 })
                .unwrap()
                .temperature,
            20.0,
        );
    }

    #[test]
    fn should_record_full_heatpump_report_as_one_estimate() {
        let mut s = session(20.0);
        let emission = s
            .ingest(&Event::HeatpumpChanged {
                state: DeviceState::On,
                temp: 28.0,
            })
            .unwrap();
        assert_close(emission.temperature, 24.0);
        assert_eq!(s.registry().get(DeviceKey::Heatpump), Some(DeviceState::On));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn should_leave_state_untouched_for_invalid_event() {
        let mut s = session(20.0);
        s.ingest(&Event::DoorChanged {
            state: DeviceState::Open,
        })
        .unwrap();
        let before_registry = s.registry().clone();
        let before_history = s.history().len();

        let err = s
            .ingest(&Event::OutdoorTemperature { temp: f64::NAN })
            .unwrap_err();
        assert!(matches!(err, HomeSimError::Validation(_)));

        let err = s
            .ingest(&Event::DoorChanged {
                state: DeviceState::On,
            })
            .unwrap_err();
        assert!(matches!(err, HomeSimError::Validation(_)));

        assert_close(s.temperature(), 20.0);
        assert_eq!(s.registry(), &before_registry);
        assert_eq!(s.history().len(), before_history);
    }

    #[test]
    fn should_append_every_estimate_to_history() {
        let mut s = session(20.0);
        let ts: Timestamp = "2024-01-01T12:00:00Z".parse().unwrap();
        s.ingest_at(&Event::OutdoorTemperature { temp: 10.0 }, ts)
            .unwrap();
        s.ingest_at(&Event::OutdoorTemperature { temp: 10.0 }, ts)
            .unwrap();

        let temps: Vec<f64> = s.history().iter().map(|e| e.temperature).collect();
        assert_eq!(temps.len(), 2);
        assert_close(temps[0], 15.0);
        assert_close(temps[1], 12.5);
        assert_eq!(s.history()[1].timestamp, ts);
    }

    #[test]
    fn should_not_run_estimator_for_control_events() {
        let mut s = session(20.0);
        let emission = s.ingest(&Event::Subscribe).unwrap();
        assert_close(emission.temperature, 20.0);
        assert!(!s.is_subscribed());
        assert!(s.history().is_empty());
    }

    #[test]
    fn should_subscribe_once_until_unsubscribed() {
        let mut s = session(20.0);
        let first = s.subscribe();
        assert!(first.is_some());
        assert_eq!(s.subscribe(), None);
        assert_eq!(s.subscription(), first);

        assert!(s.unsubscribe().ack);
        assert_eq!(s.subscription(), None);

        let second = s.subscribe();
        assert!(second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn should_snapshot_devices_and_subscription() {
        let mut s = session(20.0);
        s.ingest(&Event::WindowChanged {
            id: 2,
            state: DeviceState::Open,
        })
        .unwrap();
        s.subscribe();

        let snapshot = s.snapshot(now());
        assert!(snapshot.subscribed);
        assert_eq!(snapshot.devices.get("window:2"), Some(&DeviceState::Open));
        assert_close(snapshot.temperature, 20.0);
    }

    #[test]
    fn should_honour_configured_outdoor_guard() {
        let policy = EstimatorPolicy {
            outdoor_guard: OutdoorGuard::DoorClosedHeatpumpOff,
            ..EstimatorPolicy::default()
        };
        let mut s = AggregationSession::new(20.0, policy).unwrap();
        s.ingest(&Event::WindowChanged {
            id: 1,
            state: DeviceState::Open,
        })
        .unwrap();

        let emission = s.ingest(&Event::OutdoorTemperature { temp: 30.0 }).unwrap();
        assert_close(emission.temperature, 25.0);
        assert_eq!(s.policy(), policy);
    }
}
