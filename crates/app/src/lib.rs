//! # homesim-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement or call:
//!   - `NotificationPublisher` — push thermometer notifications downstream
//!   - `Simulation` / `SimulationContext` — background device simulators
//! - Own the **aggregation session**: registry, running estimate, history,
//!   and the subscription state machine
//! - Serialise access to the session and drive periodic re-emission
//!   (`ThermometerService`)
//! - Hold the simulated devices and forward their changes to the
//!   thermometer (`DeviceService`)
//! - Provide **in-process infrastructure** (notification bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `homesim-domain` only (plus `tokio` for locks, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod jitter;
pub mod ports;
pub mod services;
pub mod session;
