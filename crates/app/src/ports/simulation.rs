//! Simulation port — lifecycle of background device simulators.
//!
//! A simulation produces readings on its own schedule (the weather station,
//! for instance) and hands them to the application through a
//! [`SimulationContext`].

use std::future::Future;

use homesim_domain::error::HomeSimError;
use homesim_domain::reading::Emission;

/// Context provided to simulations for reporting what they observe.
///
/// The binary crate wires a concrete implementation backed by
/// `DeviceService`.
pub trait SimulationContext: Send + Sync {
    /// Record an outdoor temperature reading and forward it to the thermometer.
    ///
    /// Returns the thermometer's estimate after the reading was ingested.
    fn record_outdoor(
        &self,
        temperature: f64,
    ) -> impl Future<Output = Result<Emission, HomeSimError>> + Send;
}

/// A pluggable background simulator.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`start`](Self::start) — spawn the background task and return immediately
/// 2. (the server runs)
/// 3. [`teardown`](Self::teardown) — stop the task
pub trait Simulation {
    /// Unique name identifying this simulation (e.g. `"weather"`).
    fn name(&self) -> &'static str;

    /// Spawn the background task feeding `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation is misconfigured.
    fn start(&mut self, ctx: impl SimulationContext + Clone + 'static) -> Result<(), HomeSimError>;

    /// Called on graceful shutdown. Stop any background task.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HomeSimError>> + Send;
}
