//! # homesimd — homesim daemon
//!
//! Composition root that wires the simulated home together and starts the
//! server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise structured logging
//! - Construct the notification bus, the thermometer and the devices
//! - Start background simulations (weather station)
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use homesim_adapter_http_axum::state::AppState;
use homesim_adapter_virtual::WeatherStation;
use homesim_app::event_bus::InProcessNotificationBus;
use homesim_app::ports::Simulation;
use homesim_app::services::device_service::DeviceService;
use homesim_app::services::simulation_context::ServiceContext;
use homesim_app::services::thermometer_service::ThermometerService;
use homesim_app::session::AggregationSession;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Notification bus
    let bus = Arc::new(InProcessNotificationBus::new(
        config.thermometer.bus_capacity,
    ));

    // Services
    let session = AggregationSession::new(
        config.thermometer.initial_temperature,
        config.thermometer.policy,
    )?;
    let thermometer = Arc::new(ThermometerService::new(
        session,
        Arc::clone(&bus),
        config.schedule(),
    ));
    let devices = Arc::new(DeviceService::new(
        config.initial_devices(),
        Arc::clone(&thermometer),
    ));
    devices.announce().await?;

    // Simulations
    let mut weather = config
        .weather
        .enabled
        .then(|| WeatherStation::new(config.weather_settings()));
    if let Some(station) = weather.as_mut() {
        station.start(ServiceContext::new(Arc::clone(&devices)))?;
        tracing::info!(simulation = station.name(), "simulation started");
    }

    // HTTP
    let state = AppState::new(Arc::clone(&thermometer), devices, bus);
    let app = homesim_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "homesimd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(station) = weather.as_mut() {
        if let Err(err) = station.teardown().await {
            tracing::warn!(simulation = station.name(), error = %err, "simulation teardown failed");
        }
    }
    thermometer.shutdown().await;
    tracing::info!("homesimd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Ctrl+C received, shutting down");
}
