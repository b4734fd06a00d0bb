//! Concrete [`SimulationContext`] backed by the device service.

use std::sync::Arc;

use homesim_domain::error::HomeSimError;
use homesim_domain::reading::Emission;

use crate::ports::{NotificationPublisher, SimulationContext};
use crate::services::device_service::DeviceService;

/// [`SimulationContext`] implementation that delegates to `DeviceService`.
///
/// Wraps an `Arc`-ed service so it is cheaply cloneable and `Send + Sync`.
/// Simulations see only the [`SimulationContext`] trait.
pub struct ServiceContext<P> {
    devices: Arc<DeviceService<P>>,
}

impl<P> ServiceContext<P> {
    pub fn new(devices: Arc<DeviceService<P>>) -> Self {
        Self { devices }
    }
}

impl<P> Clone for ServiceContext<P> {
    fn clone(&self) -> Self {
        Self {
            devices: Arc::clone(&self.devices),
        }
    }
}

impl<P> SimulationContext for ServiceContext<P>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    async fn record_outdoor(&self, temperature: f64) -> Result<Emission, HomeSimError> {
        self.devices.record_outdoor(temperature).await
    }
}
