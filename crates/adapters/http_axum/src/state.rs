//! Shared application state for axum handlers.

use std::sync::Arc;

use homesim_app::event_bus::InProcessNotificationBus;
use homesim_app::ports::NotificationPublisher;
use homesim_app::services::device_service::DeviceService;
use homesim_app::services::thermometer_service::ThermometerService;

/// Application state shared across all axum handlers.
///
/// Generic over the notification publisher to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<P> {
    /// The aggregation session and its subscription lifecycle.
    pub thermometer: Arc<ThermometerService<P>>,
    /// Simulated door, windows, heatpump and outdoor sensor.
    pub devices: Arc<DeviceService<P>>,
    /// Bus the WebSocket clients listen on.
    pub notifications: Arc<InProcessNotificationBus>,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            thermometer: Arc::clone(&self.thermometer),
            devices: Arc::clone(&self.devices),
            notifications: Arc::clone(&self.notifications),
        }
    }
}

impl<P> AppState<P>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The services are usually shared with background simulations before
    /// the HTTP state is built.
    pub fn new(
        thermometer: Arc<ThermometerService<P>>,
        devices: Arc<DeviceService<P>>,
        notifications: Arc<InProcessNotificationBus>,
    ) -> Self {
        Self {
            thermometer,
            devices,
            notifications,
        }
    }
}
