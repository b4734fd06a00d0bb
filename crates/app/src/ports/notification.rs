//! Notification port — push thermometer output to listeners.

use std::future::Future;

use homesim_domain::error::HomeSimError;
use homesim_domain::reading::Notification;

/// Delivers [`Notification`]s to whoever listens downstream.
///
/// Delivery is best effort: the thermometer logs a failed publish and carries on.
pub trait NotificationPublisher {
    /// Publish a notification to all current listeners.
    fn publish(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), HomeSimError>> + Send;
}

impl<T: NotificationPublisher + Send + Sync> NotificationPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), HomeSimError>> + Send {
        (**self).publish(notification)
    }
}
