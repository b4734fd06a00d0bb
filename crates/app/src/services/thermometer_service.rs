//! Thermometer service — serialised access to the aggregation session.
//!
//! Every operation takes the same async mutex, so inbound events and the
//! periodic re-emission never interleave. Notifications are published while
//! the lock is held, which keeps them in processing order.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use homesim_domain::error::HomeSimError;
use homesim_domain::event::Event;
use homesim_domain::id::SubscriptionId;
use homesim_domain::reading::{Ack, Emission, Notification, StateSnapshot};
use homesim_domain::time::now;

use crate::jitter::Jitter;
use crate::ports::NotificationPublisher;
use crate::session::AggregationSession;

struct Inner {
    session: AggregationSession,
    ticker: Option<JoinHandle<()>>,
}

/// Owns one [`AggregationSession`] and drives its subscription lifecycle.
pub struct ThermometerService<P> {
    inner: Arc<Mutex<Inner>>,
    publisher: Arc<P>,
    schedule: Jitter,
}

impl<P> ThermometerService<P>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    /// Create a new service around `session`, re-emitting on `schedule`
    /// while subscribed.
    pub fn new(session: AggregationSession, publisher: P, schedule: Jitter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                session,
                ticker: None,
            })),
            publisher: Arc::new(publisher),
            schedule,
        }
    }

    /// Ingest a device or weather event and publish the new estimate.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the event fails its invariants;
    /// nothing is published in that case.
    #[tracing::instrument(skip(self, event), fields(event = event.name()))]
    pub async fn ingest(&self, event: Event) -> Result<Emission, HomeSimError> {
        let mut inner = self.inner.lock().await;
        let emission = inner.session.ingest(&event)?;
        tracing::debug!(temperature = emission.temperature, "estimate updated");
        publish(&*self.publisher, Notification::Temperature(emission)).await;
        Ok(emission)
    }

    /// Start periodic re-emission.
    ///
    /// Publishes the current state right away and returns it. Returns `None`
    /// without side effects when already subscribed.
    pub async fn subscribe(&self) -> Option<StateSnapshot> {
        let mut inner = self.inner.lock().await;
        let Some(id) = inner.session.subscribe() else {
            tracing::debug!("already subscribed");
            return None;
        };

        let snapshot = inner.session.snapshot(now());
        publish(&*self.publisher, Notification::Periodic(snapshot.clone())).await;

        if let Some(stale) = inner.ticker.replace(self.spawn_ticker(id)) {
            stale.abort();
        }
        tracing::info!(subscription = %id, "subscribed to thermometer state");
        Some(snapshot)
    }

    /// Stop periodic re-emission and publish an acknowledgment.
    pub async fn unsubscribe(&self) -> Ack {
        let mut inner = self.inner.lock().await;
        let ack = inner.session.unsubscribe();
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
            tracing::info!("unsubscribed from thermometer state");
        }
        publish(&*self.publisher, Notification::Ack(ack)).await;
        ack
    }

    /// Stop periodic re-emission without acknowledging. Used on shutdown.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.session.unsubscribe();
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
    }

    /// Current estimate and registry.
    pub async fn current_state(&self) -> StateSnapshot {
        self.inner.lock().await.session.snapshot(now())
    }

    /// Every estimate committed so far, oldest first.
    pub async fn history(&self) -> Vec<Emission> {
        self.inner.lock().await.session.history().to_vec()
    }

    fn spawn_ticker(&self, id: SubscriptionId) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let publisher = Arc::clone(&self.publisher);
        let schedule = self.schedule;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(schedule.next_delay()).await;

                let guard = inner.lock().await;
                if guard.session.subscription() != Some(id) {
                    tracing::debug!(subscription = %id, "discarding tick of ended subscription");
                    break;
                }
                let snapshot = guard.session.snapshot(now());
                publish(&*publisher, Notification::Periodic(snapshot)).await;
            }
        })
    }
}

async fn publish<P: NotificationPublisher>(publisher: &P, notification: Notification) {
    if let Err(err) = publisher.publish(notification).await {
        tracing::warn!(error = %err, "failed to publish thermometer notification");
    }
}
