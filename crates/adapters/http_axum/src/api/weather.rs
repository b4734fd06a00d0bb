//! Outdoor temperature history.

use axum::Json;
use axum::extract::State;

use homesim_app::ports::NotificationPublisher;
use homesim_domain::reading::Emission;

use crate::state::AppState;

/// `GET /api/weather/history`
pub async fn history<P>(State(state): State<AppState<P>>) -> Json<Vec<Emission>>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Json(state.devices.outdoor_history().await)
}
