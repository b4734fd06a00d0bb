//! JSON REST handlers for the thermometer.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use homesim_app::ports::NotificationPublisher;
use homesim_app::services::device_service::Reply;
use homesim_domain::reading::{Ack, Emission, StateSnapshot};

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the events endpoint.
pub enum IngestResponse {
    Reading(Json<Emission>),
    Subscribed(Json<StateSnapshot>),
    AlreadySubscribed,
    Unsubscribed(Json<Ack>),
}

impl From<Reply> for IngestResponse {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Reading(emission) => Self::Reading(Json(emission)),
            Reply::Subscribed(Some(snapshot)) => Self::Subscribed(Json(snapshot)),
            Reply::Subscribed(None) => Self::AlreadySubscribed,
            Reply::Unsubscribed(ack) => Self::Unsubscribed(Json(ack)),
        }
    }
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Reading(json) => json.into_response(),
            Self::Subscribed(json) => json.into_response(),
            Self::AlreadySubscribed => StatusCode::NO_CONTENT.into_response(),
            Self::Unsubscribed(json) => json.into_response(),
        }
    }
}

/// `GET /api/thermometer`
pub async fn current<P>(State(state): State<AppState<P>>) -> Json<StateSnapshot>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Json(state.thermometer.current_state().await)
}

/// `GET /api/thermometer/history`
pub async fn history<P>(State(state): State<AppState<P>>) -> Json<Vec<Emission>>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Json(state.thermometer.history().await)
}

/// `POST /api/thermometer/events`
///
/// The body is a raw wire message, exactly as a WebSocket client would send it.
pub async fn ingest<P>(
    State(state): State<AppState<P>>,
    body: String,
) -> Result<IngestResponse, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    let reply = state.devices.handle_message(&body).await?;
    Ok(reply.into())
}
