//! JSON REST handlers for the simulated door, heatpump and windows.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homesim_app::ports::NotificationPublisher;
use homesim_domain::device::{DeviceState, Door, Heatpump, Window, WindowId};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for changing a device state.
#[derive(Deserialize)]
pub struct SetStateRequest {
    pub state: DeviceState,
}

/// Request body for changing the heatpump temperature.
#[derive(Deserialize)]
pub struct SetTemperatureRequest {
    pub temperature: f64,
}

/// Request body for replacing the whole heatpump.
#[derive(Deserialize)]
pub struct SetHeatpumpRequest {
    pub state: DeviceState,
    pub temperature: f64,
}

/// Request body for installing a window. Defaults to `CLOSED`.
#[derive(Deserialize)]
#[serde(default)]
pub struct AddWindowRequest {
    pub state: DeviceState,
}

impl Default for AddWindowRequest {
    fn default() -> Self {
        Self {
            state: DeviceState::Closed,
        }
    }
}

/// Possible responses from the add window endpoint.
pub enum AddWindowResponse {
    Created(Json<Window>),
}

impl IntoResponse for AddWindowResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/door`
pub async fn get_door<P>(State(state): State<AppState<P>>) -> Json<Door>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Json(state.devices.door().await)
}

/// `PUT /api/door`
pub async fn set_door<P>(
    State(state): State<AppState<P>>,
    Json(req): Json<SetStateRequest>,
) -> Result<Json<Door>, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Ok(Json(state.devices.set_door(req.state).await?))
}

/// `GET /api/heatpump`
pub async fn get_heatpump<P>(State(state): State<AppState<P>>) -> Json<Heatpump>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Json(state.devices.heatpump().await)
}

/// `PUT /api/heatpump`
pub async fn set_heatpump<P>(
    State(state): State<AppState<P>>,
    Json(req): Json<SetHeatpumpRequest>,
) -> Result<Json<Heatpump>, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Ok(Json(
        state
            .devices
            .set_heatpump(req.state, req.temperature)
            .await?,
    ))
}

/// `PUT /api/heatpump/state`
pub async fn set_heatpump_state<P>(
    State(state): State<AppState<P>>,
    Json(req): Json<SetStateRequest>,
) -> Result<Json<Heatpump>, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Ok(Json(state.devices.set_heatpump_state(req.state).await?))
}

/// `PUT /api/heatpump/temperature`
pub async fn set_heatpump_temperature<P>(
    State(state): State<AppState<P>>,
    Json(req): Json<SetTemperatureRequest>,
) -> Result<Json<Heatpump>, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Ok(Json(
        state
            .devices
            .set_heatpump_temperature(req.temperature)
            .await?,
    ))
}

/// `GET /api/windows`
pub async fn list_windows<P>(State(state): State<AppState<P>>) -> Json<Vec<Window>>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Json(state.devices.windows().await)
}

/// `POST /api/windows`
pub async fn add_window<P>(
    State(state): State<AppState<P>>,
    req: Option<Json<AddWindowRequest>>,
) -> Result<AddWindowResponse, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    let Json(req) = req.unwrap_or_default();
    let window = state.devices.add_window(req.state).await?;
    Ok(AddWindowResponse::Created(Json(window)))
}

/// `GET /api/windows/:id`
pub async fn get_window<P>(
    State(state): State<AppState<P>>,
    Path(id): Path<WindowId>,
) -> Result<Json<Window>, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Ok(Json(state.devices.window(id).await?))
}

/// `PUT /api/windows/:id`
pub async fn set_window<P>(
    State(state): State<AppState<P>>,
    Path(id): Path<WindowId>,
    Json(req): Json<SetStateRequest>,
) -> Result<Json<Window>, ApiError>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Ok(Json(state.devices.set_window(id, req.state).await?))
}
