//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod thermometer;
pub mod weather;

use axum::Router;
use axum::routing::{get, post, put};

use homesim_app::ports::NotificationPublisher;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<P>() -> Router<AppState<P>>
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    Router::new()
        // Thermometer
        .route("/thermometer", get(thermometer::current::<P>))
        .route("/thermometer/history", get(thermometer::history::<P>))
        .route("/thermometer/events", post(thermometer::ingest::<P>))
        // Door
        .route(
            "/door",
            get(devices::get_door::<P>).put(devices::set_door::<P>),
        )
        // Heatpump
        .route(
            "/heatpump",
            get(devices::get_heatpump::<P>).put(devices::set_heatpump::<P>),
        )
        .route("/heatpump/state", put(devices::set_heatpump_state::<P>))
        .route(
            "/heatpump/temperature",
            put(devices::set_heatpump_temperature::<P>),
        )
        // Windows
        .route(
            "/windows",
            get(devices::list_windows::<P>).post(devices::add_window::<P>),
        )
        .route(
            "/windows/{id}",
            get(devices::get_window::<P>).put(devices::set_window::<P>),
        )
        // Weather
        .route("/weather/history", get(weather::history::<P>))
}
