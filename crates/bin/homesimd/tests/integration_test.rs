//! End-to-end smoke tests for the full homesimd stack.
//!
//! Each test spins up the complete application (real notification bus, real
//! services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot` — no TCP port is bound.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use homesim_adapter_http_axum::router;
use homesim_adapter_http_axum::state::AppState;
use homesim_adapter_virtual::{WeatherSettings, WeatherStation};
use homesim_app::event_bus::InProcessNotificationBus;
use homesim_app::jitter::Jitter;
use homesim_app::ports::Simulation;
use homesim_app::services::device_service::{DeviceService, InitialDevices};
use homesim_app::services::simulation_context::ServiceContext;
use homesim_app::services::thermometer_service::ThermometerService;
use homesim_app::session::AggregationSession;
use homesim_domain::estimator::EstimatorPolicy;
use tower::ServiceExt;

type Bus = Arc<InProcessNotificationBus>;

/// Build fully-wired state with the default devices announced.
async fn state() -> AppState<Bus> {
    let bus = Arc::new(InProcessNotificationBus::new(256));
    let session = AggregationSession::new(20.0, EstimatorPolicy::default())
        .expect("initial temperature should be valid");
    let thermometer = Arc::new(ThermometerService::new(
        session,
        Arc::clone(&bus),
        Jitter::new(Duration::from_secs(2), 0.2),
    ));
    let devices = Arc::new(DeviceService::new(
        InitialDevices::default(),
        Arc::clone(&thermometer),
    ));
    devices
        .announce()
        .await
        .expect("default devices should announce");
    AppState::new(thermometer, devices, bus)
}

async fn send(state: &AppState<Bus>, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = router::build(state.clone()).oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn temperature(body: &serde_json::Value) -> f64 {
    body["temperature"].as_f64().unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let state = state().await;
    let resp = router::build(state).oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Estimation through the device API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_start_with_announced_devices() {
    let state = state().await;

    let (status, body) = send(&state, get("/api/thermometer")).await;

    assert_eq!(status, StatusCode::OK);
    assert!((temperature(&body) - 20.0).abs() < f64::EPSILON);
    assert_eq!(body["devices"]["door"], "CLOSED");
    assert_eq!(body["devices"]["heatpump"], "OFF");
    assert_eq!(body["devices"]["window:1"], "CLOSED");
}

#[tokio::test]
async fn should_blend_outdoor_reading_when_everything_is_closed() {
    let state = state().await;

    let (status, body) = send(
        &state,
        json(
            "POST",
            "/api/thermometer/events",
            r#"{"type":"temperature","value":{"temp":30}}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!((temperature(&body) - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_ignore_outdoor_reading_while_door_is_open() {
    let state = state().await;

    let (_, door) = send(&state, json("PUT", "/api/door", r#"{"state":"OPEN"}"#)).await;
    assert_eq!(door["state"], "OPEN");

    let (_, body) = send(
        &state,
        json(
            "POST",
            "/api/thermometer/events",
            r#"{"type":"temperature","temp":"5"}"#,
        ),
    )
    .await;

    assert!((temperature(&body) - 19.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_adjust_once_per_window_transition() {
    let state = state().await;

    send(&state, json("PUT", "/api/windows/1", r#"{"state":"OPEN"}"#)).await;
    send(&state, json("PUT", "/api/windows/1", r#"{"state":"OPEN"}"#)).await;
    let (_, snapshot) = send(&state, get("/api/thermometer")).await;
    assert!((temperature(&snapshot) - 19.0).abs() < f64::EPSILON);
    assert_eq!(snapshot["devices"]["window:1"], "OPEN");

    send(&state, json("PUT", "/api/windows/1", r#"{"state":"CLOSED"}"#)).await;
    let (_, snapshot) = send(&state, get("/api/thermometer")).await;
    assert!((temperature(&snapshot) - 20.0).abs() < f64::EPSILON);
    assert_eq!(snapshot["devices"]["window:1"], "CLOSED");
}

#[tokio::test]
async fn should_accept_window_wire_message_with_string_id() {
    let state = state().await;

    let (status, body) = send(
        &state,
        json(
            "POST",
            "/api/thermometer/events",
            r#"{"type":"windows","valueId":"1","value":{"state":"OPEN"}}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!((temperature(&body) - 19.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_apply_full_heatpump_report_to_device_and_estimate() {
    let state = state().await;

    let (status, body) = send(
        &state,
        json(
            "POST",
            "/api/thermometer/events",
            r#"{"type":"heatpump","value":{"_temperature":28,"_state":"ON"}}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((temperature(&body) - 24.0).abs() < f64::EPSILON);

    let (_, heatpump) = send(&state, get("/api/heatpump")).await;
    assert_eq!(heatpump["state"], "ON");
    assert!((temperature(&heatpump) - 28.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_not_register_window_unknown_to_device_model() {
    let state = state().await;

    let (status, _) = send(
        &state,
        json(
            "POST",
            "/api/thermometer/events",
            r#"{"type":"windows","valueId":42,"value":{"state":"OPEN"}}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(
        &state,
        json("POST", "/api/thermometer/events", r#"{"type":"temperature","temp":30}"#),
    )
    .await;
    assert!((temperature(&body) - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_record_room_history() {
    let state = state().await;
    let baseline = send(&state, get("/api/thermometer/history"))
        .await
        .1
        .as_array()
        .map_or(0, Vec::len);

    send(&state, json("PUT", "/api/heatpump/state", r#"{"state":"ON"}"#)).await;
    send(
        &state,
        json("PUT", "/api/heatpump/temperature", r#"{"temperature":28}"#),
    )
    .await;

    let (status, history) = send(&state, get("/api/thermometer/history")).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), baseline + 2);
    assert!((temperature(history.last().unwrap()) - 24.0).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Subscription lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_subscribe_then_acknowledge_unsubscribe() {
    let state = state().await;

    let (status, snapshot) = send(
        &state,
        json("POST", "/api/thermometer/events", r#"{"type":"subscribe"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["subscribed"], true);

    let (status, _) = send(
        &state,
        json("POST", "/api/thermometer/events", r#"{"type":"subscribe"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, ack) = send(
        &state,
        json("POST", "/api/thermometer/events", r#"{"type":"unsubscribe"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, serde_json::json!({"ack": true}));

    let (_, current) = send(&state, get("/api/thermometer")).await;
    assert_eq!(current["subscribed"], false);
}

// ---------------------------------------------------------------------------
// Rejected input
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_leave_state_untouched_on_rejected_events() {
    let state = state().await;

    for body in [
        "",
        "{broken",
        r#"{"value":{"state":"OPEN"}}"#,
        r#"{"type":"sprinkler"}"#,
        r#"{"type":"door","value":{"state":"AJAR"}}"#,
        r#"{"type":"temperature","value":{"temp":"warm"}}"#,
        r#"{"type":"heatpump","value":{}}"#,
    ] {
        let (status, error) = send(&state, json("POST", "/api/thermometer/events", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(error["error"].is_string(), "{body}");
    }

    let (_, snapshot) = send(&state, get("/api/thermometer")).await;
    assert!((temperature(&snapshot) - 20.0).abs() < f64::EPSILON);
    assert_eq!(snapshot["devices"]["door"], "CLOSED");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_window() {
    let state = state().await;

    let (status, body) = send(&state, json("PUT", "/api/windows/7", r#"{"state":"OPEN"}"#)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// ---------------------------------------------------------------------------
// Weather station
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_feed_weather_readings_into_history() {
    let state = state().await;
    let mut station = WeatherStation::new(WeatherSettings {
        mean: 12.0,
        amplitude: 8.0,
        schedule: Jitter::new(Duration::from_secs(1), 0.0),
    });
    station
        .start(ServiceContext::new(Arc::clone(&state.devices)))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    station.teardown().await.unwrap();

    let (status, outdoor) = send(&state, get("/api/weather/history")).await;
    assert_eq!(status, StatusCode::OK);
    let outdoor = outdoor.as_array().unwrap();
    assert_eq!(outdoor.len(), 3);
    assert!(
        outdoor
            .iter()
            .all(|reading| (4.0..=20.0).contains(&temperature(reading)))
    );
}
