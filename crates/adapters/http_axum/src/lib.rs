//! # homesim-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for the simulated devices and the thermometer
//!   (`/api/door`, `/api/windows`, `/api/thermometer`, …)
//! - Serve the **thermometer WebSocket** (`/ws`): inbound wire messages are
//!   handed to the thermometer, and every notification is pushed to every
//!   connected client
//! - Map application results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `homesim-app` (for port traits and services) and `homesim-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
pub mod wire;
pub mod ws;
