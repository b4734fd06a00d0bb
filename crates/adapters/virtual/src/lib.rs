//! # homesim-adapter-virtual
//!
//! Virtual simulations that drive the home without real hardware.
//!
//! ## Provided simulations
//!
//! | Simulation | Name | Behaviour |
//! |------------|------|-----------|
//! | Weather station | `weather` | Reports a wandering outdoor temperature on a jittered schedule |
//!
//! ## Dependency rule
//!
//! Depends on `homesim-app` (port traits) and `homesim-domain` only.

mod weather;

pub use weather::{WeatherModel, WeatherSettings, WeatherStation};
