//! # homesim-domain
//!
//! Pure domain model for the homesim smart-home simulator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **device keys and states** (door, heatpump, windows)
//! - Define the **device state registry** consulted by the thermometer
//! - Define **events** (closed enum) and decode them from wire JSON
//! - Define the **temperature estimator**, the pure rule set that turns an
//!   event plus the prior registry into a new room temperature
//! - Define **readings** and the notifications pushed downstream
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod estimator;
pub mod event;
pub mod reading;
pub mod registry;
