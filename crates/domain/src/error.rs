//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HomeSimError`]
//! via `#[from]`.

use std::fmt;

/// Top-level error shared by every layer.
#[derive(Debug, thiserror::Error)]
pub enum HomeSimError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("rejected event")]
    Event(#[from] EventError),

    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain value failed its invariants.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("temperature must be a finite number, got {0}")]
    NonFiniteTemperature(f64),

    #[error("{device} does not accept state {state}")]
    UnsupportedState {
        device: &'static str,
        state: String,
    },
}

/// A lookup did not match anything.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An inbound event could not be turned into a domain [`Event`](crate::event::Event).
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid inbound message")]
    Empty,

    #[error("message is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("message payload has an unexpected shape")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("message has no type")]
    MissingType,

    #[error("invalid message type {0:?}")]
    UnknownType(String),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid device state {0:?}")]
    InvalidState(String),

    #[error("temperature {0} is not numeric")]
    NonNumericTemperature(String),

    #[error("window id {0} is not a positive integer")]
    InvalidWindowId(String),
}

/// Coarse classification of an [`EventError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventErrorKind {
    /// Unparsable payload, missing field, or non-numeric temperature.
    MalformedEvent,
    /// The `type` discriminator is not one the thermometer understands.
    UnknownEventType,
}

impl EventError {
    #[must_use]
    pub fn kind(&self) -> EventErrorKind {
        match self {
            Self::UnknownType(_) => EventErrorKind::UnknownEventType,
            _ => EventErrorKind::MalformedEvent,
        }
    }
}

impl fmt::Display for EventErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEvent => f.write_str("malformed_event"),
            Self::UnknownEventType => f.write_str("unknown_event_type"),
        }
    }
}
