//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to readings and notifications.
///
/// Serialises as an ISO 8601 / RFC 3339 string.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
