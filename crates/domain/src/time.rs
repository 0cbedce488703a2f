//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for point updates, actuation requests, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Unix seconds of `ts`, the representation used for the trigger time
/// (where `0` means "no active episode").
#[must_use]
pub fn unix_seconds(ts: Timestamp) -> i64 {
    ts.timestamp()
}
