//! Utility functions for UUID generation and timestamp handling.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Generates a random v4 UUID.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Generates a random v4 UUID in simple (dashless) string form.
///
/// Used for trace/span identifiers, which conventionally omit dashes.
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Returns the current time as an RFC3339 timestamp with microsecond
/// precision.
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
