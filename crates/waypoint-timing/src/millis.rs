//! Serde helper: durations written as whole milliseconds.
//!
//! Use with `#[serde(with = "waypoint_timing::millis")]`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Deserializes a millisecond count.
///
/// # Errors
///
/// Returns the deserializer's error if the value is not an unsigned integer.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// Serializes a duration as a millisecond count, saturating at `u64::MAX`.
///
/// # Errors
///
/// Returns the serializer's error.
pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
