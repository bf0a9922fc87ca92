use chrono::{DateTime, Utc};

/// Converts a timestamp into the integer form stored in the database
/// (microseconds since the Unix epoch).
pub fn to_db_time(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

/// Inverse of [`to_db_time`]. Out-of-range values clamp to the epoch.
pub fn from_db_time(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Current time truncated to microsecond precision, so that a value survives
/// a database round-trip unchanged.
pub fn now() -> DateTime<Utc> {
    from_db_time(to_db_time(Utc::now()))
}
