use chrono::{DateTime, SecondsFormat, Utc};

pub const ARCHIVE_EXTENSION: &str = "zip";

/// Digits-only UTC timestamp, `YYYYMMDDHHMMSSmmm`.
pub fn key_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S%3f").to_string()
}

/// Object key for an archived submission: `<recipient>/<timestamp>.zip`.
/// The recipient id is used verbatim.
///
/// Two submissions for the same recipient inside one millisecond map to the
/// same key and the later write replaces the earlier one.
pub fn submission_object_key(recipient_id: &str, at: DateTime<Utc>) -> String {
    format!("{recipient_id}/{}.{ARCHIVE_EXTENSION}", key_timestamp(at))
}

/// RFC 3339 instant used for audit timestamps, millisecond precision.
pub fn audit_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
