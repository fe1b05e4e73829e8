//! Repository layer: entity-scoped database operations.
//!
//! Every query that touches patients or analyses takes the caller's
//! `doctor_id` and filters on it; there is no unscoped accessor for them.

mod analysis;
mod patient;
mod session;
mod user;

pub use analysis::*;
pub use patient::*;
pub use session::*;
pub use user::*;

use chrono::{DateTime, Utc};

use super::DatabaseError;

/// Timestamps are stored as RFC 3339 strings in UTC.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_roundtrip_keeps_instant() {
        let now = Utc::now();
        let parsed = parse_timestamp("created_at", &format_timestamp(&now)).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn invalid_timestamp_reports_field() {
        let err = parse_timestamp("expires_at", "yesterday").unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidTimestamp { ref field, .. } if field == "expires_at"
        ));
    }
}
