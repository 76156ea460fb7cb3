//! Repository modules: one per table, associated functions over a borrowed
//! connection.

mod detections;
mod keywords;
mod messages;
mod suggestions;

pub use detections::DetectionsRepo;
pub use keywords::KeywordsRepo;
pub use messages::MessagesRepo;
pub use suggestions::SuggestionsRepo;

use chrono::{DateTime, Utc};

/// Parse a datetime from its stored form, tolerating both RFC3339 and the
/// bare SQLite `datetime('now')` format.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_datetime("2026-08-01T12:00:00+00:00");
        assert_eq!(dt.to_rfc3339(), "2026-08-01T12:00:00+00:00");
    }

    #[test]
    fn parses_sqlite_format() {
        let dt = parse_datetime("2026-08-01 12:00:00");
        assert_eq!(dt.to_rfc3339(), "2026-08-01T12:00:00+00:00");
    }
}
