use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed textual form used for every timestamp exchanged with the calendar
/// feed and returned to HTTP clients: `YYYY-MM-DDTHH:MM:SS±HH:MM`.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// One calendar event as the feed supplied it. The `start`/`end` strings are
/// kept raw; normalization happens per resolution call so a malformed instant
/// only costs that one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTimes {
    pub start: String,
    pub end: String,
}

/// Normalizes a serialized event time to an absolute instant.
///
/// The feed sometimes emits instants without a `Z`/offset marker; those are
/// treated as UTC. Returns `None` for anything that still fails to parse.
pub fn parse_event_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    let assumed_utc = format!("{raw}Z");
    DateTime::parse_from_rfc3339(&assumed_utc)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(WIRE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_instant_with_utc_marker() {
        let instant = parse_event_instant("2025-03-10T12:00:00Z").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn parses_instant_with_positive_offset() {
        let instant = parse_event_instant("2025-03-10T13:00:00+01:00").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn parses_instant_with_negative_offset() {
        let instant = parse_event_instant("2025-03-10T07:00:00-05:00").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn offsetless_instant_is_treated_as_utc() {
        let instant = parse_event_instant("2025-03-10T12:00:00").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn fractional_seconds_from_the_feed_are_accepted() {
        let instant = parse_event_instant("2025-03-10T12:00:00.0000000").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn malformed_instant_returns_none() {
        assert!(parse_event_instant("not-a-time").is_none());
        assert!(parse_event_instant("").is_none());
    }

    #[test]
    fn format_instant_carries_explicit_offset() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(format_instant(instant), "2025-03-10T12:00:00+00:00");
    }
}
