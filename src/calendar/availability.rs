//! Room-availability resolution.
//!
//! Converts the raw event list for one room into a single busy/free verdict
//! under a fixed look-ahead horizon. Pure computation: no shared state, safe
//! to invoke concurrently, idempotent for identical inputs.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::event::{EventTimes, format_instant, parse_event_instant};

/// Look-ahead window bounding which upcoming events are considered relevant.
pub fn lookahead_horizon() -> Duration {
    Duration::hours(2)
}

/// The availability decision for one resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_available: bool,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Resolves the room's availability at `now`.
///
/// Events are scanned in supplied order; the first event covering `now` wins
/// and ends the scan. Otherwise the earliest event starting inside the
/// horizon becomes the "next event" and the verdict anchors a fixed-width
/// countdown window behind its start: `from = start - horizon`, not `now`.
/// The constant interval length keeps the consuming progress-bar renderer
/// linear, so this contract must hold exactly.
///
/// An event whose `start` or `end` fails to normalize is skipped; the rest of
/// the list still resolves.
pub fn resolve(events: &[EventTimes], now: DateTime<Utc>, horizon: Duration) -> Verdict {
    let window_end = now + horizon;
    let mut next_start: Option<DateTime<Utc>> = None;

    for event in events {
        let Some(start) = parse_event_instant(&event.start) else {
            tracing::warn!("Failed to parse start time, Raw Start: {}", event.start);
            continue;
        };
        let Some(end) = parse_event_instant(&event.end) else {
            tracing::warn!("Failed to parse end time, Raw End: {}", event.end);
            continue;
        };

        if start <= now && now < end {
            tracing::info!("Room is currently occupied.");
            return Verdict {
                is_available: false,
                from: Some(start),
                to: Some(end),
            };
        }

        if now < start && start < window_end && next_start.is_none_or(|best| start < best) {
            next_start = Some(start);
        }
    }

    match next_start {
        Some(start) => Verdict {
            is_available: true,
            from: Some(start - horizon),
            to: Some(start),
        },
        None => Verdict {
            is_available: true,
            from: None,
            to: None,
        },
    }
}

/// Wire projection of a [`Verdict`]; absent bounds serialize as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomAvailability {
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
    #[serde(rename = "FromTime")]
    pub from_time: String,
    #[serde(rename = "ToTime")]
    pub to_time: String,
}

impl From<Verdict> for RoomAvailability {
    fn from(verdict: Verdict) -> Self {
        Self {
            is_available: verdict.is_available,
            from_time: verdict.from.map(format_instant).unwrap_or_default(),
            to_time: verdict.to.map(format_instant).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>) -> EventTimes {
        EventTimes {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        }
    }

    fn minutes(n: i64) -> Duration {
        Duration::minutes(n)
    }

    #[test]
    fn covering_event_makes_room_busy_with_its_bounds() {
        let start = now() - minutes(10);
        let end = now() + minutes(20);
        let events = vec![event(start, end)];

        let verdict = resolve(&events, now(), lookahead_horizon());

        assert_eq!(
            verdict,
            Verdict {
                is_available: false,
                from: Some(start),
                to: Some(end),
            }
        );
    }

    #[test]
    fn upcoming_event_anchors_countdown_a_full_horizon_behind_its_start() {
        let start = now() + minutes(30);
        let events = vec![event(start, now() + minutes(90))];

        let verdict = resolve(&events, now(), lookahead_horizon());

        // from = start - horizon = now - 90m, deliberately not `now`.
        assert_eq!(
            verdict,
            Verdict {
                is_available: true,
                from: Some(now() - minutes(90)),
                to: Some(start),
            }
        );
    }

    #[test]
    fn empty_event_list_resolves_to_unbounded_availability() {
        let verdict = resolve(&[], now(), lookahead_horizon());

        assert_eq!(
            verdict,
            Verdict {
                is_available: true,
                from: None,
                to: None,
            }
        );
    }

    #[test]
    fn event_beyond_horizon_is_ignored() {
        let events = vec![event(now() + minutes(150), now() + minutes(210))];

        let verdict = resolve(&events, now(), lookahead_horizon());

        assert!(verdict.is_available);
        assert_eq!(verdict.to, None);
    }

    #[test]
    fn covering_event_wins_over_upcoming_events() {
        let busy_start = now() - minutes(5);
        let busy_end = now() + minutes(25);
        let events = vec![
            event(now() + minutes(40), now() + minutes(60)),
            event(busy_start, busy_end),
            event(now() + minutes(10), now() + minutes(20)),
        ];

        let verdict = resolve(&events, now(), lookahead_horizon());

        assert_eq!(verdict.is_available, false);
        assert_eq!(verdict.from, Some(busy_start));
        assert_eq!(verdict.to, Some(busy_end));
    }

    #[test]
    fn first_covering_event_in_supplied_order_wins() {
        let first_start = now() - minutes(30);
        let first_end = now() + minutes(30);
        let events = vec![
            event(first_start, first_end),
            event(now() - minutes(10), now() + minutes(50)),
        ];

        let verdict = resolve(&events, now(), lookahead_horizon());

        assert_eq!(verdict.from, Some(first_start));
        assert_eq!(verdict.to, Some(first_end));
    }

    #[test]
    fn earliest_upcoming_start_wins_regardless_of_supplied_order() {
        let earlier = now() + minutes(30);
        let events = vec![
            event(now() + minutes(60), now() + minutes(75)),
            event(earlier, now() + minutes(45)),
        ];

        let verdict = resolve(&events, now(), lookahead_horizon());

        assert_eq!(verdict.to, Some(earlier));
    }

    #[test]
    fn malformed_event_is_skipped_without_poisoning_resolution() {
        let start = now() + minutes(30);
        let events = vec![
            EventTimes {
                start: "garbage".to_string(),
                end: "2025-03-10T13:00:00Z".to_string(),
            },
            event(start, now() + minutes(60)),
        ];

        let verdict = resolve(&events, now(), lookahead_horizon());

        assert_eq!(verdict.to, Some(start));
    }

    #[test]
    fn resolve_is_idempotent_for_identical_inputs() {
        let events = vec![event(now() + minutes(30), now() + minutes(90))];

        let first = resolve(&events, now(), lookahead_horizon());
        let second = resolve(&events, now(), lookahead_horizon());

        assert_eq!(first, second);
    }

    #[test]
    fn single_upcoming_event_scenario() {
        // events = [{start: now+30m, end: now+90m}], horizon = 2h
        let events = vec![event(now() + minutes(30), now() + minutes(90))];

        let verdict = resolve(&events, now(), Duration::hours(2));

        assert_eq!(verdict.is_available, true);
        assert_eq!(verdict.to, Some(now() + minutes(30)));
        assert_eq!(verdict.from, Some(now() - minutes(90)));
    }

    #[test]
    fn active_meeting_scenario() {
        // events = [{start: now-10m, end: now+20m}]
        let events = vec![event(now() - minutes(10), now() + minutes(20))];

        let verdict = resolve(&events, now(), Duration::hours(2));

        assert_eq!(verdict.is_available, false);
        assert_eq!(verdict.from, Some(now() - minutes(10)));
        assert_eq!(verdict.to, Some(now() + minutes(20)));
    }

    #[test]
    fn busy_verdict_serializes_both_bounds() {
        let verdict = Verdict {
            is_available: false,
            from: Some(now() - minutes(10)),
            to: Some(now() + minutes(20)),
        };

        let availability = RoomAvailability::from(verdict);

        assert_eq!(availability.from_time, "2025-03-10T11:50:00+00:00");
        assert_eq!(availability.to_time, "2025-03-10T12:20:00+00:00");
    }

    #[test]
    fn unbounded_verdict_serializes_empty_strings() {
        let verdict = Verdict {
            is_available: true,
            from: None,
            to: None,
        };

        let availability = RoomAvailability::from(verdict);

        assert_eq!(availability.from_time, "");
        assert_eq!(availability.to_time, "");
    }

    #[test]
    fn wire_field_names_match_the_panel_contract() {
        let availability = RoomAvailability {
            is_available: true,
            from_time: String::new(),
            to_time: String::new(),
        };

        let json = serde_json::to_value(&availability).unwrap();

        assert!(json.get("isAvailable").is_some());
        assert!(json.get("FromTime").is_some());
        assert!(json.get("ToTime").is_some());
    }
}
