//! Free-slot search.
//!
//! The search is a dense enumeration: inside every free gap of the window it
//! reports each start time one minute apart, not just the earliest start per
//! gap. Cost grows with the number of minutes in the window, which is fine for
//! a single day.

use super::Event;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Longest duration that can fit in a single-day window.
const MINUTES_PER_DAY: i64 = 24 * 60;

/// A free interval of exactly the requested duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last second of `date`, the inclusive end of every search window.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::seconds(86_399)
}

/// Enumerate every slot of `duration_minutes` between `window_start` and
/// `window_end`, stepping one minute at a time through each gap.
///
/// `events` must be sorted ascending by start time. A gap runs from the
/// cursor to the next event's start; after each event the cursor moves to
/// `max(cursor, event end)`.
pub fn find_slots(
    events: &[Event],
    duration_minutes: i64,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Vec<Slot> {
    if duration_minutes <= 0 || duration_minutes > MINUTES_PER_DAY {
        return Vec::new();
    }
    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(1);

    let mut slots = Vec::new();
    let mut cursor = window_start;

    for event in events {
        let gap_end = event.start_time().min(window_end);
        let mut start = cursor;
        while start + duration <= gap_end {
            slots.push(Slot { start, end: start + duration });
            start += step;
        }
        cursor = cursor.max(event.end_time());
    }

    while cursor + duration <= window_end {
        slots.push(Slot { start: cursor, end: cursor + duration });
        cursor += step;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn event(title: &str, start: &str, end: &str) -> Event {
        Event::new(title, at(start), at(end)).unwrap()
    }

    #[test]
    fn test_empty_day_enumerates_every_minute() {
        let slots = find_slots(&[], 30, start_of_day(day()), end_of_day(day()));

        assert_eq!(slots[0], Slot { start: at("2024-01-10 00:00"), end: at("2024-01-10 00:30") });
        assert_eq!(slots[1], Slot { start: at("2024-01-10 00:01"), end: at("2024-01-10 00:31") });
        // Last start is 23:29, since 23:30 + 30m passes 23:59:59.
        assert_eq!(slots.last().unwrap().start, at("2024-01-10 23:29"));
        assert_eq!(slots.len(), 1410);
    }

    #[test]
    fn test_gaps_between_events() {
        let events = vec![
            event("Morning", "2024-01-10 00:30", "2024-01-10 23:00"),
            event("Late", "2024-01-10 23:10", "2024-01-10 23:50"),
        ];
        let slots = find_slots(&events, 10, start_of_day(day()), end_of_day(day()));
        let starts: Vec<_> = slots.iter().map(|s| s.start.format("%H:%M").to_string()).collect();

        let mut expected: Vec<String> = (0..=20).map(|m| format!("00:{m:02}")).collect();
        expected.push("23:00".to_string());
        assert_eq!(starts, expected);
    }

    #[test]
    fn test_slots_never_overlap_events() {
        let events = vec![
            event("Standup", "2024-01-10 09:00", "2024-01-10 09:30"),
            event("Lunch", "2024-01-10 12:00", "2024-01-10 13:00"),
            event("Review", "2024-01-10 13:00", "2024-01-10 14:15"),
        ];
        let slots = find_slots(&events, 45, start_of_day(day()), end_of_day(day()));

        assert!(!slots.is_empty());
        for slot in &slots {
            assert_eq!(slot.duration_minutes(), 45);
            for e in &events {
                assert!(!e.overlaps(slot.start, slot.end), "{slot:?} overlaps {e}");
            }
        }
        assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_window_starting_mid_event() {
        let events = vec![event("Standup", "2024-01-10 09:00", "2024-01-10 09:30")];
        let now = NaiveDateTime::parse_from_str("2024-01-10 09:10:30", "%Y-%m-%d %H:%M:%S").unwrap();
        let slots = find_slots(&events, 15, now, end_of_day(day()));

        assert_eq!(slots[0].start, at("2024-01-10 09:30"));
        assert_eq!(slots[1].start, at("2024-01-10 09:31"));
    }

    #[test]
    fn test_window_start_keeps_seconds() {
        let now = NaiveDateTime::parse_from_str("2024-01-10 22:00:30", "%Y-%m-%d %H:%M:%S").unwrap();
        let slots = find_slots(&[], 60, now, end_of_day(day()));

        assert_eq!(slots[0].start, now);
        assert_eq!(slots[1].start, now + Duration::minutes(1));
        // 22:59:30 + 60m = 23:59:30 fits; 23:00:30 + 60m does not.
        assert_eq!(slots.len(), 60);
    }

    #[test]
    fn test_no_slot_fits() {
        let events = vec![event("All day", "2024-01-10 00:10", "2024-01-10 23:55")];
        assert!(find_slots(&events, 30, start_of_day(day()), end_of_day(day())).is_empty());
        assert!(find_slots(&[], 0, start_of_day(day()), end_of_day(day())).is_empty());
        assert!(find_slots(&[], -5, start_of_day(day()), end_of_day(day())).is_empty());
        assert!(find_slots(&[], 24 * 60, start_of_day(day()), end_of_day(day())).is_empty());
    }
}
