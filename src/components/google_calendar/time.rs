use super::models::{BusyInterval, CalendarEvent, EventTime};
use crate::utils::time::{clock_24, spoken_clock};
use chrono::DateTime;
use chrono_tz::Tz;

/// Start of a timed event in the reference timezone, `None` for all-day events
pub fn local_start(event: &CalendarEvent, tz: Tz) -> Option<DateTime<Tz>> {
    match &event.start {
        EventTime::DateTime(dt) => Some(dt.with_timezone(&tz)),
        EventTime::Date(_) => None,
    }
}

/// 24-hour start time of a timed event, e.g. "09:30"
pub fn start_label(event: &CalendarEvent, tz: Tz) -> Option<String> {
    local_start(event, tz).map(|dt| clock_24(&dt))
}

/// Busy interval as spoken local times, e.g. ("02:30 PM", "03:30 PM")
pub fn busy_window(interval: &BusyInterval, tz: Tz) -> (String, String) {
    let start = interval.start.with_timezone(&tz).naive_local();
    let end = interval.end.with_timezone(&tz).naive_local();
    (spoken_clock(&start), spoken_clock(&end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::America::Los_Angeles;

    fn timed(rfc3339: &str) -> CalendarEvent {
        CalendarEvent {
            id: "1".to_string(),
            summary: "Sync".to_string(),
            start: EventTime::DateTime(DateTime::parse_from_rfc3339(rfc3339).unwrap()),
            end: None,
            html_link: None,
        }
    }

    #[test]
    fn test_start_label_uses_reference_timezone() {
        // Same instant, reported in UTC by the calendar
        let event = timed("2024-06-01T16:30:00Z");
        assert_eq!(start_label(&event, Los_Angeles).as_deref(), Some("09:30"));

        let event = timed("2024-06-01T09:30:00-07:00");
        assert_eq!(start_label(&event, Los_Angeles).as_deref(), Some("09:30"));
    }

    #[test]
    fn test_all_day_has_no_start_label() {
        let event = CalendarEvent {
            start: EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            ..timed("2024-06-01T00:00:00Z")
        };

        assert!(local_start(&event, Los_Angeles).is_none());
        assert!(start_label(&event, Los_Angeles).is_none());
    }

    #[test]
    fn test_busy_window() {
        let interval = BusyInterval {
            start: Utc.with_ymd_and_hms(2024, 6, 1, 21, 30, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 1, 22, 30, 0).unwrap(),
        };
        let (start, end) = busy_window(&interval, Los_Angeles);
        assert_eq!(start, "02:30 PM");
        assert_eq!(end, "03:30 PM");
    }
}
