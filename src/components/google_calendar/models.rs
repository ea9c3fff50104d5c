//! Calendar event types and the Calendar v3 wire format.

use crate::error::{google_calendar_error, SkillResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Description stored on every event booked by voice
pub const EVENT_DESCRIPTION: &str = "Automated Event Description";
/// Popup reminder lead time for booked events
pub const REMINDER_MINUTES_BEFORE: u32 = 30;

/// Calendar event as seen by the skill
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub html_link: Option<String>,
}

/// Event time - either a specific instant or an all-day date
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

/// Event to be inserted, `time_zone` is the label stored with it
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub time_zone: Tz,
    pub reminder_minutes_before: u32,
}

/// Parameters of an event listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
    /// List each occurrence of a recurring event, ordered by start time.
    /// When unset a recurring event is listed once, as its series.
    pub expand_recurring: bool,
}

impl EventQuery {
    /// Every standalone event and recurring series on the calendar
    pub fn series() -> Self {
        Self::default()
    }

    /// Occurrences overlapping a time range, in start order
    pub fn between(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self {
            time_min: Some(time_min),
            time_max: Some(time_max),
            expand_recurring: true,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
}

/// Interval reported busy by a free/busy query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// API wire types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

/// Body of an events.insert call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    pub description: String,
    pub start: ApiEventTime,
    pub end: ApiEventTime,
    pub reminders: Reminders,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Serialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    pub time_min: String,
    pub time_max: String,
    pub items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<ApiTimePeriod>,
    #[serde(default)]
    pub errors: Vec<FreeBusyError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTimePeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyError {
    pub domain: Option<String>,
    pub reason: Option<String>,
}

impl From<&NewEvent> for EventBody {
    fn from(event: &NewEvent) -> Self {
        let time_zone = event.time_zone.name().to_string();
        // The offset pins down wall-clock times that occur twice
        let wall_clock = |t: &DateTime<Tz>| ApiEventTime {
            date_time: Some(t.format("%Y-%m-%dT%H:%M:%S%:z").to_string()),
            date: None,
            time_zone: Some(time_zone.clone()),
        };

        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: wall_clock(&event.start),
            end: wall_clock(&event.end),
            reminders: Reminders {
                use_default: false,
                overrides: vec![ReminderOverride {
                    method: "popup".to_string(),
                    minutes: event.reminder_minutes_before,
                }],
            },
        }
    }
}

impl CalendarEvent {
    /// Convert an API event, events without a usable start are rejected
    pub fn from_api(api: ApiEvent) -> SkillResult<Self> {
        let start = api
            .start
            .as_ref()
            .and_then(parse_event_time)
            .ok_or_else(|| {
                google_calendar_error(&format!("Event {} has no readable start time", api.id))
            })?;
        let end = api.end.as_ref().and_then(parse_event_time);

        Ok(Self {
            id: api.id,
            summary: api.summary.unwrap_or_default(),
            start,
            end,
            html_link: api.html_link,
        })
    }
}

impl FreeBusyResponse {
    /// Busy intervals of one calendar, per-calendar errors become failures
    pub fn busy_intervals(mut self, calendar_id: &str) -> SkillResult<Vec<BusyInterval>> {
        let calendar = self.calendars.remove(calendar_id).ok_or_else(|| {
            google_calendar_error(&format!("Free/busy response did not include {}", calendar_id))
        })?;

        if let Some(error) = calendar.errors.first() {
            return Err(google_calendar_error(&format!(
                "Free/busy query failed: {} ({})",
                error.reason.as_deref().unwrap_or("unknown"),
                error.domain.as_deref().unwrap_or("unknown")
            )));
        }

        calendar
            .busy
            .iter()
            .map(|period| {
                Ok(BusyInterval {
                    start: parse_instant(&period.start)?,
                    end: parse_instant(&period.end)?,
                })
            })
            .collect()
    }
}

fn parse_event_time(api: &ApiEventTime) -> Option<EventTime> {
    if let Some(dt) = &api.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt) {
            return Some(EventTime::DateTime(dt));
        }
    }
    if let Some(date) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return Some(EventTime::Date(date));
        }
    }
    None
}

fn parse_instant(value: &str) -> SkillResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| google_calendar_error(&format!("Failed to parse time {}: {}", value, e)))
}
