mod client;
pub mod models;
pub mod pager;
pub mod time;
pub mod token;

pub use client::GoogleCalendarClient;
pub use models::{BusyInterval, CalendarEvent, EventPage, EventQuery, EventTime, NewEvent};
pub use token::TokenManager;

use crate::error::SkillResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Operations the skill needs from the remote calendar
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Fetch one page of events ordered by start time
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> SkillResult<EventPage>;

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> SkillResult<CalendarEvent>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SkillResult<()>;

    /// Busy intervals of the calendar inside `[time_min, time_max]`
    async fn query_free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> SkillResult<Vec<BusyInterval>>;
}
