#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex};
use voice_calendar::components::google_calendar::{
    BusyInterval, CalendarEvent, CalendarService, EventPage, EventQuery, EventTime, NewEvent,
};
use voice_calendar::config::{Config, FileConfig};
use voice_calendar::error::{google_calendar_error, SkillResult};
use voice_calendar::skill::SkillContext;

pub const CALENDAR_ID: &str = "test-calendar@group.calendar.google.com";

/// Collaborator operations, used to pick which one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Insert,
    Delete,
    FreeBusy,
}

/// One recorded call against the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        query: EventQuery,
        page_token: Option<String>,
    },
    Insert(NewEvent),
    Delete(String),
    FreeBusy {
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    },
}

/// In-memory calendar that records every call.
///
/// Listings are served from `pages`, page N hands out the token "page-N+1"
/// while more pages remain.
#[derive(Default)]
pub struct MockCalendar {
    pages: Vec<Vec<CalendarEvent>>,
    busy: Vec<BusyInterval>,
    failing: Option<Operation>,
    failing_from_page: Option<usize>,
    calls: Mutex<Vec<Call>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, pages: Vec<Vec<CalendarEvent>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_busy(mut self, busy: Vec<BusyInterval>) -> Self {
        self.busy = busy;
        self
    }

    /// Make every call of one operation fail
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing = Some(operation);
        self
    }

    /// Make listings fail once they reach page `index`
    pub fn failing_from_page(mut self, index: usize) -> Self {
        self.failing_from_page = Some(index);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inserts(&self) -> Vec<NewEvent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Insert(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn list_calls(&self) -> Vec<(EventQuery, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List { query, page_token } => Some((query, page_token)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: Operation) -> SkillResult<()> {
        if self.failing == Some(operation) {
            return Err(google_calendar_error(&format!(
                "simulated {:?} failure",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarService for MockCalendar {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> SkillResult<EventPage> {
        assert_eq!(calendar_id, CALENDAR_ID);
        self.record(Call::List {
            query: query.clone(),
            page_token: page_token.map(str::to_string),
        });
        self.check(Operation::List)?;

        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| google_calendar_error("unknown page token"))?,
        };
        if self.failing_from_page.is_some_and(|from| index >= from) {
            return Err(google_calendar_error("simulated failure while paging"));
        }

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(EventPage {
            items,
            next_page_token,
        })
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> SkillResult<CalendarEvent> {
        assert_eq!(calendar_id, CALENDAR_ID);
        self.record(Call::Insert(event.clone()));
        self.check(Operation::Insert)?;

        Ok(CalendarEvent {
            id: "created-1".to_string(),
            summary: event.summary.clone(),
            start: EventTime::DateTime(event.start.fixed_offset()),
            end: None,
            html_link: Some("https://calendar.google.com/event?eid=created-1".to_string()),
        })
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SkillResult<()> {
        assert_eq!(calendar_id, CALENDAR_ID);
        self.record(Call::Delete(event_id.to_string()));
        self.check(Operation::Delete)
    }

    async fn query_free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> SkillResult<Vec<BusyInterval>> {
        assert_eq!(calendar_id, CALENDAR_ID);
        self.record(Call::FreeBusy { time_min, time_max });
        self.check(Operation::FreeBusy)?;
        Ok(self.busy.clone())
    }
}

pub fn timed_event(id: &str, summary: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventTime::DateTime(DateTime::parse_from_rfc3339(start).unwrap()),
        end: None,
        html_link: None,
    }
}

pub fn all_day_event(id: &str, summary: &str, date: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventTime::Date(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
        end: None,
        html_link: None,
    }
}

/// Configuration for tests, Los Angeles time and a static token
pub fn test_config(skill_id: Option<&str>) -> Config {
    let skill_id = skill_id.map(str::to_string);
    Config::from_sources(FileConfig::default(), move |key: &str| match key {
        "GOOGLE_CALENDAR_ID" => Some(CALENDAR_ID.to_string()),
        "GOOGLE_ACCESS_TOKEN" => Some("test-token".to_string()),
        "SKILL_ID" => skill_id.clone(),
        _ => None,
    })
    .unwrap()
}

pub fn context(calendar: Arc<MockCalendar>) -> SkillContext {
    SkillContext::new(Arc::new(test_config(None)), calendar)
}
