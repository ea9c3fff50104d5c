use super::models::{
    ApiEvent, BusyInterval, CalendarEvent, EventBody, EventListResponse, EventPage, EventQuery,
    FreeBusyItem, FreeBusyRequest, FreeBusyResponse, NewEvent,
};
use super::token::TokenManager;
use super::CalendarService;
use crate::error::{auth_error, google_calendar_error, SkillResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Google Calendar v3 REST client
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    token_manager: TokenManager,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, token_manager: TokenManager, base_url: &str) -> Self {
        Self {
            client,
            token_manager,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build an API URL, each segment is percent-encoded
    fn url(&self, segments: &[&str]) -> SkillResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn bearer(&self) -> SkillResult<String> {
        let token = self.token_manager.get_token().await?;
        Ok(format!("Bearer {}", token))
    }

    /// Turn non-success statuses into errors
    async fn check_status(response: Response, action: &str) -> SkillResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => auth_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )),
            StatusCode::NOT_FOUND => google_calendar_error(&format!(
                "Failed to {}: not found - {}",
                action, error_body
            )),
            _ => google_calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )),
        })
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, action: &str) -> SkillResult<T> {
        response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse {} response: {}", action, e))
        })
    }
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> SkillResult<EventPage> {
        let mut url = self.url(&["calendars", calendar_id, "events"])?;
        {
            let mut params = url.query_pairs_mut();
            if query.expand_recurring {
                params.append_pair("singleEvents", "true");
                params.append_pair("orderBy", "startTime");
            }
            if let Some(time_min) = query.time_min {
                params.append_pair("timeMin", &rfc3339(time_min));
            }
            if let Some(time_max) = query.time_max {
                params.append_pair("timeMax", &rfc3339(time_max));
            }
            if let Some(token) = page_token {
                params.append_pair("pageToken", token);
            }
        }

        debug!("Listing events: {}", url);
        let response = self
            .client
            .get(url)
            .header("Authorization", self.bearer().await?)
            .send()
            .await?;

        let response = Self::check_status(response, "fetch events").await?;
        let list: EventListResponse = Self::parse_json(response, "events").await?;

        let items = list
            .items
            .into_iter()
            .map(CalendarEvent::from_api)
            .collect::<SkillResult<Vec<_>>>()?;

        Ok(EventPage {
            items,
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> SkillResult<CalendarEvent> {
        let url = self.url(&["calendars", calendar_id, "events"])?;
        let body = EventBody::from(event);

        debug!("Inserting event '{}' at {}", event.summary, event.start);
        let response = self
            .client
            .post(url)
            .header("Authorization", self.bearer().await?)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response, "insert event").await?;
        let created: ApiEvent = Self::parse_json(response, "insert").await?;
        CalendarEvent::from_api(created)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> SkillResult<()> {
        let url = self.url(&["calendars", calendar_id, "events", event_id])?;

        debug!("Deleting event {}", event_id);
        let response = self
            .client
            .delete(url)
            .header("Authorization", self.bearer().await?)
            .send()
            .await?;

        // Delete answers 204 No Content
        Self::check_status(response, "delete event").await?;
        Ok(())
    }

    async fn query_free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> SkillResult<Vec<BusyInterval>> {
        let url = self.url(&["freeBusy"])?;
        let body = FreeBusyRequest {
            time_min: rfc3339(time_min),
            time_max: rfc3339(time_max),
            items: vec![FreeBusyItem {
                id: calendar_id.to_string(),
            }],
        };

        debug!("Querying free/busy {} - {}", body.time_min, body.time_max);
        let response = self
            .client
            .post(url)
            .header("Authorization", self.bearer().await?)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response, "query free/busy").await?;
        let free_busy: FreeBusyResponse = Self::parse_json(response, "free/busy").await?;
        free_busy.busy_intervals(calendar_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;
    use wiremock::matchers::{
        body_partial_json, header, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CALENDAR: &str = "team@group.calendar.google.com";

    fn client_for(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new(Client::new(), TokenManager::fixed("test_token"), &server.uri())
    }

    #[tokio::test]
    async fn test_list_events_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/team@group.calendar.google.com/events"))
            .and(header("Authorization", "Bearer test_token"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("timeMin", "2024-06-01T07:00:00Z"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "event1",
                        "summary": "Sync",
                        "start": {"dateTime": "2024-06-01T09:30:00-07:00"},
                        "end": {"dateTime": "2024-06-01T10:00:00-07:00"}
                    }
                ],
                "nextPageToken": "page-3"
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let time_min = Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap();
        let time_max = Utc.with_ymd_and_hms(2024, 6, 2, 6, 59, 0).unwrap();

        let page = client
            .list_events(CALENDAR, &EventQuery::between(time_min, time_max), Some("page-2"))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].summary, "Sync");
        assert_eq!(page.next_page_token.as_deref(), Some("page-3"));
    }

    #[tokio::test]
    async fn test_list_series_without_expansion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/team@group.calendar.google.com/events"))
            .and(query_param_is_missing("singleEvents"))
            .and(query_param_is_missing("orderBy"))
            .and(query_param_is_missing("timeMin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "standup-series",
                        "summary": "Standup",
                        "start": {"dateTime": "2019-01-07T09:00:00-08:00"},
                        "recurrence": ["RRULE:FREQ=DAILY"]
                    }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let page = client_for(&mock_server)
            .list_events(CALENDAR, &EventQuery::series(), None)
            .await
            .unwrap();

        assert_eq!(page.items[0].id, "standup-series");
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_insert_event_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/team@group.calendar.google.com/events"))
            .and(body_partial_json(serde_json::json!({
                "summary": "Standup",
                "start": {"dateTime": "2024-06-01T14:00:00-07:00", "timeZone": "America/Los_Angeles"},
                "reminders": {"useDefault": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "created1",
                "summary": "Standup",
                "start": {"dateTime": "2024-06-01T14:00:00-07:00"},
                "end": {"dateTime": "2024-06-01T15:00:00-07:00"},
                "htmlLink": "https://calendar.google.com/event?eid=created1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let event = NewEvent {
            summary: "Standup".to_string(),
            description: "Automated Event Description".to_string(),
            start: Los_Angeles.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap(),
            end: Los_Angeles.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap(),
            time_zone: Los_Angeles,
            reminder_minutes_before: 30,
        };

        let created = client_for(&mock_server).insert_event(CALENDAR, &event).await.unwrap();
        assert_eq!(created.id, "created1");
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/team@group.calendar.google.com/events/event123"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).delete_event(CALENDAR, "event123").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_free_busy() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/freeBusy"))
            .and(body_partial_json(serde_json::json!({
                "timeMin": "2024-06-01T21:00:00Z",
                "timeMax": "2024-06-01T22:00:00Z",
                "items": [{"id": CALENDAR}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "calendars": {
                    CALENDAR: {
                        "busy": [{"start": "2024-06-01T21:30:00Z", "end": "2024-06-01T22:30:00Z"}]
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let busy = client_for(&mock_server)
            .query_free_busy(
                CALENDAR,
                Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(busy.len(), 1);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/team@group.calendar.google.com/events/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        let err = client.delete_event(CALENDAR, "gone").await.unwrap_err();
        assert!(err.to_string().contains("not found"));

        let err = client
            .list_events(CALENDAR, &EventQuery::series(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Auth(_)));
    }
}
