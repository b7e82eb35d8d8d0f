//! Google Calendar API client.
//!
//! This module provides a low-level HTTP client for the Google Calendar API,
//! handling authentication headers, request building, and response parsing.

use std::time::Duration;

use calrename_core::TimeWindow;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::event::CalendarEvent;
use crate::provider::EventPage;

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    api_base: String,
}

impl GoogleCalendarClient {
    /// Creates a new Google Calendar client with the given access token.
    pub fn new(
        access_token: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Updates the access token (after refresh).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Lists all calendars, following the calendar list's own pagination.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarListEntry>> {
        let url = format!("{}/users/me/calendarList", self.api_base);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http_client.get(&url).bearer_auth(&self.access_token);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(map_send_error)?;
            let list: CalendarListResponse = parse_response(response, "calendar list").await?;

            calendars.extend(list.items);
            match list.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("listed {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Fetches a single page of events, expanding recurring events.
    pub async fn list_events_page(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> ProviderResult<EventPage> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", window.start_rfc3339()),
                ("timeMax", window.end_rfc3339()),
                ("singleEvents", "true".to_string()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(map_send_error)?;
        let list: EventListResponse = parse_response(response, "event list").await?;

        Ok(EventPage::new(list.items, list.next_page_token))
    }

    /// Replaces an event with the given payload.
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> ProviderResult<CalendarEvent> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&event.id)
        );

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await
            .map_err(map_send_error)?;

        parse_response(response, "event update").await
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Maps the HTTP status to an error, or parses the JSON body.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> ProviderResult<T> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(ProviderError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("{} failed ({}): {}", what, status, body);
        return Err(match status {
            reqwest::StatusCode::UNAUTHORIZED => ProviderError::authentication(message),
            reqwest::StatusCode::FORBIDDEN => ProviderError::authorization(message),
            reqwest::StatusCode::NOT_FOUND => ProviderError::not_found(message),
            reqwest::StatusCode::BAD_REQUEST => ProviderError::bad_request(message),
            _ => ProviderError::server(message),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse {} response: {}", what, e))
    })
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
    next_page_token: Option<String>,
}

/// Response from the calendarList endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
    next_page_token: Option<String>,
}

/// A calendar from the calendar list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// The calendar ID.
    pub id: String,
    /// The calendar summary (name).
    #[serde(default)]
    pub summary: String,
    /// Whether this is the primary calendar.
    #[serde(default)]
    pub primary: bool,
    /// The calendar timezone.
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new(
            "test-token",
            server.uri(),
            Duration::from_secs(5),
            "calrename-test",
        )
        .unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::from_dates(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn parse_event_list_response() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {
                    "id": "event1",
                    "summary": "Test Meeting",
                    "start": { "dateTime": "2024-03-15T10:00:00Z" },
                    "end": { "dateTime": "2024-03-15T11:00:00Z" },
                    "status": "confirmed"
                }
            ],
            "nextPageToken": "abc"
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].title(), Some("Test Meeting"));
        assert_eq!(response.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn parse_calendar_list() {
        let json = r#"{
            "items": [
                {
                    "id": "primary",
                    "summary": "My Calendar",
                    "primary": true,
                    "timeZone": "America/New_York"
                },
                {
                    "id": "work@example.com",
                    "summary": "Work Calendar"
                }
            ]
        }"#;

        let response: CalendarListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 2);
        assert!(response.items[0].primary);
        assert!(!response.items[1].primary);
        assert!(response.next_page_token.is_none());
    }

    #[tokio::test]
    async fn list_calendars_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "personal-id", "summary": "Personal" }]
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "work-id", "summary": "Work" }],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let calendars = client(&server).list_calendars().await.unwrap();
        let names: Vec<_> = calendars.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(names, vec!["Work", "Personal"]);
    }

    #[tokio::test]
    async fn list_events_page_sends_window_and_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/team%40example.com/events"))
            .and(query_param("timeMin", "2021-01-01T00:00:00Z"))
            .and(query_param("timeMax", "2024-03-15T00:00:00Z"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("pageToken", "cursor-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "e4", "summary": "Four" },
                    { "id": "e5", "summary": "Five" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server)
            .list_events_page("team@example.com", &window(), Some("cursor-1"))
            .await
            .unwrap();

        assert_eq!(page.events.len(), 2);
        assert_eq!(page.events[1].id, "e5");
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn update_event_puts_full_payload() {
        let server = MockServer::start().await;
        let payload = json!({
            "id": "evt1",
            "summary": "Weekly Standup 1:1",
            "start": { "dateTime": "2024-03-15T10:00:00Z" },
            "end": { "dateTime": "2024-03-15T10:30:00Z" },
            "location": "Room 4"
        });
        Mock::given(method("PUT"))
            .and(path("/calendars/primary/events/evt1"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .expect(1)
            .mount(&server)
            .await;

        let event: CalendarEvent = serde_json::from_value(payload.clone()).unwrap();
        let stored = client(&server)
            .update_event("primary", &event)
            .await
            .unwrap();
        assert_eq!(stored.title(), Some("Weekly Standup 1:1"));
    }

    #[tokio::test]
    async fn http_errors_are_classified() {
        let cases: [(u16, ProviderErrorCode); 6] = [
            (401, ProviderErrorCode::AuthenticationFailed),
            (403, ProviderErrorCode::AuthorizationFailed),
            (404, ProviderErrorCode::NotFound),
            (400, ProviderErrorCode::BadRequest),
            (429, ProviderErrorCode::RateLimited),
            (503, ProviderErrorCode::ServerError),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let err = client(&server)
                .list_events_page("primary", &window(), None)
                .await
                .unwrap_err();
            assert_eq!(err.code(), expected, "status {}", status);
        }
    }

    #[tokio::test]
    async fn rate_limit_mentions_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&server)
            .await;

        let err = client(&server).list_calendars().await.unwrap_err();
        assert!(err.message().contains("retry after 30 seconds"));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_events_page("primary", &window(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }
}
