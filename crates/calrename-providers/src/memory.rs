//! In-memory provider for tests.
//!
//! [`MemoryProvider`] serves a fixed list of calendars and a fixed sequence
//! of event pages, and records every call so tests can assert on how many
//! requests and writes a run issued.

use std::collections::HashMap;
use std::sync::Mutex;

use calrename_core::TimeWindow;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::event::CalendarEvent;
use crate::provider::{BoxFuture, CalendarInfo, CalendarProvider, EventPage};

/// A recorded `list_events` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub calendar_id: String,
    pub page_token: Option<String>,
}

/// A recorded `update_event` call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCall {
    pub calendar_id: String,
    pub event: CalendarEvent,
}

/// Calendar provider backed by in-memory fixtures.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    calendars: Vec<CalendarInfo>,
    pages: Vec<Vec<CalendarEvent>>,
    failing_updates: HashMap<String, ProviderErrorCode>,
    failing_page: Option<usize>,
    list_calls: Mutex<Vec<ListCall>>,
    updates: Mutex<Vec<UpdateCall>>,
}

impl MemoryProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a calendar.
    pub fn with_calendar(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.calendars.push(CalendarInfo::new(id, name));
        self
    }

    /// Appends a page of events. Pages are served in insertion order.
    pub fn with_page(mut self, events: Vec<CalendarEvent>) -> Self {
        self.pages.push(events);
        self
    }

    /// Makes `update_event` fail with `code` for the given event ID.
    pub fn failing_update(mut self, event_id: impl Into<String>, code: ProviderErrorCode) -> Self {
        self.failing_updates.insert(event_id.into(), code);
        self
    }

    /// Makes fetching the page at `index` fail with a network error.
    pub fn failing_page(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }

    /// Returns the recorded `list_events` calls.
    pub fn list_calls(&self) -> Vec<ListCall> {
        self.list_calls.lock().unwrap().clone()
    }

    /// Returns the recorded `update_event` calls.
    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().unwrap().clone()
    }

    /// Returns the number of `update_event` calls.
    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    fn page_index(page_token: Option<&str>) -> ProviderResult<usize> {
        match page_token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| ProviderError::bad_request(format!("unknown page token {}", token))),
        }
    }

    fn page(&self, calendar_id: &str, page_token: Option<&str>) -> ProviderResult<EventPage> {
        self.list_calls.lock().unwrap().push(ListCall {
            calendar_id: calendar_id.to_string(),
            page_token: page_token.map(String::from),
        });

        if !self.calendars.iter().any(|c| c.id == calendar_id) {
            return Err(ProviderError::not_found(format!(
                "calendar {} not found",
                calendar_id
            )));
        }

        let index = Self::page_index(page_token)?;
        if self.failing_page == Some(index) {
            return Err(ProviderError::network(format!("page {} unavailable", index)));
        }

        let events = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(EventPage::new(events, next_page_token))
    }

    fn update(&self, calendar_id: &str, event: &CalendarEvent) -> ProviderResult<CalendarEvent> {
        if let Some(&code) = self.failing_updates.get(&event.id) {
            return Err(ProviderError::new(
                code,
                format!("update of event {} rejected", event.id),
            ));
        }

        self.updates.lock().unwrap().push(UpdateCall {
            calendar_id: calendar_id.to_string(),
            event: event.clone(),
        });
        Ok(event.clone())
    }
}

impl CalendarProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        let calendars = self.calendars.clone();
        Box::pin(async move { Ok(calendars) })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        _window: &'a TimeWindow,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<EventPage>> {
        Box::pin(async move { self.page(calendar_id, page_token) })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, ProviderResult<CalendarEvent>> {
        Box::pin(async move { self.update(calendar_id, event) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_update_uses_configured_code_and_records_nothing() {
        let provider = MemoryProvider::new()
            .with_calendar("cal", "Work")
            .failing_update("bad", ProviderErrorCode::AuthenticationFailed);

        let err = provider
            .update_event("cal", &CalendarEvent::new("bad", "Title"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);

        provider
            .update_event("cal", &CalendarEvent::new("good", "Title"))
            .await
            .unwrap();
        assert_eq!(provider.update_count(), 1);
        assert_eq!(provider.updates()[0].event.id, "good");
    }
}
