//! CalendarProvider trait definition.
//!
//! This module defines the [`CalendarProvider`] trait, the seam between the
//! rename pipeline and a calendar backend. The pipeline only needs three
//! operations: list calendars, list one page of events, and update an event.

use std::future::Future;
use std::pin::Pin;

use calrename_core::TimeWindow;

use crate::error::ProviderResult;
use crate::event::CalendarEvent;

/// Information about a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    /// Unique identifier for the calendar.
    pub id: String,
    /// Human-readable name of the calendar.
    pub name: String,
    /// Whether this is the primary calendar.
    pub is_primary: bool,
    /// The timezone of the calendar (IANA identifier).
    pub timezone: Option<String>,
}

impl CalendarInfo {
    /// Creates a new CalendarInfo with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_primary: false,
            timezone: None,
        }
    }

    /// Builder method to mark as primary.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    /// Builder method to set timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// One page of an event listing.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    /// Events on this page, in provider order.
    pub events: Vec<CalendarEvent>,
    /// Cursor for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl EventPage {
    /// Creates a page.
    pub fn new(events: Vec<CalendarEvent>, next_page_token: Option<String>) -> Self {
        Self {
            events,
            next_page_token,
        }
    }
}

/// A boxed future for trait methods.
///
/// Boxed futures keep [`CalendarProvider`] object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A calendar backend.
///
/// Implementations must be usable through `&dyn CalendarProvider`. Event
/// listings expand recurring series into single instances.
pub trait CalendarProvider: Send + Sync {
    /// Returns the provider name (e.g., "google:default").
    fn name(&self) -> &str;

    /// Lists every calendar visible to the authenticated identity.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>>;

    /// Fetches one page of events in `window` from `calendar_id`.
    ///
    /// `page_token` is the cursor returned by the previous page, or `None`
    /// for the first page.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: &'a TimeWindow,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<EventPage>>;

    /// Replaces an event with `event`, keyed by calendar ID and `event.id`.
    ///
    /// Returns the event as stored by the provider.
    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, ProviderResult<CalendarEvent>>;
}
