//! Lazy event pagination.
//!
//! [`EventPager`] walks an event listing one provider page at a time. Each
//! call to [`EventPager::next_page`] issues exactly one request; the pager is
//! exhausted once a page arrives without a continuation cursor.

use calrename_core::TimeWindow;
use tracing::debug;

use crate::error::ProviderResult;
use crate::event::CalendarEvent;
use crate::provider::CalendarProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    First,
    Next(String),
    Done,
}

/// Iterates over the pages of an event listing.
///
/// Not restartable: once exhausted (or after an error) it yields nothing.
pub struct EventPager<'a> {
    provider: &'a dyn CalendarProvider,
    calendar_id: &'a str,
    window: &'a TimeWindow,
    cursor: Cursor,
    pages_fetched: usize,
}

impl<'a> EventPager<'a> {
    /// Creates a pager over `calendar_id` restricted to `window`.
    pub fn new(
        provider: &'a dyn CalendarProvider,
        calendar_id: &'a str,
        window: &'a TimeWindow,
    ) -> Self {
        Self {
            provider,
            calendar_id,
            window,
            cursor: Cursor::First,
            pages_fetched: 0,
        }
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` when the listing is exhausted.
    pub async fn next_page(&mut self) -> ProviderResult<Option<Vec<CalendarEvent>>> {
        let token = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return Ok(None),
            Cursor::First => None,
            Cursor::Next(token) => Some(token),
        };

        let page = self
            .provider
            .list_events(self.calendar_id, self.window, token.as_deref())
            .await?;

        self.pages_fetched += 1;
        debug!(
            "fetched page {} of {} ({} events)",
            self.pages_fetched,
            self.calendar_id,
            page.events.len()
        );

        if let Some(next) = page.next_page_token {
            self.cursor = Cursor::Next(next);
        }
        Ok(Some(page.events))
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns true once no further request will be made.
    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Done
    }
}
