//! Calendar event type exchanged with providers.
//!
//! [`CalendarEvent`] models only what renaming needs: the identifier, the
//! title and the start time. Every other field the provider sends is kept
//! verbatim in [`CalendarEvent::extra`] so that an update writes the full
//! event back with only the title changed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The start of an event as the provider reports it.
///
/// Timed events carry `dateTime` (RFC3339), all-day events carry `date`
/// (`YYYY-MM-DD`). Values are kept as strings so they round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    /// All-day date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Timed start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// IANA time zone of `date_time`, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Any other provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventStart {
    /// Creates a timed start.
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            date_time: Some(value.into()),
            ..Self::default()
        }
    }

    /// Creates an all-day start.
    pub fn all_day(value: impl Into<String>) -> Self {
        Self {
            date: Some(value.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for EventStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => {
                write!(f, "{}", dt)?;
                if let Some(ref tz) = self.time_zone {
                    write!(f, " {}", tz)?;
                }
                Ok(())
            }
            (None, Some(date)) => write!(f, "{} (all day)", date),
            (None, None) => f.write_str("no start"),
        }
    }
}

/// A single calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Provider-assigned event identifier.
    pub id: String,

    /// The event title. Providers may omit it for untitled events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// When the event starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventStart>,

    /// Provider fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarEvent {
    /// Creates an event with a title and no other fields.
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: Some(summary.into()),
            start: None,
            extra: Map::new(),
        }
    }

    /// Builder method to set the start.
    pub fn with_start(mut self, start: EventStart) -> Self {
        self.start = Some(start);
        self
    }

    /// Builder method to attach an opaque provider field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns the title, if the event has one.
    pub fn title(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Replaces the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.summary = Some(title.into());
    }

    /// Human-readable start, used in rename reports.
    pub fn start_display(&self) -> String {
        self.start
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "no start".to_string())
    }
}
