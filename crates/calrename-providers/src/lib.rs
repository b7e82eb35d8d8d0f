//! Calendar provider abstraction and the Google Calendar backend.
//!
//! - [`CalendarProvider`] - The trait the rename pipeline talks to
//! - [`CalendarEvent`] - An event payload that round-trips unknown fields
//! - [`EventPager`] - Lazy, ordered traversal of a paginated event listing
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Google API     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │ GoogleProvider  │    │ MemoryProvider  │ (tests)
//! └────────┬────────┘    └────────┬────────┘
//!          │   CalendarProvider   │
//!          └──────────┬───────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │ EventPager  │
//!              └──────┬──────┘
//!                     ▼
//!              CalendarEvent stream
//! ```

pub mod error;
pub mod event;
pub mod google;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod pager;
pub mod provider;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use event::{CalendarEvent, EventStart};
pub use pager::EventPager;
pub use provider::{BoxFuture, CalendarInfo, CalendarProvider, EventPage};
