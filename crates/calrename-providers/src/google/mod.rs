//! Google Calendar provider implementation.
//!
//! This module provides a [`GoogleProvider`] that lists calendars, pages
//! through events and writes back renamed events using the Google Calendar
//! API.
//!
//! # Authentication Flow
//!
//! 1. The token cache is loaded; a valid token with the right scopes is used
//!    as is, an expired one is refreshed with its refresh token
//! 2. Otherwise the client descriptor is read from the credentials file
//! 3. A local HTTP server is bound on a loopback port
//! 4. The browser is opened on Google's consent page with a PKCE challenge
//! 5. Google redirects to the loopback server with the authorization code
//! 6. The code is exchanged for access and refresh tokens
//! 7. Tokens are persisted to the cache for the next run
//!
//! # Example
//!
//! ```ignore
//! use calrename_providers::CalendarProvider;
//! use calrename_providers::google::{GoogleConfig, GoogleProvider};
//!
//! let config = GoogleConfig::new("credentials.json")
//!     .with_token_path("/tmp/calrename-token.json");
//!
//! let provider = GoogleProvider::connect(config).await?;
//! let calendars = provider.list_calendars().await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::{CalendarListEntry, GoogleCalendarClient};
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow, RefreshedToken};
pub use provider::GoogleProvider;
pub use tokens::{TokenInfo, TokenStorage};
