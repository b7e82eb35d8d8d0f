//! Google Calendar provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials for Google API access.
///
/// Google requires every installed application to bring its own client,
/// registered in the Cloud Console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth client-secret JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level (e.g., from gcloud)
#[derive(Debug, Deserialize)]
struct GoogleCredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads OAuth credentials from a client-secret JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a client-secret JSON string.
    ///
    /// Supports multiple formats:
    /// 1. Google Cloud Console format: `{"installed": {"client_id": "...", "client_secret": "..."}}`
    /// 2. Flat format: `{"client_id": "...", "client_secret": "..."}`
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: GoogleCredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        let creds = if let Some(nested) = file.installed.or(file.web) {
            Self::new(nested.client_id, nested.client_secret)
        } else if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret)
        {
            Self::new(client_id, client_secret)
        } else {
            return Err(ProviderError::configuration(
                "credentials file must contain 'installed'/'web' section or 'client_id'/'client_secret' at root level",
            ));
        };

        creds
            .validate()
            .map_err(|e| ProviderError::configuration(format!("invalid credentials: {}", e)))?;
        Ok(creds)
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Path to the OAuth client-secret JSON file.
    ///
    /// Only read when the interactive flow runs, or when a refresh is needed
    /// and the token cache does not carry the client credentials.
    pub credentials_path: PathBuf,

    /// Path of the credential cache.
    pub token_path: PathBuf,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Port for the loopback OAuth server. `0` picks an ephemeral port.
    pub loopback_port: u16,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Calendar API base URL.
    pub api_base: String,

    /// OAuth authorization endpoint.
    pub auth_url: String,

    /// OAuth token endpoint.
    pub token_url: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Read access to calendars, needed to resolve a calendar by name.
    pub const SCOPE_CALENDAR_READONLY: &'static str =
        "https://www.googleapis.com/auth/calendar.readonly";

    /// Read/write access to events.
    pub const SCOPE_EVENTS: &'static str = "https://www.googleapis.com/auth/calendar.events";

    /// Base URL for Google Calendar API v3.
    pub const API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Google OAuth authorization endpoint.
    pub const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google OAuth token endpoint.
    pub const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Creates a configuration reading client credentials from `credentials_path`.
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: Self::default_token_path(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calrename/{}", env!("CARGO_PKG_VERSION")),
            loopback_port: 0,
            scopes: vec![
                Self::SCOPE_CALENDAR_READONLY.to_string(),
                Self::SCOPE_EVENTS.to_string(),
            ],
            api_base: Self::API_BASE.to_string(),
            auth_url: Self::AUTH_URL.to_string(),
            token_url: Self::TOKEN_URL.to_string(),
        }
    }

    /// Returns the default credential cache path.
    pub fn default_token_path() -> PathBuf {
        std::env::temp_dir().join("calrename-token.json")
    }

    /// Sets the token cache path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the loopback port for OAuth.
    pub fn with_loopback_port(mut self, port: u16) -> Self {
        self.loopback_port = port;
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Points the provider at different API and OAuth endpoints.
    pub fn with_endpoints(
        mut self,
        api_base: impl Into<String>,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }

        if self.token_path.as_os_str().is_empty() {
            return Err("token cache path must not be empty".to_string());
        }

        Ok(())
    }
}
