//! Google Calendar provider implementation.
//!
//! [`GoogleProvider::connect`] is the credential manager: it loads the token
//! cache, refreshes or re-authenticates as needed, persists the result and
//! hands back a provider bound to a valid access token.

use calrename_core::TimeWindow;
use tokio::sync::RwLock as TokioRwLock;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::event::CalendarEvent;
use crate::provider::{BoxFuture, CalendarInfo, CalendarProvider, EventPage};

use super::client::GoogleCalendarClient;
use super::config::{GoogleConfig, OAuthCredentials};
use super::oauth::OAuthClient;
use super::tokens::{TokenInfo, TokenStorage};

/// Google Calendar provider.
pub struct GoogleProvider {
    config: GoogleConfig,
    token_storage: TokenStorage,
    api_client: TokioRwLock<GoogleCalendarClient>,
}

impl GoogleProvider {
    /// Authenticates and returns a ready-to-use provider.
    ///
    /// - A cached token with the required scopes that has not expired is
    ///   used as is.
    /// - An expired cached token with a refresh token is refreshed in place.
    /// - Otherwise the interactive browser flow runs against the client
    ///   descriptor at `config.credentials_path`.
    ///
    /// A cache file that cannot be parsed is logged and treated as absent.
    /// Any token obtained or refreshed is written back to the cache.
    pub async fn connect(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let token_storage = TokenStorage::new(&config.token_path);
        if let Err(e) = token_storage.load() {
            warn!(
                "ignoring unusable token cache {}: {}",
                config.token_path.display(),
                e
            );
        }

        let tokens = Self::acquire_tokens(&config, &token_storage).await?;
        let api_client = GoogleCalendarClient::new(
            &tokens.access_token,
            &config.api_base,
            config.timeout,
            &config.user_agent,
        )?;

        Ok(Self {
            config,
            token_storage,
            api_client: TokioRwLock::new(api_client),
        })
    }

    async fn acquire_tokens(
        config: &GoogleConfig,
        storage: &TokenStorage,
    ) -> ProviderResult<TokenInfo> {
        match storage.get() {
            Some(tokens) if !storage.needs_reauth(&config.scopes) => {
                if !tokens.is_expired() {
                    debug!("using cached access token");
                    return Ok(tokens);
                }
                if tokens.can_refresh() {
                    Self::refresh(config, storage, &tokens).await?;
                    return storage
                        .get()
                        .ok_or_else(|| ProviderError::internal("tokens vanished after refresh"));
                }
                info!("cached token expired and has no refresh token, re-authenticating");
            }
            Some(_) => info!("cached token lacks required scopes, re-authenticating"),
            None => debug!("no cached token"),
        }

        let credentials = OAuthCredentials::from_file(&config.credentials_path)?;
        let oauth_client = OAuthClient::new(credentials, config)?;
        let tokens = oauth_client
            .authorize(&config.scopes, config.loopback_port)
            .await?;

        if !tokens.has_scopes(&config.scopes) {
            return Err(ProviderError::authorization(format!(
                "consent did not grant the required scopes ({})",
                config.scopes.join(", ")
            )));
        }

        storage.set(tokens.clone())?;
        info!("authentication successful");
        Ok(tokens)
    }

    /// Refreshes the stored access token and persists it.
    ///
    /// Uses the client recorded in the cache; falls back to the credentials
    /// file for caches written without one.
    async fn refresh(
        config: &GoogleConfig,
        storage: &TokenStorage,
        tokens: &TokenInfo,
    ) -> ProviderResult<String> {
        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            ProviderError::authentication("no refresh token - re-authentication required")
        })?;

        let credentials = match tokens.client() {
            Some(credentials) => credentials,
            None => OAuthCredentials::from_file(&config.credentials_path)?,
        };

        debug!("refreshing expired access token");
        let refreshed = OAuthClient::new(credentials, config)?
            .refresh_token(refresh_token)
            .await?;

        storage.update_access_token(
            &refreshed.access_token,
            refreshed.expires_in,
            refreshed.refresh_token,
        )?;
        Ok(refreshed.access_token)
    }

    /// Refreshes the access token if it expired during the run.
    async fn ensure_fresh(&self) -> ProviderResult<()> {
        let tokens = self
            .token_storage
            .get()
            .ok_or_else(|| ProviderError::authentication("not authenticated"))?;

        if !tokens.is_expired() {
            return Ok(());
        }

        if !tokens.can_refresh() {
            return Err(ProviderError::authentication(
                "access token expired and no refresh token is available",
            ));
        }

        let access_token = Self::refresh(&self.config, &self.token_storage, &tokens).await?;
        self.api_client.write().await.set_access_token(access_token);
        Ok(())
    }

    async fn list_calendars_impl(&self) -> ProviderResult<Vec<CalendarInfo>> {
        self.ensure_fresh().await?;

        let calendars = self.api_client.read().await.list_calendars().await?;

        Ok(calendars
            .into_iter()
            .map(|c| {
                let mut info = CalendarInfo::new(&c.id, &c.summary).with_primary(c.primary);
                if let Some(tz) = c.time_zone {
                    info = info.with_timezone(tz);
                }
                info
            })
            .collect())
    }

    async fn list_events_impl(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> ProviderResult<EventPage> {
        self.ensure_fresh().await?;

        self.api_client
            .read()
            .await
            .list_events_page(calendar_id, window, page_token)
            .await
    }

    async fn update_event_impl(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> ProviderResult<CalendarEvent> {
        self.ensure_fresh().await?;

        self.api_client
            .read()
            .await
            .update_event(calendar_id, event)
            .await
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            self.list_calendars_impl()
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: &'a TimeWindow,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<EventPage>> {
        Box::pin(async move {
            self.list_events_impl(calendar_id, window, page_token)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, ProviderResult<CalendarEvent>> {
        Box::pin(async move {
            self.update_event_impl(calendar_id, event)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{Duration, Utc};
    use std::path::Path;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, dir: &Path) -> GoogleConfig {
        GoogleConfig::new(dir.join("missing-client.json"))
            .with_token_path(dir.join("token.json"))
            .with_endpoints(
                server.uri(),
                format!("{}/auth", server.uri()),
                format!("{}/token", server.uri()),
            )
    }

    fn cached_token(config: &GoogleConfig, expired: bool) -> TokenInfo {
        let mut tokens = TokenInfo::new(
            "cached-access",
            Some("cached-refresh".to_string()),
            Some(3600),
            config.scopes.clone(),
        )
        .with_client(&OAuthCredentials::new(
            "cached.apps.googleusercontent.com",
            "cached-secret",
        ));
        if expired {
            tokens.expires_at = Some(Utc::now() - Duration::minutes(5));
        }
        tokens
    }

    async fn mount_calendar_list(server: &MockServer, bearer: &str) {
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(header("authorization", format!("Bearer {}", bearer).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "id": "work-id", "summary": "Work", "primary": true }]
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn valid_cached_token_is_used_without_credentials_file() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path());
        TokenStorage::new(&config.token_path)
            .set(cached_token(&config, false))
            .unwrap();
        mount_calendar_list(&server, "cached-access").await;

        let provider = GoogleProvider::connect(config).await.unwrap();
        let calendars = provider.list_calendars().await.unwrap();

        assert_eq!(provider.name(), "google");
        assert_eq!(calendars, vec![CalendarInfo::new("work-id", "Work").with_primary(true)]);
    }

    #[tokio::test]
    async fn expired_cached_token_is_refreshed_and_persisted() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path());
        let token_path = config.token_path.clone();
        TokenStorage::new(&token_path)
            .set(cached_token(&config, true))
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("refresh_token=cached-refresh"))
            .and(body_string_contains("client_id=cached.apps.googleusercontent.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "refreshed-access",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_calendar_list(&server, "refreshed-access").await;

        let provider = GoogleProvider::connect(config).await.unwrap();
        provider.list_calendars().await.unwrap();

        let reloaded = TokenStorage::new(&token_path);
        assert!(reloaded.load().unwrap());
        let tokens = reloaded.get().unwrap();
        assert_eq!(tokens.access_token, "refreshed-access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("cached-refresh"));
        assert!(!tokens.is_expired());
    }

    #[tokio::test]
    async fn failed_refresh_is_an_authentication_error() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path());
        TokenStorage::new(&config.token_path)
            .set(cached_token(&config, true))
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = GoogleProvider::connect(config).await.err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn corrupt_cache_falls_through_to_credentials_file() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path());
        std::fs::write(&config.token_path, "garbage").unwrap();

        // The interactive flow starts by reading the (missing) client file
        let err = GoogleProvider::connect(config).await.err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("credentials file"));
    }

    #[tokio::test]
    async fn cached_token_missing_scopes_requires_reauth() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path());
        let mut tokens = cached_token(&config, false);
        tokens.scopes = vec![GoogleConfig::SCOPE_CALENDAR_READONLY.to_string()];
        TokenStorage::new(&config.token_path).set(tokens).unwrap();

        let err = GoogleProvider::connect(config).await.err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn malformed_credentials_file_is_fatal() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&server, dir.path());
        config.credentials_path = dir.path().join("client.json");
        std::fs::write(&config.credentials_path, r#"{"installed": {}}"#).unwrap();

        let err = GoogleProvider::connect(config).await.err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("parse"));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path()).with_scopes(vec![]);

        let err = GoogleProvider::connect(config).await.err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn errors_carry_provider_name() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config(&server, dir.path());
        TokenStorage::new(&config.token_path)
            .set(cached_token(&config, false))
            .unwrap();
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let provider = GoogleProvider::connect(config).await.unwrap();
        let err = provider
            .update_event("work-id", &CalendarEvent::new("evt", "Title"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthorizationFailed);
        assert_eq!(err.provider(), Some("google"));
    }
}
