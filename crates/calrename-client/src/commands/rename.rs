//! The rename command.
//!
//! Resolves the calendar by display name, pages through its events in the
//! requested window, applies the rename rule to every title and writes back
//! the events whose title changed.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use calrename_core::{RenameRule, TimeWindow, default_start_date};
use calrename_providers::google::{GoogleConfig, GoogleProvider};
use calrename_providers::{
    CalendarEvent, CalendarProvider, EventPager, ProviderErrorCode, ProviderResult,
};
use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::{ClientError, ClientResult};

/// Everything a rename run needs once flags and settings are merged.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub calendar: String,
    pub window: TimeWindow,
    pub rule: RenameRule,
    pub dry_run: bool,
    pub continue_on_error: bool,
}

impl RenamePlan {
    /// Builds a plan from command-line flags and file settings.
    ///
    /// `today` is the default upper bound when `--end` is not given.
    pub fn from_cli(cli: &Cli, settings: &Settings, today: NaiveDate) -> ClientResult<Self> {
        let calendar = cli
            .calendar
            .clone()
            .or_else(|| settings.calendar.clone())
            .ok_or_else(|| {
                ClientError::Config(format!(
                    "no calendar given; pass --calendar or set `calendar` in {}",
                    Settings::default_path().display()
                ))
            })?;

        let start = cli.start.unwrap_or_else(default_start_date);
        let end = cli.end.unwrap_or(today);
        let window = TimeWindow::from_dates(start, end)?;
        let rule = RenameRule::new(&cli.regex, cli.replacement.as_str())?;

        Ok(Self {
            calendar,
            window,
            rule,
            dry_run: cli.dry_run,
            continue_on_error: cli.continue_on_error,
        })
    }
}

/// Builds the Google provider configuration from flags and file settings.
pub fn google_config(cli: &Cli, settings: &Settings) -> ClientResult<GoogleConfig> {
    let credentials: PathBuf = cli
        .credentials
        .clone()
        .or_else(|| settings.credentials.clone())
        .ok_or_else(|| {
            ClientError::Config(format!(
                "no credentials file given; pass --credentials or set `credentials` in {}",
                Settings::default_path().display()
            ))
        })?;

    let token_path = cli
        .cache_file
        .clone()
        .or_else(|| settings.cache_file.clone())
        .unwrap_or_else(GoogleConfig::default_token_path);

    let timeout = cli
        .timeout
        .or(settings.timeout)
        .unwrap_or(GoogleConfig::DEFAULT_TIMEOUT_SECS);

    let config = GoogleConfig::new(credentials)
        .with_token_path(token_path)
        .with_timeout(Duration::from_secs(timeout));
    config.validate().map_err(ClientError::Config)?;
    Ok(config)
}

/// What happened to a matching event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dry run: the rename was only reported.
    Previewed,
    /// The event was written back with its new title.
    Updated,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameSummary {
    pub pages: usize,
    pub scanned: usize,
    pub untitled: usize,
    pub matched: usize,
    pub updated: usize,
    pub previewed: usize,
    pub failed: usize,
}

impl RenameSummary {
    /// Turns isolated update failures into an error so the run exits non-zero.
    pub fn into_result(self) -> ClientResult<Self> {
        if self.failed > 0 {
            return Err(ClientError::UpdatesFailed {
                failed: self.failed,
                attempted: self.matched,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for RenameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events scanned, {} matched, {} updated, {} previewed, {} failed",
            self.scanned, self.matched, self.updated, self.previewed, self.failed
        )
    }
}

/// Returns the ID of the first calendar whose display name is exactly `name`.
pub async fn resolve_calendar(
    provider: &dyn CalendarProvider,
    name: &str,
) -> ProviderResult<Option<String>> {
    let calendars = provider.list_calendars().await?;

    if let Some(calendar) = calendars.iter().find(|c| c.name == name) {
        return Ok(Some(calendar.id.clone()));
    }

    let names: Vec<&str> = calendars.iter().map(|c| c.name.as_str()).collect();
    debug!("available calendars: {}", names.join(", "));
    Ok(None)
}

/// Reports a rename and, unless `dry_run`, writes the renamed event back.
pub async fn apply(
    provider: &dyn CalendarProvider,
    calendar_id: &str,
    mut event: CalendarEvent,
    new_title: &str,
    dry_run: bool,
    out: &mut dyn Write,
) -> ClientResult<Outcome> {
    let title = event.title().unwrap_or_default();
    let start = event.start_display();

    if dry_run {
        writeln!(out, "Would update {} ({}) to {}", title, start, new_title)?;
        return Ok(Outcome::Previewed);
    }

    writeln!(out, "Update {} ({}) to {}", title, start, new_title)?;
    event.set_title(new_title);
    provider.update_event(calendar_id, &event).await?;
    Ok(Outcome::Updated)
}

/// Runs the rename pipeline against `provider`.
///
/// With `continue_on_error`, a failed update is logged and counted; an
/// authentication failure still aborts since every later call would fail
/// the same way.
pub async fn execute(
    provider: &dyn CalendarProvider,
    plan: &RenamePlan,
    out: &mut dyn Write,
) -> ClientResult<RenameSummary> {
    let calendar_id = resolve_calendar(provider, &plan.calendar)
        .await?
        .ok_or_else(|| ClientError::CalendarNotFound(plan.calendar.clone()))?;
    info!("renaming events in '{}' ({}) with {}", plan.calendar, calendar_id, plan.rule);

    let mut summary = RenameSummary::default();
    let mut pager = EventPager::new(provider, &calendar_id, &plan.window);

    while let Some(events) = pager.next_page().await? {
        for event in events {
            summary.scanned += 1;

            let renamed = match event.title() {
                Some(title) => plan.rule.apply(title),
                None => {
                    debug!("skipping untitled event {}", event.id);
                    summary.untitled += 1;
                    continue;
                }
            };
            if !renamed.changed {
                continue;
            }
            summary.matched += 1;

            let event_id = event.id.clone();
            match apply(provider, &calendar_id, event, &renamed.title, plan.dry_run, out).await {
                Ok(Outcome::Previewed) => summary.previewed += 1,
                Ok(Outcome::Updated) => summary.updated += 1,
                Err(ClientError::Provider(e))
                    if plan.continue_on_error
                        && e.code() != ProviderErrorCode::AuthenticationFailed =>
                {
                    error!("failed to update event {}: {}", event_id, e);
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    summary.pages = pager.pages_fetched();
    info!("{} ({} pages)", summary, summary.pages);
    Ok(summary)
}

/// Entry point for the binary: authenticates, runs and reports.
pub async fn run(cli: &Cli, settings: &Settings) -> ClientResult<()> {
    let today = chrono::Local::now().date_naive();
    let plan = RenamePlan::from_cli(cli, settings, today)?;
    let config = google_config(cli, settings)?;

    let provider = GoogleProvider::connect(config).await?;

    let mut stdout = std::io::stdout();
    let summary = execute(&provider, &plan, &mut stdout).await?;
    writeln!(stdout, "{}", summary)?;

    summary.into_result().map(|_| ())
}
