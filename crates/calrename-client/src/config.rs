//! Client configuration.
//!
//! All settings live in a single optional `config.toml` file at
//! `~/.config/calrename/config.toml` by default. Command-line flags and
//! environment variables take precedence over it.
//!
//! Paths may start with `~/`, which expands to the home directory.

use std::path::{Path, PathBuf};

use calrename_core::{TracingConfig, TracingOutputFormat};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{ClientError, ClientResult};

/// Settings read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Google OAuth client-secret JSON file.
    pub credentials: Option<PathBuf>,

    /// Token cache file.
    pub cache_file: Option<PathBuf>,

    /// Display name of the calendar to operate on.
    pub calendar: Option<String>,

    /// HTTP timeout in seconds.
    pub timeout: Option<u64>,

    /// Debug mode.
    pub debug: bool,

    /// Log format: `compact`, `pretty` or `json`.
    pub log_format: Option<String>,
}

impl Settings {
    /// Loads settings from `explicit`, or from the default path.
    ///
    /// A missing default file yields defaults; an explicit file must exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Loads settings from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
        Ok(settings.expand_paths())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calrename")
    }

    fn expand_paths(mut self) -> Self {
        self.credentials = self.credentials.map(expand_home);
        self.cache_file = self.cache_file.map(expand_home);
        self
    }
}

/// Builds the log subscriber settings; flags win over the file.
pub fn tracing_config(cli: &Cli, settings: &Settings) -> ClientResult<TracingConfig> {
    let base = if cli.debug || settings.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };

    let format = match (cli.log_format, settings.log_format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(name)) => name
            .parse::<TracingOutputFormat>()
            .map_err(|e| ClientError::Config(e.to_string()))?,
        (None, None) => TracingOutputFormat::default(),
    };

    Ok(base.with_format(format))
}

/// Expands a leading `~/` to the home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
credentials = "/etc/calrename/client.json"
cache_file = "/var/cache/calrename/token.json"
calendar = "Work"
timeout = 10
debug = true
log_format = "json"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(
            settings,
            Settings {
                credentials: Some(PathBuf::from("/etc/calrename/client.json")),
                cache_file: Some(PathBuf::from("/var/cache/calrename/token.json")),
                calendar: Some("Work".to_string()),
                timeout: Some(10),
                debug: true,
                log_format: Some("json".to_string()),
            }
        );
    }

    #[test]
    fn all_keys_are_optional() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());

        let settings: Settings = toml::from_str("calendar = \"Personal\"").unwrap();
        assert_eq!(settings.calendar.as_deref(), Some("Personal"));
        assert!(settings.credentials.is_none());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::resolve(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.contains("failed to read config"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout = \"soon\"").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.contains("failed to parse config"));
    }

    #[test]
    fn home_prefix_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            expand_home(PathBuf::from("~/secrets/client.json")),
            home.join("secrets/client.json")
        );
        assert_eq!(
            expand_home(PathBuf::from("/abs/client.json")),
            PathBuf::from("/abs/client.json")
        );
    }

    fn cli(args: &[&str]) -> Cli {
        use clap::Parser;
        let mut argv = vec!["calrename", "--regex", "x", "--replacement", "y"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn log_format_from_settings() {
        let settings = Settings {
            log_format: Some("pretty".to_string()),
            ..Default::default()
        };
        let config = tracing_config(&cli(&[]), &settings).unwrap();
        assert_eq!(config.output_format, TracingOutputFormat::Pretty);
        assert_eq!(config.default_level, tracing::Level::WARN);
    }

    #[test]
    fn log_format_flag_wins() {
        let settings = Settings {
            log_format: Some("pretty".to_string()),
            debug: true,
            ..Default::default()
        };
        let config = tracing_config(&cli(&["--log-format", "json"]), &settings).unwrap();
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.default_level, tracing::Level::DEBUG);
    }

    #[test]
    fn unknown_log_format_in_settings_is_config_error() {
        let settings = Settings {
            log_format: Some("xml".to_string()),
            ..Default::default()
        };
        let err = tracing_config(&cli(&[]), &settings).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn default_log_format_is_compact() {
        let config = tracing_config(&cli(&[]), &Settings::default()).unwrap();
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        assert!(Settings::default_path().ends_with("calrename/config.toml"));
    }
}
