//! Megaverse configuration.
//!
//! Loaded from `~/.megaverse/config.toml` (or `--config <path>`). Every key is
//! optional; a missing default file means all defaults.
//!
//! ```toml
//! candidate-id = "your-candidate-id"
//! base-url = "https://challenge.crossmint.io/api"
//! log-path = "megaverse_created.log"
//! timeout-secs = 30
//!
//! [create]
//! delay-ms = 500
//!
//! [cleanup]
//! max-attempts = 3
//! retry-delay-ms = 1000
//! object-delay-ms = 200
//! ```
//!
//! The candidate id is resolved through a chain:
//!
//! 1. `--candidate-id <id>`: explicit per-command override
//! 2. `CANDIDATE_ID` env var
//! 3. `candidate-id` in the config file

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;

use crate::api::DEFAULT_BASE_URL;
use crate::cleanup::{CleanupOptions, DEFAULT_OBJECT_DELAY};
use crate::create::DEFAULT_DELAY;
use crate::retry::RetryPolicy;
use crate::storage::DEFAULT_LOG_FILE;

/// HTTP timeout when `timeout-secs` isn't set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable consulted when `--candidate-id` isn't given.
pub const CANDIDATE_ID_VAR: &str = "CANDIDATE_ID";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0} must be at least 1")]
    ZeroAttempts(&'static str),

    #[error(
        "candidate id required: pass --candidate-id <id>, set CANDIDATE_ID, \
         or add `candidate-id = \"...\"` to ~/.megaverse/config.toml"
    )]
    MissingCandidateId,
}

/// Megaverse configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub candidate_id: Option<String>,
    pub base_url: Option<String>,
    pub log_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub create: CreateConfig,
    pub cleanup: CleanupConfig,
}

/// `[create]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CreateConfig {
    pub delay_ms: Option<u64>,
}

/// `[cleanup]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CleanupConfig {
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub object_delay_ms: Option<u64>,
}

impl Config {
    /// Load config from `explicit` if given, otherwise from the default path.
    ///
    /// An explicit path must exist. The default path may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::read(path)?.ok_or_else(|| ConfigError::NotFound(path.into())),
            None => match Self::path() {
                Some(path) => Ok(Self::read(&path)?.unwrap_or_default()),
                None => Ok(Self::default()),
            },
        }
    }

    /// Parse a config file. `None` if it doesn't exist.
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.into(),
                    source,
                });
            }
        };
        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })?;
        Ok(Some(config))
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The default config file path: `~/.megaverse/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".megaverse").join("config.toml"))
    }

    /// Resolve the candidate id from the flag, the environment, then the file.
    pub fn candidate_id(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        let from_env = env::var(CANDIDATE_ID_VAR).ok();
        resolve_candidate_id(explicit, from_env.as_deref(), self.candidate_id.as_deref())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    pub fn create_delay(&self) -> Duration {
        self.create
            .delay_ms
            .map_or(DEFAULT_DELAY, Duration::from_millis)
    }

    /// Cleanup options from the `[cleanup]` table, falling back to defaults.
    pub fn cleanup_options(&self) -> Result<CleanupOptions, ConfigError> {
        let defaults = CleanupOptions::default();
        let max_attempts = self
            .cleanup
            .max_attempts
            .unwrap_or(defaults.retry.max_attempts);
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts("cleanup.max-attempts"));
        }
        Ok(CleanupOptions {
            retry: RetryPolicy::new(
                max_attempts,
                self.cleanup
                    .retry_delay_ms
                    .map_or(defaults.retry.delay, Duration::from_millis),
            ),
            object_delay: self
                .cleanup
                .object_delay_ms
                .map_or(DEFAULT_OBJECT_DELAY, Duration::from_millis),
        })
    }
}

/// First non-empty value wins: flag, environment, config file.
fn resolve_candidate_id(
    explicit: Option<&str>,
    from_env: Option<&str>,
    from_file: Option<&str>,
) -> Result<String, ConfigError> {
    [explicit, from_env, from_file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(String::from)
        .ok_or(ConfigError::MissingCandidateId)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn explicit_candidate_id_wins() {
        let id = resolve_candidate_id(Some("flag"), Some("env"), Some("file")).unwrap();
        assert_eq!(id, "flag");
    }

    #[test]
    fn environment_beats_file() {
        let id = resolve_candidate_id(None, Some("env"), Some("file")).unwrap();
        assert_eq!(id, "env");
    }

    #[test]
    fn empty_values_fall_through() {
        let id = resolve_candidate_id(Some(""), Some("  "), Some("file")).unwrap();
        assert_eq!(id, "file");
    }

    #[test]
    fn missing_everywhere_is_an_error() {
        let err = resolve_candidate_id(None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCandidateId));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.log_path(), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.create_delay(), Duration::from_millis(500));
        assert_eq!(config.cleanup_options().unwrap(), CleanupOptions::default());
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(
            r#"
            candidate-id = "abc"
            base-url = "http://localhost:8080/api"
            log-path = "/tmp/created.log"
            timeout-secs = 5

            [create]
            delay-ms = 250

            [cleanup]
            max-attempts = 5
            retry-delay-ms = 2000
            object-delay-ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.candidate_id.as_deref(), Some("abc"));
        assert_eq!(config.base_url(), "http://localhost:8080/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.create_delay(), Duration::from_millis(250));

        let cleanup = config.cleanup_options().unwrap();
        assert_eq!(
            cleanup.retry,
            RetryPolicy::new(5, Duration::from_millis(2000))
        );
        assert_eq!(cleanup.object_delay, Duration::ZERO);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("candidate = \"typo\"").is_err());
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = Config::parse("[cleanup]\nmax-attempts = 0").unwrap();
        assert!(matches!(
            config.cleanup_options(),
            Err(ConfigError::ZeroAttempts(_))
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "candidate-id = \"from-file\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.candidate_id(Some("flag")).unwrap(), "flag");
        assert_eq!(config.candidate_id.as_deref(), Some("from-file"));
    }
}
