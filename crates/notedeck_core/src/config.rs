//! Runtime configuration.
//!
//! # Responsibility
//! - Load JSON configuration and apply `NOTEDECK_*` environment overrides.
//! - Build the session provider from the configured identity.
//!
//! # Invariants
//! - Missing identity is a warning, not an error; the page guard decides.

use crate::auth::StaticSessionProvider;
use crate::logging::default_log_level;
use crate::model::note::User;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ENV_DATABASE_PATH: &str = "NOTEDECK_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTEDECK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEDECK_LOG_DIR";
pub const ENV_USER_ID: &str = "NOTEDECK_USER_ID";
pub const ENV_USER_EMAIL: &str = "NOTEDECK_USER_EMAIL";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Identity used when no interactive sign-in exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_id: Uuid,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Note database file. `None` keeps notes in memory.
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub session: Option<SessionConfig>,
}

/// Reads a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = CoreConfig::from_json_str(&raw)?;
    info!(
        "event=config_load module=config status=ok path={}",
        path.display()
    );
    Ok(config)
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies `NOTEDECK_*` process environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_DATABASE_PATH) {
            self.database_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.log_level = Some(value);
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_USER_ID) {
            let user_id = Uuid::parse_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                key: ENV_USER_ID,
                value: value.clone(),
            })?;
            let email = self
                .session
                .take()
                .map(|session| session.email)
                .unwrap_or_default();
            self.session = Some(SessionConfig { user_id, email });
        }
        if let (Some(email), Some(session)) = (get(ENV_USER_EMAIL), self.session.as_mut()) {
            session.email = email;
        }
        Ok(())
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn session_user(&self) -> Option<User> {
        self.session
            .as_ref()
            .map(|session| User::new(session.user_id, session.email.clone()))
    }

    pub fn session_provider(&self) -> StaticSessionProvider {
        StaticSessionProvider::from(self.session_user())
    }

    /// Logs a warning when no identity is configured. Returns whether one is.
    pub fn check_session(&self) -> bool {
        if self.session.is_some() {
            return true;
        }
        warn!(
            "event=config_check module=config status=warn reason=no_session hint=set_{}",
            ENV_USER_ID
        );
        false
    }
}
