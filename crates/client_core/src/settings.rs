use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const SETTINGS_FILE_NAME: &str = "therapy_desk.toml";
const SETTINGS_DIR_NAME: &str = "therapy_desk";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
    #[error("invalid server url '{value}': {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub server_url: String,
    pub report_timeout_secs: u64,
    pub report_settle_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            report_timeout_secs: 15,
            report_settle_ms: 500,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    /// Defaults, then the first settings file found, then environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = match Self::discover_file() {
            Some(path) => {
                info!(path = %path.display(), "loading settings file");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn discover_file() -> Option<PathBuf> {
        let local = PathBuf::from(SETTINGS_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        let user = dirs::config_dir()?
            .join(SETTINGS_DIR_NAME)
            .join(SETTINGS_FILE_NAME);
        user.is_file().then_some(user)
    }

    /// Applies `THERAPY_DESK_*` variables (and the `APP__SERVER_URL` alias)
    /// read through `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        for key in ["THERAPY_DESK_SERVER_URL", "APP__SERVER_URL"] {
            if let Some(value) = non_empty(lookup(key)) {
                debug!(key, "server url overridden from environment");
                self.server_url = value;
            }
        }
        if let Some(value) = non_empty(lookup("THERAPY_DESK_REPORT_TIMEOUT_SECS")) {
            self.report_timeout_secs = parse_number("THERAPY_DESK_REPORT_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = non_empty(lookup("THERAPY_DESK_REPORT_SETTLE_MS")) {
            self.report_settle_ms = parse_number("THERAPY_DESK_REPORT_SETTLE_MS", &value)?;
        }
        if let Some(value) = non_empty(lookup("THERAPY_DESK_REQUEST_TIMEOUT_SECS")) {
            self.request_timeout_secs =
                Some(parse_number("THERAPY_DESK_REQUEST_TIMEOUT_SECS", &value)?);
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let trimmed = self.server_url.trim();
        Url::parse(trimmed).map_err(|source| SettingsError::InvalidUrl {
            value: trimmed.to_string(),
            source,
        })
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }

    pub fn report_settle_delay(&self) -> Duration {
        Duration::from_millis(self.report_settle_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number(key: &str, value: &str) -> Result<u64, SettingsError> {
    value.parse().map_err(|_| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
