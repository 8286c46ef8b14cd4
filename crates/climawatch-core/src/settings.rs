use crate::error::{ClimaError, Result};
use crate::thresholds::ThresholdConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_THINGSPEAK_BASE: &str = "https://api.thingspeak.com";
pub const DEFAULT_TWILIO_BASE: &str = "https://api.twilio.com";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_CHANNEL_ID: &str = "THINGSPEAK_CHANNEL_ID";
pub const ENV_READ_KEY: &str = "THINGSPEAK_READ_API_KEY";
pub const ENV_WRITE_KEY: &str = "THINGSPEAK_WRITE_API_KEY";
pub const ENV_THINGSPEAK_BASE: &str = "THINGSPEAK_BASE_URL";
pub const ENV_TWILIO_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_TWILIO_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_TWILIO_FROM: &str = "TWILIO_WHATSAPP_FROM";
pub const ENV_TWILIO_BASE: &str = "TWILIO_BASE_URL";
pub const ENV_DEFAULT_PHONE: &str = "DEFAULT_NOTIFY_PHONE";
pub const ENV_THRESHOLDS: &str = "CLIMAWATCH_THRESHOLDS";

// ---------------------------------------------------------------------------
// Provider settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub base_url: String,
    pub channel_id: Option<String>,
    pub read_key: Option<String>,
    pub write_key: Option<String>,
}

impl FeedSettings {
    pub fn channel_id(&self) -> Result<&str> {
        require(self.channel_id.as_deref(), ENV_CHANNEL_ID)
    }

    pub fn write_key(&self) -> Result<&str> {
        require(self.write_key.as_deref(), ENV_WRITE_KEY)
    }
}

#[derive(Debug, Clone)]
pub struct MessagingSettings {
    pub base_url: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from: Option<String>,
}

impl MessagingSettings {
    /// `(account_sid, auth_token, from)` when all three are configured.
    pub fn credentials(&self) -> Result<(&str, &str, &str)> {
        match (
            self.account_sid.as_deref(),
            self.auth_token.as_deref(),
            self.from.as_deref(),
        ) {
            (Some(sid), Some(token), Some(from)) => Ok((sid, token, from)),
            _ => Err(ClimaError::MessagingUnavailable(format!(
                "Twilio credentials not set ({ENV_TWILIO_SID} / {ENV_TWILIO_TOKEN} / {ENV_TWILIO_FROM})"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub feed: FeedSettings,
    pub messaging: MessagingSettings,
    pub default_phone: Option<String>,
    pub thresholds: ThresholdConfig,
    pub thresholds_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment, loading `.env` first
    /// when one exists.
    ///
    /// A `thresholds` path replaces `CLIMAWATCH_THRESHOLDS`; the file named
    /// by the variable is then never read.
    pub fn from_env(thresholds: Option<&Path>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(with_thresholds(|key| std::env::var(key).ok(), thresholds))
    }

    /// Build settings from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let thresholds_path = get(ENV_THRESHOLDS).map(PathBuf::from);
        let thresholds = match &thresholds_path {
            Some(path) => ThresholdConfig::load(path)?,
            None => ThresholdConfig::default(),
        };

        Ok(Self {
            feed: FeedSettings {
                base_url: get(ENV_THINGSPEAK_BASE)
                    .unwrap_or_else(|| DEFAULT_THINGSPEAK_BASE.to_string()),
                channel_id: get(ENV_CHANNEL_ID),
                read_key: get(ENV_READ_KEY),
                write_key: get(ENV_WRITE_KEY),
            },
            messaging: MessagingSettings {
                base_url: get(ENV_TWILIO_BASE).unwrap_or_else(|| DEFAULT_TWILIO_BASE.to_string()),
                account_sid: get(ENV_TWILIO_SID),
                auth_token: get(ENV_TWILIO_TOKEN),
                from: get(ENV_TWILIO_FROM),
            },
            default_phone: get(ENV_DEFAULT_PHONE),
            thresholds,
            thresholds_path,
            request_timeout: REQUEST_TIMEOUT,
        })
    }
}

/// Answer `CLIMAWATCH_THRESHOLDS` with `path` when one is given.
fn with_thresholds<F>(lookup: F, path: Option<&Path>) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.map(|p| p.to_string_lossy().into_owned());
    move |key: &str| match &path {
        Some(p) if key == ENV_THRESHOLDS => Some(p.clone()),
        _ => lookup(key),
    }
}

fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value.ok_or_else(|| ClimaError::ConfigMissing(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
