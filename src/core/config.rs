use std::env;
use std::str::FromStr;

use crate::errors::BotError;

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_GENERAL_MODEL: &str = "ibm/granite-3-8b-instruct";
pub const DEFAULT_CODE_MODEL: &str = "ibm/granite-8b-code-instruct";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_signing_secret: String,
    pub slack_bot_token: String,
    pub watsonx_url: String,
    pub watsonx_api_key: String,
    pub project_id: String,
    pub watsonx_iam_url: String,
    pub general_model_id: String,
    pub code_model_id: String,
    pub max_new_tokens: u32,
    pub host: String,
    pub port: u16,
    /// How long a processed event id is remembered for de-duplication.
    pub dedup_ttl_secs: u64,
    pub dedup_max_entries: u64,
    /// Ceiling applied to model output before it is sent as a DM.
    pub dm_max_chars: usize,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` when a required variable is missing or a
    /// numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, BotError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BotError::ConfigError(format!("{key} is not set")))
        };
        let or_default = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            watsonx_url: required("WATSONX_URL")?.trim_end_matches('/').to_string(),
            watsonx_api_key: required("WATSONX_APIKEY")?,
            project_id: required("PROJECT_ID")?,
            watsonx_iam_url: or_default("WATSONX_IAM_URL", DEFAULT_IAM_URL),
            general_model_id: or_default("WATSONX_GENERAL_MODEL", DEFAULT_GENERAL_MODEL),
            code_model_id: or_default("WATSONX_CODE_MODEL", DEFAULT_CODE_MODEL),
            max_new_tokens: parse_number(&lookup, "WATSONX_MAX_NEW_TOKENS", 400)?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse_number(&lookup, "PORT", 5000)?,
            dedup_ttl_secs: parse_number(&lookup, "DEDUP_TTL_SECS", 3600)?,
            dedup_max_entries: parse_number(&lookup, "DEDUP_MAX_ENTRIES", 10_000)?,
            dm_max_chars: parse_number(&lookup, "DM_MAX_CHARS", 3000)?,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, BotError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| BotError::ConfigError(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
