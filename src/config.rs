use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime parameters for the feedback page workflow.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Ratings required before the questionnaire unlocks.
    pub rating_threshold: u64,
    /// Route opened by the proceed action.
    pub follow_up_route: String,
    /// JSON file backing local storage.
    pub storage_path: PathBuf,
    pub request_timeout: Duration,
    pub scroll_hint_delay: Duration,
    pub notification_duration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            rating_threshold: 20,
            follow_up_route: "/sus".to_string(),
            storage_path: PathBuf::from("./data/local_storage.json"),
            request_timeout: Duration::from_secs(120),
            scroll_hint_delay: Duration::from_millis(5000),
            notification_duration: Duration::from_millis(2000),
        }
    }
}

impl Config {
    /// Read `SURVEY_*` variables (after `.env`), falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        let defaults = Self::default();

        Ok(Self {
            base_url: dotenv::var("SURVEY_BASE_URL").unwrap_or(defaults.base_url),
            rating_threshold: parse_var("SURVEY_RATING_THRESHOLD")?
                .unwrap_or(defaults.rating_threshold),
            follow_up_route: dotenv::var("SURVEY_FOLLOW_UP_ROUTE")
                .unwrap_or(defaults.follow_up_route),
            storage_path: dotenv::var("SURVEY_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            request_timeout: parse_var("SURVEY_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            scroll_hint_delay: parse_var("SURVEY_SCROLL_HINT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.scroll_hint_delay),
            notification_duration: parse_var("SURVEY_NOTIFICATION_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.notification_duration),
        })
    }
}

/// Unset or empty variables are `None`; unparseable ones are an error.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        _ => Ok(None),
    }
}
