//! Client configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_API_URL: &str = "RESTAURANTS_API_URL";
pub const ENV_APP_ORIGIN: &str = "RESTAURANTS_APP_ORIGIN";
pub const ENV_DB_PATH: &str = "RESTAURANTS_DB_PATH";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "RESTAURANTS_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:1337";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// Where the client talks to and keeps its data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend REST base URL, no trailing slash
    pub api_base_url: String,
    /// Origin relative asset paths resolve against
    pub app_origin: Url,
    /// Local store location; `None` leaves the choice to the caller
    pub db_path: Option<PathBuf>,
    /// Upper bound for every HTTP request
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from `RESTAURANTS_*` environment variables.
    ///
    /// Unset variables fall back to defaults; malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }
}

/// Build a config from a variable lookup.
pub fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
    let api_base_url = match normalize_text_option(lookup(ENV_API_URL)) {
        Some(value) => normalize_http_url(ENV_API_URL, &value)?,
        None => DEFAULT_API_URL.to_string(),
    };

    let app_origin = normalize_http_url(
        ENV_APP_ORIGIN,
        &normalize_text_option(lookup(ENV_APP_ORIGIN))
            .unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string()),
    )?;
    let app_origin = Url::parse(&app_origin)
        .map_err(|error| Error::Config(format!("{ENV_APP_ORIGIN} is invalid: {error}")))?;

    let db_path = normalize_text_option(lookup(ENV_DB_PATH)).map(PathBuf::from);

    let request_timeout = match normalize_text_option(lookup(ENV_HTTP_TIMEOUT_SECS)) {
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(Error::Config(format!(
                    "{ENV_HTTP_TIMEOUT_SECS} must be a positive number of seconds, got {value:?}"
                )))
            }
        },
        None => DEFAULT_REQUEST_TIMEOUT,
    };

    Ok(ClientConfig {
        api_base_url,
        app_origin,
        db_path,
        request_timeout,
    })
}

fn normalize_http_url(key: &str, value: &str) -> Result<String> {
    if !is_http_url(value) {
        return Err(Error::Config(format!(
            "{key} must include http:// or https://"
        )));
    }
    Url::parse(value).map_err(|error| Error::Config(format!("{key} is invalid: {error}")))?;
    Ok(value.trim_end_matches('/').to_string())
}
