use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::order_view::ViewSettings;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_SESSION_FILE: &str = ".furniture-session.json";
pub const DEFAULT_ADMIN_NAME: &str = "admin";
pub const DEFAULT_CATALOG_STYLES: &str = "modern,classic,rustic";
pub const DEFAULT_CATALOG_TYPES: &str = "chair,table,sofa,bed";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    /// Users with this name (any case) get the admin view.
    pub admin_name: String,
    pub filter_debounce: Duration,
    pub request_timeout: Duration,
    pub catalog_styles: Vec<String>,
    pub catalog_types: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `load` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| {
                debug!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let config = Self {
            api_url: get("ORDERS_API_URL", DEFAULT_API_URL),
            session_file: PathBuf::from(get("ORDERS_SESSION_FILE", DEFAULT_SESSION_FILE)),
            admin_name: get("ORDERS_ADMIN_NAME", DEFAULT_ADMIN_NAME),
            filter_debounce: Duration::from_millis(parse(
                "ORDERS_FILTER_DEBOUNCE_MS",
                &get("ORDERS_FILTER_DEBOUNCE_MS", "300"),
            )?),
            request_timeout: Duration::from_secs(parse(
                "ORDERS_REQUEST_TIMEOUT_SECS",
                &get("ORDERS_REQUEST_TIMEOUT_SECS", "30"),
            )?),
            catalog_styles: split_list(&get("ORDERS_CATALOG_STYLES", DEFAULT_CATALOG_STYLES)),
            catalog_types: split_list(&get("ORDERS_CATALOG_TYPES", DEFAULT_CATALOG_TYPES)),
        };

        info!(api_url = %config.api_url, session_file = %config.session_file.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            filter_debounce: self.filter_debounce,
            catalog_styles: self.catalog_styles.clone(),
            catalog_kinds: self.catalog_types.clone(),
            ..ViewSettings::default()
        }
    }
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: format!("'{raw}': {e}"),
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
