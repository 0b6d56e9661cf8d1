// Application configuration, loaded with the 'config' crate and 'dotenv'

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::SearchError;

pub const DEFAULT_BASE_URL: &str = "https://mc-api.marketcheck.com/v2";
pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_address: String,
    // Inventory search API
    pub api_key: Option<String>,
    pub base_url: String,
    pub page_size: u32,
    // Optional outbound proxy for the inventory client
    pub proxy_url: Option<String>,
    // Browser key for the Places autocomplete; without it the page asks for coordinates
    pub maps_api_key: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))?
            // Optional config.toml next to the binary
            .add_source(File::with_name("config").required(false))
            // Environment variables, e.g. APP_API_KEY, APP_PAGE_SIZE, APP_MAPS_API_KEY
            .add_source(Environment::with_prefix("APP").try_parsing(true));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

/// Everything the query builder needs besides the criteria.
///
/// Passed explicitly so building a query stays a pure function of
/// `(criteria, config)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub api_key: String,
    pub base_url: String,
    pub page_size: u32,
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    // Fails before any request is built when the key is missing
    pub fn from_settings(settings: &Settings) -> Result<Self, SearchError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SearchError::MissingSetting {
                setting: "api_key",
                env_var: "APP_API_KEY",
            })?;

        Ok(Self::new(api_key)
            .with_base_url(settings.base_url.trim())
            .with_page_size(settings.page_size))
    }

    // Page size sent as `rows`
    pub fn rows(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> Settings {
        Settings {
            server_address: "127.0.0.1:3000".to_string(),
            api_key: api_key.map(str::to_string),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 80,
            proxy_url: None,
            maps_api_key: None,
        }
    }

    #[test]
    fn missing_api_key_names_the_setting() {
        for key in [None, Some(""), Some("   ")] {
            let err = SearchConfig::from_settings(&settings(key)).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("api_key"), "{message}");
            assert!(message.contains("APP_API_KEY"), "{message}");
        }
    }

    #[test]
    fn search_config_carries_settings() {
        let config = SearchConfig::from_settings(&settings(Some(" secret "))).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 80);
    }

    #[test]
    fn rows_are_clamped() {
        assert_eq!(SearchConfig::new("k").rows(), 24);
        assert_eq!(SearchConfig::new("k").with_page_size(80).rows(), 50);
        assert_eq!(SearchConfig::new("k").with_page_size(0).rows(), 1);
    }
}
