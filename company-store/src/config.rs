//! Layered configuration for the dashboard.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`RESEARCH_DASHBOARD_*`, `__` separates sections)
//! 2. Built-in defaults
//!
//! `RESEARCH_DASHBOARD_API__BASE_URL` maps to `api.base_url`,
//! `RESEARCH_DASHBOARD_SELECTION__ON_LOOKUP_FAILURE` to
//! `selection.on_lookup_failure`. The browser build has no process
//! environment, so it layers compile-time values on top via [`DashboardConfig::figment`].

use crate::error::ConfigError;
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "RESEARCH_DASHBOARD_";

pub const DEFAULT_STORAGE_KEY: &str = "selected_company";
pub const DEFAULT_QUERY_PARAM: &str = "company";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_AUTH_TOKEN_KEY: &str = "auth_token";

const fn default_search_debounce_ms() -> u32 {
    250
}

/// What hydration does when the URL names a company the lookup cannot resolve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Leave the selection empty for this page load.
    #[default]
    FailClosed,
    /// Fall back to the persisted selection, if any.
    UseStorage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Local storage key holding the JSON summary.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// URL query parameter holding the company id.
    #[serde(default = "default_query_param")]
    pub query_param: String,

    #[serde(default)]
    pub on_lookup_failure: LookupFailurePolicy,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_query_param() -> String {
    DEFAULT_QUERY_PARAM.to_string()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            query_param: default_query_param(),
            on_lookup_failure: LookupFailurePolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local storage key holding the backend auth token.
    #[serde(default = "default_auth_token_key")]
    pub auth_token_key: String,

    /// Delay between the last keystroke and the company search request.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u32,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_auth_token_key() -> String {
    DEFAULT_AUTH_TOKEN_KEY.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token_key: default_auth_token_key(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl ApiConfig {
    /// Join a backend path onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl DashboardConfig {
    /// Load defaults overlaid with `RESEARCH_DASHBOARD_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Build the provider chain. Public so callers can merge extra layers.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract from an arbitrary figment and validate the result.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("selection.storage_key", &self.selection.storage_key),
            ("selection.query_param", &self.selection.query_param),
            ("api.base_url", &self.api.base_url),
            ("api.auth_token_key", &self.api.auth_token_key),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
