use std::env;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4";
pub const DEFAULT_SECONDARY_MODEL: &str = "gpt-3.5-turbo";

/// Process configuration, read once at startup and handed to the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Not validated here; a missing key surfaces as the endpoint's own error.
    pub api_key: Option<String>,
    pub api_url: String,
    pub primary_model: String,
    pub secondary_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            secondary_model: DEFAULT_SECONDARY_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        AppConfig {
            api_key: get("OPENAI_API_KEY"),
            api_url: get("HUAYU_API_URL").unwrap_or(defaults.api_url),
            primary_model: get("HUAYU_PRIMARY_MODEL").unwrap_or(defaults.primary_model),
            secondary_model: get("HUAYU_SECONDARY_MODEL").unwrap_or(defaults.secondary_model),
        }
    }
}
