use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

use crate::services::llm_service::{LlmConfig, OPENAI_BASE_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub fmp_api_key: Option<String>,
    pub fmp_base_url: Option<String>,
    pub synthetic_seed: Option<u64>,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = LlmConfig::default();
        let llm = LlmConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_or(get("OPENAI_MAX_TOKENS"), "OPENAI_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or(get("OPENAI_TEMPERATURE"), "OPENAI_TEMPERATURE", defaults.temperature)?,
            timeout: defaults.timeout,
        };

        Ok(Self {
            host: parse_or(get("HOST"), "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(get("PORT"), "PORT", 3000)?,
            fmp_api_key: get("FMP_API_KEY"),
            fmp_base_url: get("FMP_BASE_URL"),
            synthetic_seed: get("SYNTHETIC_SEED")
                .map(|v| parse_or(Some(v), "SYNTHETIC_SEED", 0))
                .transpose()?,
            llm,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
