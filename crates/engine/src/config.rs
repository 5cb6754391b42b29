//! Application configuration

use std::env;

use anyhow::{Context, Result};

use crate::infrastructure::ollama::{
    DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL,
};
use crate::infrastructure::sqlite::DEFAULT_DATABASE_URL;

/// Application configuration loaded from environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server_host: String,
    /// HTTP port; `SERVER_PORT` wins over `PORT`
    pub server_port: u16,

    /// SQLite connection string
    pub database_url: String,

    /// Ollama API base URL (OpenAI-compatible)
    pub ollama_base_url: String,
    /// Model used for narration
    pub ollama_model: String,
    pub llm_timeout_secs: u64,

    /// CORS allowed origins ("*" for any). Empty disables the CORS layer.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: var("SERVER_PORT")
                .or_else(|| var("PORT"))
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),

            ollama_base_url: var("OLLAMA_BASE_URL")
                .or_else(|| var("OLLAMA_URL"))
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            ollama_model: var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            llm_timeout_secs: match var("LLM_TIMEOUT_SECS") {
                Some(value) => value
                    .parse()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
                None => DEFAULT_LLM_TIMEOUT_SECS,
            },

            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.ollama_model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.llm_timeout_secs, DEFAULT_LLM_TIMEOUT_SECS);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, http://127.0.0.1:5173"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.ollama_base_url, "http://gpu-box:11434");
        assert_eq!(config.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn server_port_takes_precedence_over_port() {
        let config = load(&[("SERVER_PORT", "4000"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.server_port, 4000);
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(load(&[("SERVER_PORT", "not-a-port")]).is_err());
    }
}
