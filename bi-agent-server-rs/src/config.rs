use anyhow::{Context, Result};
use bi_agent_sdk_rs::agent::AgentConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub app_env: String,
    pub log_level: String,
    pub openai_api_key: Option<String>,
    pub static_dir: PathBuf,
    pub classify_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 7000)?,
            app_env: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            classify_timeout: Duration::from_secs(parse_or(
                get("CLASSIFY_TIMEOUT_SECS"),
                "CLASSIFY_TIMEOUT_SECS",
                30,
            )?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            classify_timeout: self.classify_timeout,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, value)),
        None => Ok(default),
    }
}
