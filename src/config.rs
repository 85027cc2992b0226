//! Runtime configuration loaded from environment variables.
//!
//! - `TASKPULSE_DB_PATH` - SQLite file (default: platform data dir)
//! - `OPENAI_API_KEY` - bearer credential for the text-generation API (optional)
//! - `TASKPULSE_LLM_MODEL` - model name (default: `gpt-3.5-turbo`)
//! - `TASKPULSE_LLM_ENDPOINT` - API base URL (default: `https://api.openai.com`)
//! - `TASKPULSE_LLM_TIMEOUT_SECS` - request timeout (default: 30)
//! - `TASKPULSE_CACHE_DAILY_STATS` - write computed daily stats to the cache table

use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Explicit database location. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    pub llm: LlmConfig,
    pub cache_daily_stats: bool,
}

/// Text-generation API settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Absent means insights always come from the local heuristic.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match non_empty("TASKPULSE_LLM_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => secs.max(1),
                Err(_) => {
                    tracing::warn!(
                        "Ignoring invalid TASKPULSE_LLM_TIMEOUT_SECS={}, using {}",
                        raw,
                        DEFAULT_TIMEOUT_SECS
                    );
                    DEFAULT_TIMEOUT_SECS
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let cache_daily_stats = match non_empty("TASKPULSE_CACHE_DAILY_STATS") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    tracing::warn!("Ignoring invalid TASKPULSE_CACHE_DAILY_STATS={}", raw);
                    false
                }
            },
            None => false,
        };

        Self {
            database_path: non_empty("TASKPULSE_DB_PATH").map(PathBuf::from),
            llm: LlmConfig {
                api_key: non_empty("OPENAI_API_KEY"),
                model: non_empty("TASKPULSE_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                endpoint: non_empty("TASKPULSE_LLM_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
                timeout_secs,
            },
            cache_daily_stats,
        }
    }
}
