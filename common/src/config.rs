use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DATABASES_DIR: &str = "databases";
const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";
const DEFAULT_MODEL: &str = "sql";
const DEFAULT_API_KEY: &str = "not-needed";
const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

/// connection settings for the chat-completion endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl LlmConfig {
    /// explicit values win, then ASKDB_LLM_* variables, then defaults
    pub fn resolve(
        base_url: Option<String>,
        model: Option<String>,
        api_key: Option<String>,
        temperature: Option<f32>,
    ) -> Self {
        let defaults = Self::default();

        let base_url = base_url
            .or_else(|| env_value("ASKDB_LLM_BASE_URL"))
            .unwrap_or(defaults.base_url);

        let model = model
            .or_else(|| env_value("ASKDB_LLM_MODEL"))
            .unwrap_or(defaults.model);

        let api_key = api_key
            .or_else(|| env_value("ASKDB_LLM_API_KEY"))
            .unwrap_or(defaults.api_key);

        let temperature = temperature
            .or_else(|| env_value("ASKDB_LLM_TEMPERATURE").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.temperature);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            temperature,
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

pub fn resolve_databases_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.or_else(|| env_value("ASKDB_DATABASES_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASES_DIR))
}

pub fn resolve_listen_addr(addr: Option<SocketAddr>) -> SocketAddr {
    addr.or_else(|| env_value("ASKDB_LISTEN_ADDR").and_then(|v| v.parse().ok()))
        .unwrap_or_else(|| {
            DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8501)))
        })
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}
