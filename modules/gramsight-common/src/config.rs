use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for per-account data files.
    pub data_dir: PathBuf,

    // Scraping
    pub apify_api_token: String,

    // Embedding backend (OpenAI-compatible). Optional: when absent the
    // similarity engine runs in its hashtag-overlap fallback mode.
    pub embedding_api_key: Option<String>,
    pub embedding_base_url: String,
    pub embedding_model: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration for the ingest pipeline.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            data_dir: data_dir_from_env(),
            apify_api_token: required_env("APIFY_API_TOKEN"),
            embedding_api_key: env::var("EMBEDDING_API_KEY").ok(),
            embedding_base_url: env::var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            web_host: web_host_from_env(),
            web_port: web_port_from_env(),
        }
    }

    /// Load a minimal config for the web server (read-only, no scraper token).
    pub fn web_from_env() -> Self {
        Self {
            data_dir: data_dir_from_env(),
            apify_api_token: String::new(),
            embedding_api_key: env::var("EMBEDDING_API_KEY").ok(),
            embedding_base_url: env::var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            web_host: web_host_from_env(),
            web_port: web_port_from_env(),
        }
    }
}

fn data_dir_from_env() -> PathBuf {
    PathBuf::from(env::var("GRAMSIGHT_DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

fn web_host_from_env() -> String {
    env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}

fn web_port_from_env() -> u16 {
    env::var("WEB_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .expect("WEB_PORT must be a number")
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
