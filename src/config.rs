use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub http_timeout_secs: u64,
    pub page_size: usize,
    /// Quiet period after a fetch completes before scroll-driven load
    /// signals are honored again.
    pub scroll_cooldown_ms: u64,
    /// Where the client shadow store lives; `None` keeps state in memory.
    pub storage_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| "https://dummyjson.com".to_string());
        let http_timeout_secs = env::var("APP_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        let page_size = env::var("APP_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(10);
        let scroll_cooldown_ms = env::var("APP_SCROLL_COOLDOWN_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1500);
        let storage_path = env::var("APP_STORAGE_PATH").ok().map(PathBuf::from);
        Ok(Self {
            api_base_url,
            http_timeout_secs,
            page_size,
            scroll_cooldown_ms,
            storage_path,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://dummyjson.com".to_string(),
            http_timeout_secs: 10,
            page_size: 10,
            scroll_cooldown_ms: 1500,
            storage_path: None,
        }
    }
}
