#[derive(Clone)]
pub struct AppConfig {
    /// Required only by commands that touch persistence.
    pub database_url: Option<String>,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Per-request budget for plain HTTP adapters.
    pub request_timeout_secs: u64,
    /// Per-request budget for rendering-based adapters, which need longer.
    pub render_timeout_secs: u64,
    pub user_agent: String,
    /// Cap on concurrently in-flight MPNs during batch lookups.
    pub max_concurrent_mpns: usize,
    /// Headless browser binary used by the rendered fallback path.
    pub browser_bin: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("log_level", &self.log_level)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_mpns", &self.max_concurrent_mpns)
            .field("browser_bin", &self.browser_bin)
            .finish()
    }
}
