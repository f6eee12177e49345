use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the catalog service that answers candidate queries.
    pub catalog_url: String,
    /// Budget for a single source fetch; a source that overruns it counts as empty.
    pub catalog_timeout_ms: u64,
    pub catalog_user_agent: String,
    pub nearby_radius_km: f64,
    pub left_capacity: usize,
    pub right_capacity: usize,
    pub bottom_capacity: usize,
}
