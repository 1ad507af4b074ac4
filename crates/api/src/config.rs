use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// OpenAI-compatible chat-completions endpoint for the AI reviser.
    pub reviser_url: String,
    /// Model name passed to the reviser endpoint.
    pub reviser_model: String,
    /// Optional bearer token for the reviser endpoint.
    pub reviser_api_key: Option<String>,
    /// Reviser request timeout, in seconds.
    pub reviser_timeout_secs: u64,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3030".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            reviser_url: env::var("REVISER_URL")?,
            reviser_model: env::var("REVISER_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            reviser_api_key: env::var("REVISER_API_KEY").ok(),
            reviser_timeout_secs: env::var("REVISER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("REVISER_TIMEOUT_SECS must be a valid u64"),
            event_bus_capacity: env::var("EVENT_BUS_CAPACITY")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .expect("EVENT_BUS_CAPACITY must be a valid usize"),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
