use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Base URL of the project service answering membership queries.
    pub membership_url: String,
    /// Timeout for a single membership query in milliseconds (default: `2000`).
    pub membership_timeout_ms: u64,
    /// Attempts for a chain mutation that hits a lock or serialization
    /// conflict (default: `3`).
    pub chain_retry_limit: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `MEMBERSHIP_SERVICE_URL` | `http://localhost:8001`    |
    /// | `MEMBERSHIP_TIMEOUT_MS`  | `2000`                     |
    /// | `CHAIN_RETRY_LIMIT`      | `3`                        |
    ///
    /// `JWT_SECRET` is read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let membership_url = std::env::var("MEMBERSHIP_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8001".into())
            .trim_end_matches('/')
            .to_string();

        let membership_timeout_ms: u64 = std::env::var("MEMBERSHIP_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("MEMBERSHIP_TIMEOUT_MS must be a valid u64");

        let chain_retry_limit: u32 = std::env::var("CHAIN_RETRY_LIMIT")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("CHAIN_RETRY_LIMIT must be a valid u32");
        assert!(chain_retry_limit > 0, "CHAIN_RETRY_LIMIT must be at least 1");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            membership_url,
            membership_timeout_ms,
            chain_retry_limit,
        }
    }
}
