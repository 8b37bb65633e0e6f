//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The Pi API key is deliberately
//! optional here: handlers that need it fail closed at request time.

use std::fmt;
use std::net::SocketAddr;

/// Default upstream Pi platform API base.
pub const DEFAULT_PI_API_BASE: &str = "https://api.minepi.com/v2";

/// Validation token served when `PI_VALIDATION_KEY` is not set.
pub const FALLBACK_VALIDATION_KEY: &str = "a0fb2d1fe6ea9476745db32b85b9d8bb7b833b75c3f17d9d6ecfc25163387837275be022971d14374eba7f6b4743819bd66c6d4d28588d1b004473b7172c6e36";

/// Wallet SDK protocol version passed to `init`.
pub const SDK_VERSION: &str = "2.0";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR: {0}")]
    InvalidListenAddr(#[from] std::net::AddrParseError),

    /// A variable required by the selected options is missing.
    #[error("{0} not configured")]
    Missing(&'static str),

    /// A variable has an unsupported value.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Server-side Pi API key.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, returning `None` for empty or whitespace-only input.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the `Authorization` header value (`Key <secret>`).
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Key {}", self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Backend used for the mock payment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-lifetime in-memory table.
    Memory,
    /// PostgreSQL table (requires `DATABASE_URL`).
    Postgres,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Server-side key for the Pi platform API. `None` when unset.
    pub pi_api_key: Option<ApiKey>,

    /// Base URL of the Pi platform API, without trailing slash.
    pub pi_api_base_url: String,

    /// Whether the app targets the sandbox (Testnet) environment.
    pub sandbox: bool,

    /// App id passed to the wallet SDK's `init`.
    pub app_id: Option<String>,

    /// Domain validation token served under `/.well-known`.
    pub validation_key: String,

    /// Auto-cancel ongoing payments and treat "already completed" as
    /// success.
    pub payment_recovery: bool,

    /// Mock payment store backend.
    pub store_backend: StoreBackend,

    /// PostgreSQL connection string, required for [`StoreBackend::Postgres`].
    pub database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Inbound request timeout in seconds (0 = disabled).
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LISTEN_ADDR` cannot be parsed, if
    /// `MOCK_STORE_BACKEND` is unknown, or if the postgres backend is
    /// selected without `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let pi_api_key = std::env::var("PI_API_KEY")
            .ok()
            .and_then(|k| ApiKey::new(&k));

        let pi_api_base_url = std::env::var("PI_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let sandbox = parse_env_bool("PI_SANDBOX", false);
        let app_id = non_empty_env("PI_APP_ID");
        let validation_key = non_empty_env("PI_VALIDATION_KEY")
            .unwrap_or_else(|| FALLBACK_VALIDATION_KEY.to_string())
            .trim()
            .to_string();
        let payment_recovery = parse_env_bool("PI_PAYMENT_RECOVERY", true);

        let store_backend = match non_empty_env("MOCK_STORE_BACKEND").as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "MOCK_STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let database_url = non_empty_env("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 5);
        let database_connect_timeout_secs = parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5);
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 0);

        let log_format = match non_empty_env("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            pi_api_key,
            pi_api_base_url,
            sandbox,
            app_id,
            validation_key,
            payment_recovery,
            store_backend,
            database_url,
            database_max_connections,
            database_connect_timeout_secs,
            request_timeout_secs,
            log_format,
        })
    }

    /// Configuration suitable for tests: in-memory store, no key, the
    /// given upstream base URL.
    #[doc(hidden)]
    #[must_use]
    pub fn for_upstream(pi_api_base_url: &str) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            pi_api_key: None,
            pi_api_base_url: pi_api_base_url.trim_end_matches('/').to_string(),
            sandbox: true,
            app_id: None,
            validation_key: FALLBACK_VALIDATION_KEY.to_string(),
            payment_recovery: true,
            store_backend: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 5,
            database_connect_timeout_secs: 5,
            request_timeout_secs: 0,
            log_format: LogFormat::Pretty,
        }
    }

    /// Returns a copy with the given API key set.
    #[doc(hidden)]
    #[must_use]
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.pi_api_key = ApiKey::new(key);
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
