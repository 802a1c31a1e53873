//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub websocket: WebSocketConfig,
    pub hub: HubConfig,
    pub pages: PagesConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Service identity; admission tokens must carry it as their issuer
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// User-profile database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Revocation store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Per-connection protocol limits and timers
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    /// Deadline for a single frame write
    pub write_wait: Duration,
    /// Read deadline, refreshed by every pong from the peer
    pub pong_wait: Duration,
    /// Keepalive ping interval, strictly shorter than `pong_wait`
    pub ping_period: Duration,
    /// Largest inbound message accepted, in bytes
    pub max_message_size: usize,
    /// Outbound queue capacity per connection
    pub send_buffer: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        let pong_wait = default_pong_wait();
        Self {
            write_wait: default_write_wait(),
            pong_wait,
            ping_period: ping_period_for(pong_wait),
            max_message_size: default_max_message_size(),
            send_buffer: default_send_buffer(),
        }
    }
}

impl WebSocketConfig {
    /// Check the invariants between the timers and buffers
    ///
    /// # Errors
    /// Returns an error if pings would not arrive before the read deadline, or a
    /// size/capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ping_period.is_zero() || self.ping_period >= self.pong_wait {
            return Err(ConfigError::InvalidValue(
                "WS_PING_PERIOD_MS",
                format!(
                    "{}ms must be non-zero and below the pong wait of {}ms",
                    self.ping_period.as_millis(),
                    self.pong_wait.as_millis()
                ),
            ));
        }
        if self.write_wait.is_zero() {
            return Err(ConfigError::InvalidValue(
                "WS_WRITE_WAIT_SECS",
                "must be non-zero".to_string(),
            ));
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::InvalidValue(
                "WS_MAX_MESSAGE_SIZE",
                "must be non-zero".to_string(),
            ));
        }
        if self.send_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "WS_SEND_BUFFER",
                "must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hub control loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Capacity of the register/unregister/broadcast command queue
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
        }
    }
}

/// Static page configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PagesConfig {
    #[serde(default = "default_chat_page")]
    pub chat_page: PathBuf,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            chat_page: default_chat_page(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_write_wait() -> Duration {
    Duration::from_secs(10)
}

fn default_pong_wait() -> Duration {
    Duration::from_secs(10)
}

/// Pings go out at 90% of the read deadline
fn ping_period_for(pong_wait: Duration) -> Duration {
    pong_wait * 9 / 10
}

fn default_max_message_size() -> usize {
    512
}

fn default_send_buffer() -> usize {
    256
}

fn default_command_buffer() -> usize {
    1024
}

fn default_chat_page() -> PathBuf {
    PathBuf::from("chat.html")
}

/// Read an optional variable, failing loudly on values that do not parse
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing, a value does
    /// not parse, or the websocket timers are inconsistent
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let pong_wait = parse_var::<u64>("WS_PONG_WAIT_SECS")?
            .map_or_else(default_pong_wait, Duration::from_secs);

        let websocket = WebSocketConfig {
            write_wait: parse_var::<u64>("WS_WRITE_WAIT_SECS")?
                .map_or_else(default_write_wait, Duration::from_secs),
            pong_wait,
            ping_period: parse_var::<u64>("WS_PING_PERIOD_MS")?
                .map_or_else(|| ping_period_for(pong_wait), Duration::from_millis),
            max_message_size: parse_var("WS_MAX_MESSAGE_SIZE")?
                .unwrap_or_else(default_max_message_size),
            send_buffer: parse_var("WS_SEND_BUFFER")?.unwrap_or_else(default_send_buffer),
        };
        websocket.validate()?;

        let hub = HubConfig {
            command_buffer: parse_var("HUB_COMMAND_BUFFER")?
                .unwrap_or_else(default_command_buffer),
        };
        if hub.command_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "HUB_COMMAND_BUFFER",
                "0".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            gateway: ServerConfig {
                host: env::var("GATEWAY_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("GATEWAY_PORT")?.ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?,
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            redis: RedisConfig {
                url: required_var("REDIS_URL")?,
                max_connections: parse_var("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            },
            jwt: JwtConfig {
                secret: required_var("JWT_SECRET")?,
            },
            websocket,
            hub,
            pages: PagesConfig {
                chat_page: env::var("CHAT_PAGE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_chat_page()),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
