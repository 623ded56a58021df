//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USERS_*` environment variables and optional
//! configuration files, in OrthoConfig's usual precedence. Optional fields
//! fall back to the defaults exposed by the accessors below.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_NAME: &str = "mydb";
const DEFAULT_DB_SSLMODE: &str = "disable";
const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_MAX_SIZE: u32 = 10;
const DEFAULT_CONNECT_RETRIES: u32 = 30;

/// Pause between database connection attempts at startup.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Errors raised when settings are present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No API key was configured, or it was blank.
    #[error("USERS_API_KEY must be set to a non-empty value")]
    MissingApiKey,
    /// The bind address did not parse as `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
    /// The `db_*` fields do not form a valid connection URL.
    #[error("invalid database settings: {message}")]
    InvalidDatabaseUrl { message: String },
}

impl ConfigError {
    fn database_url(message: impl Into<String>) -> Self {
        Self::InvalidDatabaseUrl {
            message: message.into(),
        }
    }
}

/// Settings controlling the HTTP server and its database connection.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Shared secret expected in the `X-API-KEY` header.
    pub api_key: Option<String>,
    /// Full connection URL; overrides the individual `db_*` fields.
    pub database_url: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub db_sslmode: Option<String>,
    /// Upper bound for each repository operation, in seconds.
    pub exec_timeout_secs: Option<u64>,
    /// Maximum number of pooled connections.
    pub db_max_size: Option<u32>,
    /// Attempts made to reach the database before giving up.
    pub connect_retries: Option<u32>,
    /// Serve from the in-memory repository instead of PostgreSQL.
    #[ortho_config(default = false)]
    pub in_memory: bool,
}

impl ServerSettings {
    /// The configured API key with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when unset or blank.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| ConfigError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// PostgreSQL connection URL.
    ///
    /// Uses `database_url` verbatim when set, otherwise assembles one from
    /// the `db_*` fields with the credentials percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDatabaseUrl`] when the host or port
    /// cannot form a URL.
    ///
    /// # Examples
    /// ```
    /// use users_backend::config::ServerSettings;
    ///
    /// let settings = ServerSettings {
    ///     bind_addr: None,
    ///     api_key: Some("secret".into()),
    ///     database_url: None,
    ///     db_host: Some("db".into()),
    ///     db_port: None,
    ///     db_user: None,
    ///     db_password: Some("p@ss".into()),
    ///     db_name: None,
    ///     db_sslmode: None,
    ///     exec_timeout_secs: None,
    ///     db_max_size: None,
    ///     connect_retries: None,
    ///     in_memory: false,
    /// };
    /// assert_eq!(
    ///     settings.database_url().expect("valid settings"),
    ///     "postgres://postgres:p%40ss@db:5432/mydb?sslmode=disable"
    /// );
    /// ```
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.database_url.as_deref().filter(|url| !url.trim().is_empty()) {
            return Ok(url.to_owned());
        }
        let host = self.db_host.as_deref().unwrap_or(DEFAULT_DB_HOST);
        let port = self.db_port.unwrap_or(DEFAULT_DB_PORT);
        let mut url = Url::parse(&format!("postgres://{host}:{port}"))
            .map_err(|err| ConfigError::database_url(format!("host {host:?}: {err}")))?;

        url.path_segments_mut()
            .map_err(|()| ConfigError::database_url("URL cannot carry a database name"))?
            .clear()
            .push(self.db_name.as_deref().unwrap_or(DEFAULT_DB_NAME));
        url.set_username(self.db_user.as_deref().unwrap_or(DEFAULT_DB_USER))
            .map_err(|()| ConfigError::database_url("URL cannot carry a user name"))?;
        if let Some(password) = self.db_password.as_deref().filter(|pw| !pw.is_empty()) {
            url.set_password(Some(password))
                .map_err(|()| ConfigError::database_url("URL cannot carry a password"))?;
        }
        url.query_pairs_mut().append_pair(
            "sslmode",
            self.db_sslmode.as_deref().unwrap_or(DEFAULT_DB_SSLMODE),
        );
        Ok(url.into())
    }

    /// Per-operation repository timeout.
    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs.unwrap_or(DEFAULT_EXEC_TIMEOUT_SECS))
    }

    /// Maximum pool size.
    pub fn db_max_size(&self) -> u32 {
        self.db_max_size.unwrap_or(DEFAULT_DB_MAX_SIZE)
    }

    /// Number of connection attempts at startup, never less than one.
    pub fn connect_retries(&self) -> u32 {
        self.connect_retries.unwrap_or(DEFAULT_CONNECT_RETRIES).max(1)
    }
}
