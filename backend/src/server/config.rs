//! HTTP server configuration derived from [`ServerSettings`].

use std::net::SocketAddr;

use users_backend::ApiKey;
use users_backend::config::{ConfigError, ServerSettings};

/// Validated values needed to start the listener.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) api_key: ApiKey,
}

impl ServerConfig {
    /// Validate settings into a server configuration.
    ///
    /// # Errors
    ///
    /// Fails when the API key is missing or the bind address is malformed.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            api_key: ApiKey::new(settings.api_key()?),
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
