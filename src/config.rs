//! Server configuration with sensible defaults.
//!
//! [`ServerConfig`] controls where the mock listens and how much artificial
//! latency each invocation gets. Only the port is read from the environment.

use crate::error::MockError;

/// Environment variable holding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Port used when [`PORT_ENV`] is unset or blank.
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration for a [`MockServer`](crate::server::MockServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind. `0` asks the OS for a free port.
    pub port: u16,
    /// Artificial delay window in milliseconds, `[min, max)`.
    /// A window with `min == max` sleeps exactly `min`.
    pub latency_ms: (u64, u64),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
            latency_ms: (100, 300),
        }
    }
}

impl ServerConfig {
    /// Build a config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Config`] if `PORT` is set but is not a valid port.
    pub fn from_env() -> Result<Self, MockError> {
        Self::with_port_value(std::env::var(PORT_ENV).ok().as_deref())
    }

    /// Build a config from a raw `PORT` value, as read from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Config`] if the value is not a valid port number.
    pub fn with_port_value(raw: Option<&str>) -> Result<Self, MockError> {
        let mut config = Self::default();
        if let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) {
            config.port = raw.parse().map_err(|e| {
                MockError::Config(format!("{PORT_ENV} must be a port number, got {raw:?}: {e}"))
            })?;
        }
        Ok(config)
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Config`] if the host is blank or the latency
    /// window is inverted.
    pub fn validate(&self) -> Result<(), MockError> {
        if self.host.trim().is_empty() {
            return Err(MockError::Config("host must not be empty".into()));
        }
        if self.latency_ms.0 > self.latency_ms.1 {
            return Err(MockError::Config("latency_ms min must be <= max".into()));
        }
        Ok(())
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
