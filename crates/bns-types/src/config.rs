//! Client connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::env_utils::{env_string_or, env_var_or};

/// Default indexing server host.
pub const DEFAULT_SERVER: &str = "localhost";
/// Default indexing server RPC port.
pub const DEFAULT_PORT: u16 = 6264;
/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where and how to reach the indexing server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server: String,
    pub port: u16,
    /// Per-call timeout, covering the whole request/response exchange.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build a config from the environment.
    ///
    /// - `BNS_SERVER` - server host (default: `localhost`)
    /// - `BNS_PORT` - server port (default: `6264`)
    /// - `BNS_TIMEOUT_SECS` - per-call timeout (default: 30)
    /// - `BNS_CONNECT_TIMEOUT_SECS` - connect timeout (default: 10)
    pub fn from_env() -> Self {
        Self {
            server: env_string_or("BNS_SERVER", DEFAULT_SERVER),
            port: env_var_or("BNS_PORT", DEFAULT_PORT),
            timeout: Duration::from_secs(env_var_or("BNS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            connect_timeout: Duration::from_secs(env_var_or(
                "BNS_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        }
    }

    pub fn new(server: &str, port: u16) -> Self {
        Self {
            server: server.to_string(),
            port,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The XML-RPC endpoint URL for this server.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/RPC2", self.server, self.port)
    }
}
