//! Atlas peer addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `host:port` pair. The port is never 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerAddress {
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(host: &str, port: u16) -> Result<Self, String> {
        if host.is_empty() || host.contains(':') {
            return Err(format!("invalid peer host '{}'", host));
        }
        if port == 0 {
            return Err("peer port must be in 1..=65535".to_string());
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// The stricter form peers advertise in Atlas listings: the port has
    /// 2-5 digits and no leading zero.
    pub fn is_listing_form(s: &str) -> bool {
        let Some((host, port)) = s.split_once(':') else {
            return false;
        };
        !host.is_empty()
            && !port.contains(':')
            && (2..=5).contains(&port.len())
            && !port.starts_with('0')
            && port.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/RPC2", self.host, self.port)
    }
}

impl FromStr for PeerAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .split_once(':')
            .ok_or_else(|| format!("peer address '{}' is not host:port", s))?;
        let port: u16 = port
            .parse()
            .map_err(|_| format!("peer address '{}' has an invalid port", s))?;
        Self::new(host, port)
    }
}

impl TryFrom<String> for PeerAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeerAddress> for String {
    fn from(value: PeerAddress) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
