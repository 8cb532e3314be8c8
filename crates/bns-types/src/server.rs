//! Server status as reported by `getinfo`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub last_block_seen: u64,
    pub consensus: String,
    pub server_version: String,
    pub last_block_processed: u64,
    pub server_alive: bool,
    pub indexing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zonefile_count: Option<u64>,
}
