//! Shared types for the bns-snv workspace.
//!
//! This crate holds the value types every other crate passes around: the
//! operations the indexing server reports, the history log they are replayed
//! from, consensus hashes, peer addresses and the client configuration.
//!
//! ## Wire formats
//!
//! The [`patterns`] module contains the fixed-format checks (transaction
//! ids, consensus hashes, names, scripts) applied to every untrusted field
//! after it has been deserialized.

pub mod config;
pub mod consensus;
pub mod env_utils;
pub mod history;
pub mod nameop;
pub mod opcode;
pub mod patterns;
pub mod peer;
pub mod serde_util;
pub mod server;

// Re-export commonly used types at crate root
pub use config::ClientConfig;
pub use consensus::ConsensusHash;
pub use history::{HistoryEntry, HistoryLog, HistoryRow, OpIdentity, ReconstructedRecord};
pub use nameop::{NameOperation, NameRecord, NamespaceOperation, NamespaceRecord};
pub use opcode::Opcode;
pub use peer::PeerAddress;
pub use server::ServerInfo;

/// Field map of a JSON object, the shape history snapshots are replayed in.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;
