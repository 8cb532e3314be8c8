//! Name Ledger Client
//!
//! Client-side verification for a blockchain name system whose indexing
//! server is only partially trusted:
//!
//! - **Queries**: names, costs, namespaces and consensus hashes, with every
//!   reply checked against its wire schema ([`names`], [`consensus`])
//! - **Records**: current name and namespace records and predicates over
//!   them ([`records`])
//! - **Verification**: reconstruct the operations at a block as they were
//!   written, ready to be re-hashed against the consensus hash ([`snv`])
//! - **Atlas**: zonefile inventories and content-addressed zonefile
//!   exchange with peers ([`atlas`], [`zonefile`])
//!
//! Transport, schema checks and pagination live in `bns-transport`; history
//! replay lives in `bns-history`.

#![allow(clippy::result_large_err)]

pub mod atlas;
pub mod client;
pub mod consensus;
pub mod names;
pub mod records;
pub mod snv;
pub mod zonefile;

pub use atlas::AtlasClient;
pub use client::LedgerClient;
pub use zonefile::{hash160, verify_zonefile, zonefile_hash};

pub use bns_history::{ConsensusQuirks, HistoryError, LegacyQuirks};
pub use bns_transport::{ErrorKind, RpcError, RpcMethod, Transport, XmlRpcTransport};
pub use bns_types::{
    ClientConfig, ConsensusHash, HistoryRow, NameOperation, NameRecord, NamespaceOperation,
    NamespaceRecord, PeerAddress, ReconstructedRecord,
};
