//! The closed set of remote methods.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::validate::CheckResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RpcMethod {
    Ping,
    GetInfo,
    GetNameCost,
    GetNamespaceCost,
    GetNumNames,
    GetAllNames,
    GetNumNamesInNamespace,
    GetNamesInNamespace,
    GetNamesOwnedByAddress,
    GetConsensusAt,
    GetConsensusHashes,
    GetBlockFromConsensus,
    GetNameHistoryBlocks,
    GetNameAt,
    GetNumOpHistoryRows,
    GetOpHistoryRows,
    GetNumNameopsAffectedAt,
    GetNameopsAffectedAt,
    GetNameopsHashAt,
    GetNameBlockchainRecord,
    GetNamespaceBlockchainRecord,
    GetZonefileInventory,
    GetAtlasPeers,
    GetZonefiles,
    PutZonefiles,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 25] = [
        RpcMethod::Ping,
        RpcMethod::GetInfo,
        RpcMethod::GetNameCost,
        RpcMethod::GetNamespaceCost,
        RpcMethod::GetNumNames,
        RpcMethod::GetAllNames,
        RpcMethod::GetNumNamesInNamespace,
        RpcMethod::GetNamesInNamespace,
        RpcMethod::GetNamesOwnedByAddress,
        RpcMethod::GetConsensusAt,
        RpcMethod::GetConsensusHashes,
        RpcMethod::GetBlockFromConsensus,
        RpcMethod::GetNameHistoryBlocks,
        RpcMethod::GetNameAt,
        RpcMethod::GetNumOpHistoryRows,
        RpcMethod::GetOpHistoryRows,
        RpcMethod::GetNumNameopsAffectedAt,
        RpcMethod::GetNameopsAffectedAt,
        RpcMethod::GetNameopsHashAt,
        RpcMethod::GetNameBlockchainRecord,
        RpcMethod::GetNamespaceBlockchainRecord,
        RpcMethod::GetZonefileInventory,
        RpcMethod::GetAtlasPeers,
        RpcMethod::GetZonefiles,
        RpcMethod::PutZonefiles,
    ];

    /// The name sent in `<methodName>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::Ping => "ping",
            RpcMethod::GetInfo => "getinfo",
            RpcMethod::GetNameCost => "get_name_cost",
            RpcMethod::GetNamespaceCost => "get_namespace_cost",
            RpcMethod::GetNumNames => "get_num_names",
            RpcMethod::GetAllNames => "get_all_names",
            RpcMethod::GetNumNamesInNamespace => "get_num_names_in_namespace",
            RpcMethod::GetNamesInNamespace => "get_names_in_namespace",
            RpcMethod::GetNamesOwnedByAddress => "get_names_owned_by_address",
            RpcMethod::GetConsensusAt => "get_consensus_at",
            RpcMethod::GetConsensusHashes => "get_consensus_hashes",
            RpcMethod::GetBlockFromConsensus => "get_block_from_consensus",
            RpcMethod::GetNameHistoryBlocks => "get_name_history_blocks",
            RpcMethod::GetNameAt => "get_name_at",
            RpcMethod::GetNumOpHistoryRows => "get_num_op_history_rows",
            RpcMethod::GetOpHistoryRows => "get_op_history_rows",
            RpcMethod::GetNumNameopsAffectedAt => "get_num_nameops_affected_at",
            RpcMethod::GetNameopsAffectedAt => "get_nameops_affected_at",
            RpcMethod::GetNameopsHashAt => "get_nameops_hash_at",
            RpcMethod::GetNameBlockchainRecord => "get_name_blockchain_record",
            RpcMethod::GetNamespaceBlockchainRecord => "get_namespace_blockchain_record",
            RpcMethod::GetZonefileInventory => "get_zonefile_inventory",
            RpcMethod::GetAtlasPeers => "get_atlas_peers",
            RpcMethod::GetZonefiles => "get_zonefiles",
            RpcMethod::PutZonefiles => "put_zonefiles",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed request: which method it goes to, how its arguments are laid
/// out, and what shape the reply must have.
pub trait RpcCall {
    const METHOD: RpcMethod;
    type Response: DeserializeOwned + CheckResponse;

    /// Positional XML-RPC parameters.
    fn params(&self) -> Vec<Value>;

    /// Checks that need the request, e.g. that rows belong to the queried
    /// name. Runs after the response's own checks.
    fn check_against(&self, _response: &Self::Response) -> Result<(), String> {
        Ok(())
    }
}
