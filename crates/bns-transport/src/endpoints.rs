//! Typed requests and response bodies, one pair per [`RpcMethod`].
//!
//! Request structs lay out positional parameters in the order the server
//! expects. Response structs are what the reply must deserialize into; their
//! [`CheckResponse`] impls apply the field-format checks serde cannot
//! express.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use bns_types::patterns::{
    check_str, is_base64, is_consensus_hash, is_hex, is_name_valid, is_value_hash,
};
use bns_types::serde_util::required_nullable;
use bns_types::{
    ConsensusHash, HistoryRow, NameOperation, NameRecord, NamespaceRecord, ServerInfo,
};

use crate::method::{RpcCall, RpcMethod};
use crate::validate::{CheckResponse, Envelope};

// ---- Response bodies ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
}

impl CheckResponse for PingResponse {
    fn check(&self) -> Result<(), String> {
        if self.status != "alive" {
            return Err(format!("server status is '{}', expected 'alive'", self.status));
        }
        Ok(())
    }
}

impl CheckResponse for ServerInfo {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBody {
    pub satoshis: u64,
}

impl CheckResponse for CostBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBody {
    pub count: u64,
}

impl CheckResponse for CountBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesBody {
    pub names: Vec<String>,
}

impl CheckResponse for NamesBody {
    fn check(&self) -> Result<(), String> {
        for name in &self.names {
            if !is_name_valid(name) {
                return Err(format!("'{}' is not a fully-qualified name", name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusBody {
    pub consensus: ConsensusHash,
}

impl CheckResponse for ConsensusBody {}

/// Block heights arrive as string keys. Keys that look like heights must
/// map to consensus hashes; anything else is left for the caller to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusHashesBody {
    pub consensus_hashes: BTreeMap<String, Value>,
}

impl CheckResponse for ConsensusHashesBody {
    fn check(&self) -> Result<(), String> {
        for (height, hash) in &self.consensus_hashes {
            if height.is_empty() || !height.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            match hash.as_str() {
                Some(h) if is_consensus_hash(h) => {}
                _ => return Err(format!("invalid consensus hash for block {}", height)),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIdBody {
    #[serde(deserialize_with = "required_nullable")]
    pub block_id: Option<u64>,
}

impl CheckResponse for BlockIdBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryBlocksBody {
    pub history_blocks: Vec<u64>,
}

impl CheckResponse for HistoryBlocksBody {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsBody {
    pub records: Vec<NameOperation>,
}

impl CheckResponse for RecordsBody {
    fn check(&self) -> Result<(), String> {
        self.records.iter().try_for_each(NameOperation::check_record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRowsBody {
    pub history_rows: Vec<HistoryRow>,
}

impl CheckResponse for HistoryRowsBody {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameopsBody {
    pub nameops: Vec<NameOperation>,
}

impl CheckResponse for NameopsBody {
    fn check(&self) -> Result<(), String> {
        self.nameops.iter().try_for_each(NameOperation::check)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpsHashBody {
    pub ops_hash: String,
}

impl CheckResponse for OpsHashBody {
    fn check(&self) -> Result<(), String> {
        check_str("ops_hash", &self.ops_hash, is_hex)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecordBody {
    pub record: NameRecord,
}

impl CheckResponse for NameRecordBody {
    fn check(&self) -> Result<(), String> {
        self.record.check()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceRecordBody {
    pub record: NamespaceRecord,
}

impl CheckResponse for NamespaceRecordBody {
    fn check(&self) -> Result<(), String> {
        self.record.check()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryBody {
    pub inv: String,
}

impl CheckResponse for InventoryBody {
    fn check(&self) -> Result<(), String> {
        check_str("inv", &self.inv, is_base64)
    }
}

/// Peer strings are checked by the Atlas client, which reports malformed
/// entries as an integrity failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeersBody {
    pub peers: Vec<String>,
}

impl CheckResponse for PeersBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonefilesBody {
    pub zonefiles: BTreeMap<String, String>,
}

impl CheckResponse for ZonefilesBody {
    fn check(&self) -> Result<(), String> {
        for (hash, data) in &self.zonefiles {
            if is_value_hash(hash) && !is_base64(data) {
                return Err(format!("zonefile {} is not base64", hash));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBody {
    pub saved: Vec<i64>,
}

impl CheckResponse for SavedBody {}

// ---- Requests ----

#[derive(Debug, Clone, Copy, Default)]
pub struct Ping;

impl RpcCall for Ping {
    const METHOD: RpcMethod = RpcMethod::Ping;
    type Response = PingResponse;

    fn params(&self) -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetInfo;

impl RpcCall for GetInfo {
    const METHOD: RpcMethod = RpcMethod::GetInfo;
    type Response = ServerInfo;

    fn params(&self) -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct GetNameCost {
    pub name: String,
}

impl RpcCall for GetNameCost {
    const METHOD: RpcMethod = RpcMethod::GetNameCost;
    type Response = Envelope<CostBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.name)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNamespaceCost {
    pub namespace_id: String,
}

impl RpcCall for GetNamespaceCost {
    const METHOD: RpcMethod = RpcMethod::GetNamespaceCost;
    type Response = Envelope<CostBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.namespace_id)]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetNumNames;

impl RpcCall for GetNumNames {
    const METHOD: RpcMethod = RpcMethod::GetNumNames;
    type Response = Envelope<CountBody>;

    fn params(&self) -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetAllNames {
    pub offset: u64,
    pub count: u64,
}

impl RpcCall for GetAllNames {
    const METHOD: RpcMethod = RpcMethod::GetAllNames;
    type Response = Envelope<NamesBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.offset), json!(self.count)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNumNamesInNamespace {
    pub namespace_id: String,
}

impl RpcCall for GetNumNamesInNamespace {
    const METHOD: RpcMethod = RpcMethod::GetNumNamesInNamespace;
    type Response = Envelope<CountBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.namespace_id)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNamesInNamespace {
    pub namespace_id: String,
    pub offset: u64,
    pub count: u64,
}

impl RpcCall for GetNamesInNamespace {
    const METHOD: RpcMethod = RpcMethod::GetNamesInNamespace;
    type Response = Envelope<NamesBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.namespace_id), json!(self.offset), json!(self.count)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNamesOwnedByAddress {
    pub address: String,
}

impl RpcCall for GetNamesOwnedByAddress {
    const METHOD: RpcMethod = RpcMethod::GetNamesOwnedByAddress;
    type Response = Envelope<NamesBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.address)]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetConsensusAt {
    pub block_height: u64,
}

impl RpcCall for GetConsensusAt {
    const METHOD: RpcMethod = RpcMethod::GetConsensusAt;
    type Response = Envelope<ConsensusBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.block_height)]
    }
}

#[derive(Debug, Clone)]
pub struct GetConsensusHashes {
    pub block_heights: Vec<u64>,
}

impl RpcCall for GetConsensusHashes {
    const METHOD: RpcMethod = RpcMethod::GetConsensusHashes;
    type Response = Envelope<ConsensusHashesBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.block_heights)]
    }
}

#[derive(Debug, Clone)]
pub struct GetBlockFromConsensus {
    pub consensus_hash: String,
}

impl RpcCall for GetBlockFromConsensus {
    const METHOD: RpcMethod = RpcMethod::GetBlockFromConsensus;
    type Response = Envelope<BlockIdBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.consensus_hash)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNameHistoryBlocks {
    pub name: String,
}

impl RpcCall for GetNameHistoryBlocks {
    const METHOD: RpcMethod = RpcMethod::GetNameHistoryBlocks;
    type Response = Envelope<HistoryBlocksBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.name)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNameAt {
    pub name: String,
    pub block_height: u64,
}

impl RpcCall for GetNameAt {
    const METHOD: RpcMethod = RpcMethod::GetNameAt;
    type Response = Envelope<RecordsBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.name), json!(self.block_height)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNumOpHistoryRows {
    pub history_id: String,
}

impl RpcCall for GetNumOpHistoryRows {
    const METHOD: RpcMethod = RpcMethod::GetNumOpHistoryRows;
    type Response = Envelope<CountBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.history_id)]
    }
}

#[derive(Debug, Clone)]
pub struct GetOpHistoryRows {
    pub history_id: String,
    pub offset: u64,
    pub count: u64,
}

impl RpcCall for GetOpHistoryRows {
    const METHOD: RpcMethod = RpcMethod::GetOpHistoryRows;
    type Response = Envelope<HistoryRowsBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.history_id), json!(self.offset), json!(self.count)]
    }

    fn check_against(&self, response: &Self::Response) -> Result<(), String> {
        response
            .body
            .history_rows
            .iter()
            .try_for_each(|row| row.check(&self.history_id))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetNumNameopsAffectedAt {
    pub block_height: u64,
}

impl RpcCall for GetNumNameopsAffectedAt {
    const METHOD: RpcMethod = RpcMethod::GetNumNameopsAffectedAt;
    type Response = Envelope<CountBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.block_height)]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetNameopsAffectedAt {
    pub block_height: u64,
    pub offset: u64,
    pub count: u64,
}

impl RpcCall for GetNameopsAffectedAt {
    const METHOD: RpcMethod = RpcMethod::GetNameopsAffectedAt;
    type Response = Envelope<NameopsBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.block_height), json!(self.offset), json!(self.count)]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetNameopsHashAt {
    pub block_height: u64,
}

impl RpcCall for GetNameopsHashAt {
    const METHOD: RpcMethod = RpcMethod::GetNameopsHashAt;
    type Response = Envelope<OpsHashBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.block_height)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNameBlockchainRecord {
    pub name: String,
}

impl RpcCall for GetNameBlockchainRecord {
    const METHOD: RpcMethod = RpcMethod::GetNameBlockchainRecord;
    type Response = Envelope<NameRecordBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.name)]
    }
}

#[derive(Debug, Clone)]
pub struct GetNamespaceBlockchainRecord {
    pub namespace_id: String,
}

impl RpcCall for GetNamespaceBlockchainRecord {
    const METHOD: RpcMethod = RpcMethod::GetNamespaceBlockchainRecord;
    type Response = Envelope<NamespaceRecordBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.namespace_id)]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetZonefileInventory {
    pub bit_offset: u64,
    pub bit_count: u64,
}

impl RpcCall for GetZonefileInventory {
    const METHOD: RpcMethod = RpcMethod::GetZonefileInventory;
    type Response = Envelope<InventoryBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.bit_offset), json!(self.bit_count)]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetAtlasPeers;

impl RpcCall for GetAtlasPeers {
    const METHOD: RpcMethod = RpcMethod::GetAtlasPeers;
    type Response = Envelope<PeersBody>;

    fn params(&self) -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct GetZonefiles {
    pub zonefile_hashes: Vec<String>,
}

impl RpcCall for GetZonefiles {
    const METHOD: RpcMethod = RpcMethod::GetZonefiles;
    type Response = Envelope<ZonefilesBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.zonefile_hashes)]
    }
}

/// Zonefiles are sent base64-encoded.
#[derive(Debug, Clone)]
pub struct PutZonefiles {
    pub zonefiles: Vec<String>,
}

impl RpcCall for PutZonefiles {
    const METHOD: RpcMethod = RpcMethod::PutZonefiles;
    type Response = Envelope<SavedBody>;

    fn params(&self) -> Vec<Value> {
        vec![json!(self.zonefiles)]
    }

    fn check_against(&self, response: &Self::Response) -> Result<(), String> {
        let saved = response.body.saved.len();
        if saved != self.zonefiles.len() {
            return Err(format!(
                "saved {} results for {} zonefiles",
                saved,
                self.zonefiles.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    fn enveloped(body: Value) -> Value {
        let mut value = json!({"status": true, "indexing": false, "lastblock": 500});
        if let (Some(map), Value::Object(extra)) = (value.as_object_mut(), body) {
            map.extend(extra);
        }
        value
    }

    #[test]
    fn test_params_layout() {
        let call = GetNamesInNamespace {
            namespace_id: "id".into(),
            offset: 200,
            count: 50,
        };
        assert_eq!(call.params(), vec![json!("id"), json!(200), json!(50)]);
        assert_eq!(
            GetConsensusHashes { block_heights: vec![1, 2] }.params(),
            vec![json!([1, 2])]
        );
        assert!(Ping.params().is_empty());
    }

    #[test]
    fn test_ping_requires_alive() {
        validate::<PingResponse>(RpcMethod::Ping, json!({"status": "alive"})).unwrap();
        assert!(validate::<PingResponse>(RpcMethod::Ping, json!({"status": "busy"})).is_err());
    }

    #[test]
    fn test_names_must_be_fully_qualified() {
        let ok = validate::<Envelope<NamesBody>>(
            RpcMethod::GetAllNames,
            enveloped(json!({"names": ["alice.id", "bob.id"]})),
        )
        .unwrap();
        assert_eq!(ok.body.names.len(), 2);

        let err = validate::<Envelope<NamesBody>>(
            RpcMethod::GetAllNames,
            enveloped(json!({"names": ["alice"]})),
        )
        .unwrap_err();
        assert!(err.message().contains("fully-qualified"));
    }

    #[test]
    fn test_consensus_hash_values_checked_for_numeric_keys() {
        let good = "ab".repeat(20);
        validate::<Envelope<ConsensusHashesBody>>(
            RpcMethod::GetConsensusHashes,
            enveloped(json!({"consensus_hashes": {"100": good, "x": 1}})),
        )
        .unwrap();
        assert!(validate::<Envelope<ConsensusHashesBody>>(
            RpcMethod::GetConsensusHashes,
            enveloped(json!({"consensus_hashes": {"100": "zz"}})),
        )
        .is_err());
    }

    #[test]
    fn test_history_rows_must_match_request() {
        let call = GetOpHistoryRows {
            history_id: "alice.id".into(),
            offset: 0,
            count: 1,
        };
        let response = validate::<Envelope<HistoryRowsBody>>(
            RpcMethod::GetOpHistoryRows,
            enveloped(json!({"history_rows": [{
                "txid": "cd".repeat(32),
                "history_id": "bob.id",
                "block_id": 10,
                "vtxindex": 2,
                "op": "+",
                "history_data": "{}",
            }]})),
        )
        .unwrap();
        assert!(call.check_against(&response).is_err());
    }

    #[test]
    fn test_saved_must_cover_every_zonefile() {
        let call = PutZonefiles {
            zonefiles: vec!["aGk=".into(), "eW8=".into()],
        };
        let response = validate::<Envelope<SavedBody>>(
            RpcMethod::PutZonefiles,
            enveloped(json!({"saved": [1]})),
        )
        .unwrap();
        assert!(call.check_against(&response).is_err());
    }

    #[test]
    fn test_block_id_may_be_null_but_not_missing() {
        let ok = validate::<Envelope<BlockIdBody>>(
            RpcMethod::GetBlockFromConsensus,
            enveloped(json!({"block_id": null})),
        )
        .unwrap();
        assert_eq!(ok.body.block_id, None);
        assert!(validate::<Envelope<BlockIdBody>>(
            RpcMethod::GetBlockFromConsensus,
            enveloped(json!({})),
        )
        .is_err());
    }
}
