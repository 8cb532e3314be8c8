//! Name and namespace operations as reported by the indexing server.
//!
//! The typed fields cover everything the client checks or reasons about.
//! Any other server field lands in `extra` untouched, so a record can be
//! re-serialized without losing data that downstream hash checks depend on.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

use crate::opcode::Opcode;
use crate::patterns::{
    check_opt_str, check_str, is_address, is_consensus_hash, is_name_pattern, is_namespace_id,
    is_namespace_id_hash, is_op_code, is_p2pkh_script, is_script, is_txid, is_value_hash,
};
use crate::serde_util::{explicit_nullable, non_null, required_nullable};
use crate::FieldMap;

/// Number of price buckets in a namespace price curve.
pub const NAMESPACE_BUCKET_COUNT: usize = 16;

/// One recorded event for a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameOperation {
    pub op: String,
    pub opcode: String,
    pub txid: String,
    pub vtxindex: u64,
    /// Absent on an outstanding preorder.
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub sender_pubkey: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub recipient: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub recipient_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub op_fee: Option<Number>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub first_registered: Option<u64>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub last_renewed: Option<u64>,
    #[serde(default)]
    pub value_hash: Option<String>,
    #[serde(default)]
    pub consensus_hash: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub revoked: Option<bool>,
    #[serde(
        default,
        deserialize_with = "explicit_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub importer: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub importer_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub history_snapshot: Option<bool>,
    /// Derived during reconstruction for updates and transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_consensus_hash: Option<String>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl NameOperation {
    pub fn parsed_opcode(&self) -> Option<Opcode> {
        self.opcode.parse().ok()
    }

    /// Check every present field against its wire format.
    pub fn check(&self) -> Result<(), String> {
        check_str("op", &self.op, is_op_code)?;
        self.opcode
            .parse::<Opcode>()
            .map_err(|e| format!("field 'opcode': {}", e))?;
        check_str("txid", &self.txid, is_txid)?;
        check_opt_str("name", self.name.as_deref(), is_name_pattern)?;
        check_opt_str("address", self.address.as_deref(), is_address)?;
        check_opt_str("sender", self.sender.as_deref(), is_script)?;
        check_opt_str("sender_pubkey", nullable(&self.sender_pubkey), is_script)?;
        check_opt_str("recipient", nullable(&self.recipient), is_script)?;
        check_opt_str(
            "recipient_address",
            nullable(&self.recipient_address),
            is_address,
        )?;
        check_opt_str("value_hash", self.value_hash.as_deref(), is_value_hash)?;
        check_opt_str(
            "consensus_hash",
            self.consensus_hash.as_deref(),
            is_consensus_hash,
        )?;
        check_opt_str("importer", nullable(&self.importer), is_p2pkh_script)?;
        check_opt_str(
            "importer_address",
            nullable(&self.importer_address),
            is_address,
        )?;
        Ok(())
    }

    /// Checks for a full name record: the common fields plus the ones every
    /// stored record carries.
    pub fn check_record(&self) -> Result<(), String> {
        self.check()?;
        let required = [
            ("address", self.address.is_some()),
            ("block_number", self.block_number.is_some()),
            ("op_fee", self.op_fee.is_some()),
            ("sender", self.sender.is_some()),
        ];
        for (field, present) in required {
            if !present {
                return Err(format!("missing field '{}'", field));
            }
        }
        Ok(())
    }
}

/// The value of a field that may have been sent as `null`.
pub fn nullable(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(Option::as_deref)
}

/// One recorded event for a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceOperation {
    pub namespace_id: String,
    pub op: String,
    pub txid: String,
    pub vtxindex: u64,
    pub address: String,
    pub sender: String,
    #[serde(deserialize_with = "required_nullable")]
    pub sender_pubkey: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub recipient: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub recipient_address: Option<String>,
    pub block_number: u64,
    pub reveal_block: u64,
    /// `null` until the namespace is launched.
    #[serde(default)]
    pub ready_block: Option<u64>,
    pub ready: bool,
    pub lifetime: u64,
    pub base: u64,
    #[serde(deserialize_with = "required_nullable")]
    pub coeff: Option<u64>,
    #[serde(deserialize_with = "required_nullable")]
    pub buckets: Option<Vec<u64>>,
    pub nonalpha_discount: u64,
    pub no_vowel_discount: u64,
    pub version: u64,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub namespace_id_hash: Option<String>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl NamespaceOperation {
    pub fn check(&self) -> Result<(), String> {
        check_str("namespace_id", &self.namespace_id, is_namespace_id)?;
        check_str("op", &self.op, is_op_code)?;
        check_str("txid", &self.txid, is_txid)?;
        check_str("address", &self.address, is_address)?;
        check_str("sender", &self.sender, is_script)?;
        check_opt_str("sender_pubkey", self.sender_pubkey.as_deref(), is_script)?;
        check_opt_str("recipient", self.recipient.as_deref(), is_script)?;
        check_opt_str(
            "recipient_address",
            self.recipient_address.as_deref(),
            is_address,
        )?;
        check_opt_str(
            "namespace_id_hash",
            self.namespace_id_hash.as_deref(),
            is_namespace_id_hash,
        )?;
        if let Some(buckets) = &self.buckets {
            if buckets.len() != NAMESPACE_BUCKET_COUNT {
                return Err(format!(
                    "field 'buckets' must have {} entries, got {}",
                    NAMESPACE_BUCKET_COUNT,
                    buckets.len()
                ));
            }
        }
        Ok(())
    }
}

/// Raw embedded history: block height (as a decimal string) to the
/// snapshots written at that block.
pub type EmbeddedHistory = BTreeMap<String, Vec<FieldMap>>;

/// A name record with its embedded history, from `get_name_blockchain_record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    pub history: EmbeddedHistory,
    #[serde(flatten)]
    pub operation: NameOperation,
}

impl NameRecord {
    pub fn check(&self) -> Result<(), String> {
        self.operation.check_record()?;
        check_embedded_history(&self.history)
    }
}

/// A namespace record with its embedded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    #[serde(default)]
    pub history: EmbeddedHistory,
    #[serde(flatten)]
    pub operation: NamespaceOperation,
}

impl NamespaceRecord {
    pub fn check(&self) -> Result<(), String> {
        self.operation.check()?;
        check_embedded_history(&self.history)
    }
}

/// Check an embedded history map: decimal block keys, and every snapshot
/// carries a valid op identity.
pub fn check_embedded_history(history: &EmbeddedHistory) -> Result<(), String> {
    for (block, snapshots) in history {
        if block.is_empty() || !block.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("history key '{}' is not a block height", block));
        }
        for snapshot in snapshots {
            check_snapshot(snapshot).map_err(|e| format!("history at {}: {}", block, e))?;
        }
    }
    Ok(())
}

/// Check one history snapshot. `op`, `opcode`, `txid` and `vtxindex` are
/// required; other known fields are checked when present.
pub fn check_snapshot(snapshot: &FieldMap) -> Result<(), String> {
    let op = snapshot_str(snapshot, "op")?.ok_or("missing field 'op'")?;
    check_str("op", op, is_op_code)?;
    let opcode = snapshot_str(snapshot, "opcode")?.ok_or("missing field 'opcode'")?;
    opcode
        .parse::<Opcode>()
        .map_err(|e| format!("field 'opcode': {}", e))?;
    let txid = snapshot_str(snapshot, "txid")?.ok_or("missing field 'txid'")?;
    check_str("txid", txid, is_txid)?;
    match snapshot.get("vtxindex") {
        Some(v) if v.is_u64() => {}
        _ => return Err("field 'vtxindex' must be an integer".to_string()),
    }

    let optional: [(&str, fn(&str) -> bool); 9] = [
        ("address", is_address),
        ("consensus_hash", is_consensus_hash),
        ("value_hash", is_value_hash),
        ("sender", is_script),
        ("sender_pubkey", is_script),
        ("recipient", is_script),
        ("recipient_address", is_address),
        ("importer", is_p2pkh_script),
        ("importer_address", is_address),
    ];
    for (field, pred) in optional {
        check_opt_str(field, snapshot_str(snapshot, field)?, pred)?;
    }
    for field in ["address", "sender"] {
        if snapshot.get(field) == Some(&Value::Null) {
            return Err(format!("field '{}' must not be null", field));
        }
    }
    Ok(())
}

/// Read a string-or-null field from a snapshot; other types are an error.
fn snapshot_str<'a>(snapshot: &'a FieldMap, field: &str) -> Result<Option<&'a str>, String> {
    match snapshot.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(format!("field '{}' must be a string", field)),
    }
}
