//! Consensus fields early protocol versions did not record verbatim.
//!
//! Reconstructed updates and transfers need a consensus hash and a
//! name-consensus hash that older records lack, and older servers reported
//! some fees as floats. These corrections depend only on the record and its
//! history, and live behind [`ConsensusQuirks`] so a later rule set can be
//! swapped in without touching replay.

use serde_json::{Number, Value};
use sha2::{Digest, Sha256};

use bns_types::opcode::TRANSFER_REMOVE_DATA;
use bns_types::{HistoryEntry, HistoryLog, NameOperation, Opcode};

use crate::error::HistoryError;

/// Bytes of the double-SHA256 kept for `name_consensus_hash`.
const NAME_CONSENSUS_HASH_BYTES: usize = 16;

pub trait ConsensusQuirks {
    /// Patch `record`, a state reconstructed at `block`, in place.
    fn patch(
        &self,
        record: &mut NameOperation,
        history: &HistoryLog,
        block: u64,
    ) -> Result<(), HistoryError>;
}

/// The rule set every server to date needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyQuirks;

impl ConsensusQuirks for LegacyQuirks {
    fn patch(
        &self,
        record: &mut NameOperation,
        history: &HistoryLog,
        block: u64,
    ) -> Result<(), HistoryError> {
        match record.parsed_opcode() {
            Some(opcode @ (Opcode::NameUpdate | Opcode::NameTransfer)) => {
                if record.consensus_hash.is_none() {
                    record.consensus_hash = earlier_consensus_hash(record, history, block);
                }
                let name = record.name.as_deref().ok_or_else(|| HistoryError::MissingName {
                    opcode: opcode.to_string(),
                    block,
                })?;
                let consensus_hash = record.consensus_hash.as_deref().ok_or_else(|| {
                    HistoryError::MissingConsensusHash {
                        name: name.to_string(),
                        block,
                    }
                })?;
                record.name_consensus_hash = Some(name_consensus_hash(name, consensus_hash));

                if opcode == Opcode::NameTransfer && record.op == TRANSFER_REMOVE_DATA {
                    record.value_hash = None;
                }
            }
            Some(Opcode::NameRegistration | Opcode::NameRenewal | Opcode::NameImport) => {
                if let Some(fee) = &record.op_fee {
                    record.op_fee = Some(canonical_fee(fee)?);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Hex of the first 16 bytes of `SHA256(SHA256(name ++ consensus_hash))`.
pub fn name_consensus_hash(name: &str, consensus_hash: &str) -> String {
    let inner = Sha256::digest(format!("{}{}", name, consensus_hash).as_bytes());
    let outer = Sha256::digest(inner);
    hex::encode(&outer[..NAME_CONSENSUS_HASH_BYTES])
}

/// Walk back from the record's position to the nearest snapshot with a
/// consensus hash.
fn earlier_consensus_hash(
    record: &NameOperation,
    history: &HistoryLog,
    block: u64,
) -> Option<String> {
    history
        .through_desc(block)
        .flat_map(|(b, entries)| entries.iter().rev().map(move |e| (b, e)))
        .filter(|(b, entry)| *b < block || written_at_or_before(entry, record.vtxindex))
        .find_map(|(_, entry)| match entry.prior.get("consensus_hash") {
            Some(Value::String(hash)) => Some(hash.clone()),
            _ => None,
        })
}

/// Within the record's own block, only entries written by it or by earlier
/// operations count. Embedded entries have no writer, so their prior
/// state's `vtxindex` stands in.
fn written_at_or_before(entry: &HistoryEntry, vtxindex: u64) -> bool {
    match &entry.writer {
        Some(writer) => writer.vtxindex <= vtxindex,
        None => entry
            .prior
            .get("vtxindex")
            .and_then(Value::as_u64)
            .is_some_and(|prior| prior < vtxindex),
    }
}

/// Canonicalize a fee into integer satoshis.
fn canonical_fee(fee: &Number) -> Result<Number, HistoryError> {
    if let Some(satoshis) = fee.as_u64() {
        return Ok(Number::from(satoshis));
    }
    if fee.is_i64() {
        return Err(HistoryError::InvalidOpFee(fee.to_string()));
    }
    match fee.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
            Ok(Number::from(f as u64))
        }
        _ => Err(HistoryError::InvalidOpFee(fee.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bns_types::OpIdentity;
    use serde_json::json;

    fn op(value: Value) -> NameOperation {
        serde_json::from_value(value).unwrap()
    }

    fn base(op_code: &str, opcode: &str) -> Value {
        json!({
            "op": op_code,
            "opcode": opcode,
            "txid": "33".repeat(32),
            "vtxindex": 4,
            "name": "alice.id",
            "consensus_hash": null,
            "value_hash": "44".repeat(20),
            "op_fee": 6400000.0,
        })
    }

    fn history() -> HistoryLog {
        let mut log = HistoryLog::new();
        log.push(
            90,
            HistoryEntry {
                writer: Some(OpIdentity { txid: "11".repeat(32), vtxindex: 2, op: "+".into() }),
                prior: json!({"consensus_hash": "aa".repeat(20)}).as_object().cloned().unwrap(),
            },
        );
        log.push(
            100,
            HistoryEntry {
                writer: Some(OpIdentity { txid: "33".repeat(32), vtxindex: 4, op: "+".into() }),
                prior: json!({"consensus_hash": null}).as_object().cloned().unwrap(),
            },
        );
        log.push(
            100,
            HistoryEntry {
                writer: Some(OpIdentity { txid: "55".repeat(32), vtxindex: 8, op: "+".into() }),
                prior: json!({"consensus_hash": "bb".repeat(20)}).as_object().cloned().unwrap(),
            },
        );
        log
    }

    #[test]
    fn test_update_restores_consensus_hash_from_earlier_entry() {
        let mut record = op(base("+", "NAME_UPDATE"));
        LegacyQuirks.patch(&mut record, &history(), 100).unwrap();

        // The entry written at vtxindex 8 is later than this record and is skipped.
        assert_eq!(record.consensus_hash.as_deref(), Some("aa".repeat(20).as_str()));
        assert_eq!(
            record.name_consensus_hash,
            Some(name_consensus_hash("alice.id", &"aa".repeat(20)))
        );
        assert_eq!(record.name_consensus_hash.as_ref().unwrap().len(), 32);
    }

    #[test]
    fn test_missing_consensus_hash_is_an_error() {
        let mut record = op(base(">>", "NAME_TRANSFER"));
        let err = LegacyQuirks.patch(&mut record, &HistoryLog::new(), 100).unwrap_err();
        assert!(matches!(err, HistoryError::MissingConsensusHash { .. }));
    }

    #[test]
    fn test_transfer_removing_data_clears_value_hash() {
        let mut value = base(">~", "NAME_TRANSFER");
        value["consensus_hash"] = json!("cc".repeat(20));
        let mut record = op(value);
        LegacyQuirks.patch(&mut record, &HistoryLog::new(), 100).unwrap();
        assert_eq!(record.value_hash, None);
        assert_eq!(record.consensus_hash.as_deref(), Some("cc".repeat(20).as_str()));

        let mut value = base(">>", "NAME_TRANSFER");
        value["consensus_hash"] = json!("cc".repeat(20));
        let mut record = op(value);
        LegacyQuirks.patch(&mut record, &HistoryLog::new(), 100).unwrap();
        assert!(record.value_hash.is_some());
    }

    #[test]
    fn test_registration_fee_is_canonicalized() {
        let mut record = op(base(":", "NAME_REGISTRATION"));
        LegacyQuirks.patch(&mut record, &HistoryLog::new(), 100).unwrap();
        assert_eq!(record.op_fee, Some(Number::from(6_400_000u64)));
        assert!(record.name_consensus_hash.is_none());

        for bad in [json!(-5), json!(1.5), json!(-2.0)] {
            let mut value = base("::", "NAME_RENEWAL");
            value["op_fee"] = bad;
            let mut record = op(value);
            assert!(matches!(
                LegacyQuirks.patch(&mut record, &HistoryLog::new(), 100),
                Err(HistoryError::InvalidOpFee(_))
            ));
        }
    }

    #[test]
    fn test_name_consensus_hash_is_deterministic() {
        let a = name_consensus_hash("alice.id", &"00".repeat(20));
        assert_eq!(a, name_consensus_hash("alice.id", &"00".repeat(20)));
        assert_ne!(a, name_consensus_hash("bob.id", &"00".repeat(20)));
    }
}
