//! Name history machinery, free of any network access.
//!
//! - [`extract`]: build a [`HistoryLog`] from history rows or from the
//!   history a record embeds
//! - [`replay`]: walk the log backward to the states at a block
//! - [`quirks`]: patch in consensus fields older records lack
//!
//! [`reconstruct_name_at`] chains replay and quirk patching for one name.

pub mod error;
pub mod extract;
pub mod quirks;
pub mod replay;

pub use error::HistoryError;
pub use extract::{extract_embedded, extract_rows};
pub use quirks::{ConsensusQuirks, LegacyQuirks};
pub use replay::{
    restore_at, restore_name_at, restore_through, restore_typed_at, restore_typed_through,
};

use bns_types::{HistoryLog, NameOperation, ReconstructedRecord};

/// Every state `current` had at `block`, ascending by `vtxindex`, with
/// consensus fields patched by `quirks`.
pub fn reconstruct_name_at<Q: ConsensusQuirks + ?Sized>(
    current: &NameOperation,
    log: &HistoryLog,
    block: u64,
    quirks: &Q,
) -> Result<Vec<ReconstructedRecord>, HistoryError> {
    restore_name_at(current, log, block)?
        .into_iter()
        .map(|mut operation| {
            quirks.patch(&mut operation, log, block)?;
            Ok(ReconstructedRecord {
                block_height: block,
                operation,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bns_types::HistoryRow;
    use serde_json::json;

    fn txid(n: u8) -> String {
        format!("{:02x}", n).repeat(32)
    }

    #[test]
    fn test_rows_to_patched_records() {
        let ch = "ab".repeat(20);
        let rows = vec![
            HistoryRow {
                txid: txid(1),
                history_id: "alice.id".into(),
                block_id: 100,
                vtxindex: 3,
                op: ":".into(),
                history_data: json!({"history_snapshot": true, "op": "?"}).to_string(),
            },
            HistoryRow {
                txid: txid(2),
                history_id: "alice.id".into(),
                block_id: 150,
                vtxindex: 6,
                op: "+".into(),
                history_data: json!({
                    "txid": txid(1), "op": ":", "vtxindex": 3,
                    "consensus_hash": ch, "value_hash": null,
                })
                .to_string(),
            },
        ];
        let current: NameOperation = serde_json::from_value(json!({
            "op": "+",
            "opcode": "NAME_UPDATE",
            "txid": txid(2),
            "vtxindex": 6,
            "name": "alice.id",
            "consensus_hash": null,
            "value_hash": "cd".repeat(20),
        }))
        .unwrap();

        let log = extract_rows(&rows).unwrap();
        let records = reconstruct_name_at(&current, &log, 150, &LegacyQuirks).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].block_height, 150);
        assert_eq!(records[0].operation.consensus_hash.as_deref(), Some(ch.as_str()));
        assert!(records[0].operation.name_consensus_hash.is_some());

        let earlier = reconstruct_name_at(&current, &log, 100, &LegacyQuirks).unwrap();
        assert_eq!(earlier[0].txid(), txid(1));
        assert_eq!(earlier[0].operation.opcode, "NAME_REGISTRATION");
        assert_eq!(earlier[0].operation.value_hash, None);
    }
}
