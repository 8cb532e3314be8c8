//! Turning server history evidence into a [`HistoryLog`].

use serde_json::Value;

use bns_types::nameop::EmbeddedHistory;
use bns_types::{FieldMap, HistoryEntry, HistoryLog, HistoryRow, Opcode, OpIdentity};

use crate::error::HistoryError;

/// Build a log from `get_op_history_rows` rows.
///
/// Rows are ordered by `(block_id, vtxindex)` whatever order they arrived
/// in. Each row's `history_data` must be a JSON object.
pub fn extract_rows(rows: &[HistoryRow]) -> Result<HistoryLog, HistoryError> {
    let mut ordered: Vec<&HistoryRow> = rows.iter().collect();
    ordered.sort_by_key(|row| (row.block_id, row.vtxindex));

    let mut log = HistoryLog::new();
    for row in ordered {
        let prior = match serde_json::from_str::<Value>(&row.history_data) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(HistoryError::InvalidHistoryData(format!(
                    "row {} is not an object",
                    row.txid
                )))
            }
            Err(e) => {
                return Err(HistoryError::InvalidHistoryData(format!(
                    "row {}: {}",
                    row.txid, e
                )))
            }
        };
        log.push(
            row.block_id,
            HistoryEntry {
                writer: Some(OpIdentity {
                    txid: row.txid.clone(),
                    vtxindex: row.vtxindex,
                    op: row.op.clone(),
                }),
                prior: with_opcode(prior)?,
            },
        );
    }
    Ok(log)
}

/// Build a log from the history a record embeds. Snapshots within a block
/// are ordered by their `vtxindex`.
pub fn extract_embedded(history: &EmbeddedHistory) -> Result<HistoryLog, HistoryError> {
    let mut log = HistoryLog::new();
    for (key, snapshots) in history {
        let block: u64 = key
            .parse()
            .map_err(|_| HistoryError::InvalidBlockKey(key.clone()))?;
        let mut ordered: Vec<&FieldMap> = snapshots.iter().collect();
        ordered.sort_by_key(|s| s.get("vtxindex").and_then(Value::as_u64).unwrap_or(0));
        for snapshot in ordered {
            log.push(
                block,
                HistoryEntry {
                    writer: None,
                    prior: with_opcode(snapshot.clone())?,
                },
            );
        }
    }
    Ok(log)
}

/// Re-derive the symbolic opcode from the snapshot's own `op`.
fn with_opcode(mut prior: FieldMap) -> Result<FieldMap, HistoryError> {
    let opcode = match prior.get("op") {
        None | Some(Value::Null) => return Ok(prior),
        Some(Value::String(op)) => Opcode::from_op(op).ok_or_else(|| {
            HistoryError::InvalidHistoryData(format!("unknown op '{}'", op))
        })?,
        Some(other) => {
            return Err(HistoryError::InvalidHistoryData(format!(
                "op {} is not a string",
                other
            )))
        }
    };
    prior.insert("opcode".into(), Value::String(opcode.as_str().to_string()));
    Ok(prior)
}
