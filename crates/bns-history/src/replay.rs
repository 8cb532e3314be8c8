//! Backward replay of a history log.
//!
//! Each history entry holds the field values its operation overwrote, so
//! undoing an entry means merging those values back into the state (or, for
//! an entry marked `history_snapshot`, replacing the state outright).
//! Starting from the live record, undoing every entry newer than block B
//! leaves the state right after the last operation at B. Undoing the
//! entries at B one by one then yields the state after each of them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use bns_types::{FieldMap, HistoryEntry, HistoryLog, NameOperation};

use crate::error::HistoryError;

/// Restore the states a record had at `block`, one per operation there, in
/// ascending `vtxindex` order.
///
/// An empty log means the record never changed, so the live state is the
/// only answer. A non-empty log with nothing at `block` contradicts the
/// claim that the record was affected there.
pub fn restore_at(
    current: &FieldMap,
    log: &HistoryLog,
    block: u64,
) -> Result<Vec<FieldMap>, HistoryError> {
    let mut state = current.clone();
    state.remove("history");

    if log.is_empty() {
        return Ok(vec![state]);
    }
    if !log.contains_block(block) {
        return Err(HistoryError::MissingBlock(block));
    }

    let mut undone = 0usize;
    for (_, entries) in log.after_desc(block) {
        for entry in entries.iter().rev() {
            undo(&mut state, entry)?;
            undone += 1;
        }
    }

    let at_block = log.at(block);
    let mut states = Vec::with_capacity(at_block.len());
    for entry in at_block.iter().rev() {
        states.push(state.clone());
        undo(&mut state, entry)?;
    }
    states.reverse();

    debug!(block, undone, states = states.len(), "replayed history");
    Ok(states)
}

/// The state right after the last operation at or before `block`, or `None`
/// when the record did not exist yet.
pub fn restore_through(
    current: &FieldMap,
    log: &HistoryLog,
    block: u64,
) -> Result<Option<FieldMap>, HistoryError> {
    let mut state = current.clone();
    state.remove("history");

    if log.first_block().is_some_and(|first| first > block) {
        return Ok(None);
    }
    for (_, entries) in log.after_desc(block) {
        for entry in entries.iter().rev() {
            undo(&mut state, entry)?;
        }
    }
    Ok(Some(state))
}

fn undo(state: &mut FieldMap, entry: &HistoryEntry) -> Result<(), HistoryError> {
    if let Some(writer) = &entry.writer {
        let found = state.get("txid").and_then(Value::as_str).unwrap_or("");
        if found != writer.txid {
            return Err(HistoryError::ReplayMismatch {
                expected: writer.txid.clone(),
                found: found.to_string(),
            });
        }
    }
    if entry.is_snapshot() {
        *state = entry.prior.clone();
    } else {
        for (field, value) in &entry.prior {
            state.insert(field.clone(), value.clone());
        }
    }
    Ok(())
}

fn to_fields<T: Serialize>(record: &T) -> Result<FieldMap, HistoryError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(HistoryError::InvalidState("record is not an object".into())),
        Err(e) => Err(HistoryError::InvalidState(e.to_string())),
    }
}

fn from_fields<T: DeserializeOwned>(state: FieldMap) -> Result<T, HistoryError> {
    serde_json::from_value(Value::Object(state)).map_err(|e| HistoryError::InvalidState(e.to_string()))
}

/// [`restore_at`] over a typed record.
pub fn restore_typed_at<T>(current: &T, log: &HistoryLog, block: u64) -> Result<Vec<T>, HistoryError>
where
    T: Serialize + DeserializeOwned,
{
    restore_at(&to_fields(current)?, log, block)?
        .into_iter()
        .map(from_fields)
        .collect()
}

/// [`restore_through`] over a typed record.
pub fn restore_typed_through<T>(
    current: &T,
    log: &HistoryLog,
    block: u64,
) -> Result<Option<T>, HistoryError>
where
    T: Serialize + DeserializeOwned,
{
    restore_through(&to_fields(current)?, log, block)?
        .map(from_fields)
        .transpose()
}

pub fn restore_name_at(
    current: &NameOperation,
    log: &HistoryLog,
    block: u64,
) -> Result<Vec<NameOperation>, HistoryError> {
    restore_typed_at(current, log, block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bns_types::OpIdentity;
    use serde_json::json;

    fn map(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    fn txid(n: u8) -> String {
        format!("{:02x}", n).repeat(32)
    }

    fn entry(writer: u8, vtxindex: u64, prior: Value) -> HistoryEntry {
        HistoryEntry {
            writer: Some(OpIdentity {
                txid: txid(writer),
                vtxindex,
                op: "+".into(),
            }),
            prior: map(prior),
        }
    }

    /// Registration (tx 1, block 100) then two updates at block 200
    /// (tx 2 at vtxindex 1, tx 3 at vtxindex 4) then a transfer at 300 (tx 4).
    fn sample() -> (FieldMap, HistoryLog) {
        let current = map(json!({
            "txid": txid(4), "vtxindex": 2, "op": ">>", "value_hash": "v3",
            "address": "new-owner", "history": {"ignored": []},
        }));
        let mut log = HistoryLog::new();
        log.push(100, entry(1, 5, json!({"history_snapshot": true, "txid": txid(0)})));
        log.push(200, entry(2, 1, json!({"txid": txid(1), "vtxindex": 5, "op": ":", "value_hash": null})));
        log.push(200, entry(3, 4, json!({"txid": txid(2), "vtxindex": 1, "op": "+", "value_hash": "v1"})));
        log.push(300, entry(4, 2, json!({"txid": txid(3), "vtxindex": 4, "op": "+", "value_hash": "v2", "address": "old-owner"})));
        (current, log)
    }

    #[test]
    fn test_restores_each_operation_at_block() {
        let (current, log) = sample();
        let states = restore_at(&current, &log, 200).unwrap();
        assert_eq!(states.len(), 2);

        assert_eq!(states[0]["txid"], json!(txid(2)));
        assert_eq!(states[0]["value_hash"], json!("v1"));
        assert_eq!(states[1]["txid"], json!(txid(3)));
        assert_eq!(states[1]["value_hash"], json!("v2"));
        assert_eq!(states[1]["address"], json!("old-owner"));
        assert!(states.iter().all(|s| !s.contains_key("history")));
    }

    #[test]
    fn test_latest_block_is_current_state() {
        let (current, log) = sample();
        let states = restore_at(&current, &log, 300).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0]["address"], json!("new-owner"));
    }

    #[test]
    fn test_snapshot_replaces_state() {
        let (current, log) = sample();
        let states = restore_at(&current, &log, 100).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0]["txid"], json!(txid(1)));
        assert_eq!(states[0]["op"], json!(":"));
        assert_eq!(states[0]["address"], json!("old-owner"));
    }

    #[test]
    fn test_empty_log_and_missing_block() {
        let (current, log) = sample();
        let states = restore_at(&current, &HistoryLog::new(), 999).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0]["txid"], json!(txid(4)));

        assert_eq!(restore_at(&current, &log, 250), Err(HistoryError::MissingBlock(250)));
    }

    #[test]
    fn test_restore_through_any_block() {
        let (current, log) = sample();
        assert_eq!(restore_through(&current, &log, 99).unwrap(), None);

        let between = restore_through(&current, &log, 250).unwrap().unwrap();
        assert_eq!(between["txid"], json!(txid(3)));
        assert_eq!(between["address"], json!("old-owner"));

        let latest = restore_through(&current, &log, 10_000).unwrap().unwrap();
        assert_eq!(latest["txid"], json!(txid(4)));
        assert!(!latest.contains_key("history"));
    }

    #[test]
    fn test_mismatched_writer_is_rejected() {
        let (mut current, log) = sample();
        current.insert("txid".into(), json!(txid(9)));
        let err = restore_at(&current, &log, 200).unwrap_err();
        assert!(err.to_string().starts_with("History replay mismatch"));
    }
}
