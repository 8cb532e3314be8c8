//! History evidence and the records reconstructed from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::nameop::NameOperation;
use crate::patterns::{check_str, is_op_code, is_txid};
use crate::FieldMap;

/// One row of a name's (or namespace's) operation history, as served by
/// `get_op_history_rows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub txid: String,
    pub history_id: String,
    pub block_id: u64,
    pub vtxindex: u64,
    pub op: String,
    /// JSON-encoded field values the operation overwrote.
    pub history_data: String,
}

impl HistoryRow {
    pub fn check(&self, expected_id: &str) -> Result<(), String> {
        check_str("txid", &self.txid, is_txid)?;
        check_str("op", &self.op, is_op_code)?;
        if self.history_id != expected_id {
            return Err(format!(
                "history row for '{}' returned while querying '{}'",
                self.history_id, expected_id
            ));
        }
        Ok(())
    }
}

/// The operation that wrote a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpIdentity {
    pub txid: String,
    pub vtxindex: u64,
    pub op: String,
}

/// The field values one operation overwrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Known when the entry came from a history row; embedded record
    /// history carries only the prior state.
    pub writer: Option<OpIdentity>,
    pub prior: FieldMap,
}

impl HistoryEntry {
    /// A snapshot replaces the whole state instead of patching it.
    pub fn is_snapshot(&self) -> bool {
        matches!(self.prior.get("history_snapshot"), Some(Value::Bool(true)))
    }
}

/// Block height to the entries written at that block, in `vtxindex` order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    blocks: BTreeMap<u64, Vec<HistoryEntry>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: u64, entry: HistoryEntry) {
        self.blocks.entry(block).or_default().push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of entries across all blocks.
    pub fn len(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    pub fn at(&self, block: u64) -> &[HistoryEntry] {
        self.blocks.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_block(&self, block: u64) -> bool {
        self.blocks.contains_key(&block)
    }

    pub fn first_block(&self) -> Option<u64> {
        self.blocks.keys().next().copied()
    }

    pub fn last_block(&self) -> Option<u64> {
        self.blocks.keys().next_back().copied()
    }

    /// Blocks in ascending order with their entries.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u64, &[HistoryEntry])> {
        self.blocks.iter().map(|(b, e)| (*b, e.as_slice()))
    }

    /// Blocks strictly after `block`, newest first.
    pub fn after_desc(&self, block: u64) -> impl Iterator<Item = (u64, &[HistoryEntry])> {
        self.blocks
            .range(block.saturating_add(1)..)
            .rev()
            .map(|(b, e)| (*b, e.as_slice()))
            .filter(move |(b, _)| *b > block)
    }

    /// Blocks at or before `block`, newest first.
    pub fn through_desc(&self, block: u64) -> impl Iterator<Item = (u64, &[HistoryEntry])> {
        self.blocks
            .range(..=block)
            .rev()
            .map(|(b, e)| (*b, e.as_slice()))
    }
}

/// A name's state at a target block, with consensus fields restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedRecord {
    pub block_height: u64,
    pub operation: NameOperation,
}

impl ReconstructedRecord {
    pub fn vtxindex(&self) -> u64 {
        self.operation.vtxindex
    }

    pub fn txid(&self) -> &str {
        &self.operation.txid
    }
}
