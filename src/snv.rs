//! Simplified name verification: what the operations at a block looked like
//! when they were written.
//!
//! The server only stores current records and, per name, the field values
//! each operation overwrote. Reconstruction fetches the current records
//! affected at block B, fetches each name's history once, and replays it
//! backward to B. Any failure aborts the whole block.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use bns_history::{extract_embedded, extract_rows, reconstruct_name_at, restore_typed_through};
use bns_transport::endpoints::{
    GetNameopsAffectedAt, GetNumNameopsAffectedAt, GetNumOpHistoryRows, GetOpHistoryRows,
};
use bns_transport::{fetch_all, RpcError, Transport, HISTORY_PAGE_SIZE};
use bns_types::{HistoryLog, HistoryRow, NameOperation, NamespaceOperation, ReconstructedRecord};

use crate::client::LedgerClient;

impl<T: Transport> LedgerClient<T> {
    /// Current states of every record affected at `block_height`.
    pub fn get_nameops_affected_at(
        &self,
        block_height: u64,
    ) -> Result<Vec<NameOperation>, RpcError> {
        fetch_all(
            || Ok(self.request_body(&GetNumNameopsAffectedAt { block_height })?.count),
            |offset, count| {
                let body = self.request_body(&GetNameopsAffectedAt {
                    block_height,
                    offset,
                    count,
                })?;
                Ok(body.nameops)
            },
            HISTORY_PAGE_SIZE,
        )
    }

    /// Every history row of a name or namespace.
    pub fn get_op_history_rows(&self, history_id: &str) -> Result<Vec<HistoryRow>, RpcError> {
        fetch_all(
            || {
                let body = self.request_body(&GetNumOpHistoryRows {
                    history_id: history_id.to_string(),
                })?;
                Ok(body.count)
            },
            |offset, count| {
                let body = self.request_body(&GetOpHistoryRows {
                    history_id: history_id.to_string(),
                    offset,
                    count,
                })?;
                Ok(body.history_rows)
            },
            HISTORY_PAGE_SIZE,
        )
    }

    /// The operations at `block_height` as they were written, sorted by
    /// `vtxindex`.
    pub fn get_nameops_at(&self, block_height: u64) -> Result<Vec<ReconstructedRecord>, RpcError> {
        let affected = self
            .get_nameops_affected_at(block_height)
            .inspect_err(|e| {
                debug!("Failed to get nameops affected at {}: {}", block_height, e)
            })?;
        debug!("{} nameops at {}", affected.len(), block_height);

        let no_history = HistoryLog::new();
        let mut histories: HashMap<String, HistoryLog> = HashMap::new();
        let mut records = Vec::new();

        for nameop in &affected {
            // Outstanding preorders have no name and no history.
            let log: &HistoryLog = match &nameop.name {
                None => &no_history,
                Some(name) => match histories.entry(name.clone()) {
                    Entry::Occupied(cached) => &*cached.into_mut(),
                    Entry::Vacant(slot) => {
                        let rows = self.get_op_history_rows(name)?;
                        &*slot.insert(extract_rows(&rows)?)
                    }
                },
            };

            let restored = reconstruct_name_at(nameop, log, block_height, self.quirks())?;
            debug!(
                name = nameop.name.as_deref().unwrap_or("UNKNOWN"),
                operations = log.at(block_height).len(),
                history = log.len(),
                restored = restored.len(),
                txids = ?restored.iter().map(ReconstructedRecord::txid).collect::<Vec<_>>(),
                block_height,
                "restored nameop"
            );
            records.extend(restored);
        }

        records.sort_by_key(ReconstructedRecord::vtxindex);
        debug!("restored {} nameops at height {}", records.len(), block_height);
        Ok(records)
    }

    /// `name` as it stood after the last operation at or before
    /// `block_height`, replayed from the history its record embeds. `None`
    /// if the name did not exist yet.
    pub fn get_name_record_at(
        &self,
        name: &str,
        block_height: u64,
    ) -> Result<Option<NameOperation>, RpcError> {
        let record = self.get_name_blockchain_record(name)?;
        let log = extract_embedded(&record.history)?;
        Ok(restore_typed_through(&record.operation, &log, block_height)?)
    }

    pub fn get_namespace_record_at(
        &self,
        namespace_id: &str,
        block_height: u64,
    ) -> Result<Option<NamespaceOperation>, RpcError> {
        let record = self.get_namespace_blockchain_record(namespace_id)?;
        let log = extract_embedded(&record.history)?;
        let mut state: Option<NamespaceOperation> =
            restore_typed_through(&record.operation, &log, block_height)?;
        if let Some(state) = state.as_mut() {
            state.extra.remove("opcode");
        }
        Ok(state)
    }
}
