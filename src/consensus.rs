//! Consensus hash queries.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

use bns_transport::endpoints::{GetBlockFromConsensus, GetConsensusAt, GetConsensusHashes};
use bns_transport::{RpcError, Transport};
use bns_types::ConsensusHash;

use crate::client::LedgerClient;

/// Most heights one consensus hash query may name.
pub const MAX_CONSENSUS_HEIGHTS: u64 = 10_000;

/// Block heights travel as XML-RPC `<int>`s.
const MAX_BLOCK_HEIGHT: u64 = i32::MAX as u64;

/// Only plain decimal heights, as the server writes them.
fn parse_height(key: &str) -> Option<u64> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

impl<T: Transport> LedgerClient<T> {
    pub fn get_consensus_at(&self, block_height: u64) -> Result<ConsensusHash, RpcError> {
        let body = self
            .request_body(&GetConsensusAt { block_height })
            .inspect_err(|e| error!("Failed to get consensus hash at {}: {}", block_height, e))?;
        Ok(body.consensus)
    }

    /// Consensus hashes for `block_heights`, keyed by height.
    pub fn get_consensus_hashes(
        &self,
        block_heights: &[u64],
    ) -> Result<BTreeMap<u64, ConsensusHash>, RpcError> {
        if block_heights.len() as u64 > MAX_CONSENSUS_HEIGHTS {
            return Err(RpcError::InvalidArgument(format!(
                "{} heights requested, at most {} per query",
                block_heights.len(),
                MAX_CONSENSUS_HEIGHTS
            )));
        }
        let body = self
            .request_body(&GetConsensusHashes {
                block_heights: block_heights.to_vec(),
            })
            .inspect_err(|e| {
                error!(
                    "Failed to get consensus hashes for {} blocks: {}",
                    block_heights.len(),
                    e
                )
            })?;

        let mut hashes = BTreeMap::new();
        for (key, hash) in body.consensus_hashes {
            let height = parse_height(&key)
                .ok_or_else(|| RpcError::integrity("Invalid data: expected int"))?;
            let hash = match hash {
                Value::String(s) => ConsensusHash::try_from(s).map_err(RpcError::Integrity)?,
                _ => return Err(RpcError::integrity("Invalid data: expected consensus hash")),
            };
            hashes.insert(height, hash);
        }
        debug!(requested = block_heights.len(), received = hashes.len(), "consensus hashes");
        Ok(hashes)
    }

    /// Consensus hashes for every height in `[start, end]`.
    ///
    /// The reply must cover the whole range. Heights outside it are dropped.
    /// Ranges longer than [`MAX_CONSENSUS_HEIGHTS`] are refused before any
    /// request is made.
    pub fn get_consensus_range(
        &self,
        start: u64,
        end: u64,
    ) -> Result<BTreeMap<u64, ConsensusHash>, RpcError> {
        if start > end {
            return Err(RpcError::InvalidArgument(format!(
                "consensus range start {} is after end {}",
                start, end
            )));
        }
        if end > MAX_BLOCK_HEIGHT {
            return Err(RpcError::InvalidArgument(format!(
                "block height {} is out of range",
                end
            )));
        }
        if end - start >= MAX_CONSENSUS_HEIGHTS {
            return Err(RpcError::InvalidArgument(format!(
                "consensus range {}..={} spans more than {} blocks",
                start, end, MAX_CONSENSUS_HEIGHTS
            )));
        }
        let heights: Vec<u64> = (start..=end).collect();
        let mut hashes = self.get_consensus_hashes(&heights)?;

        let before = hashes.len();
        hashes.retain(|height, _| (start..=end).contains(height));
        if hashes.len() != before {
            warn!(
                start,
                end,
                discarded = before - hashes.len(),
                "server replied consensus hashes outside the requested range"
            );
        }

        if heights.iter().any(|h| !hashes.contains_key(h)) {
            return Err(RpcError::integrity("Missing consensus hashes"));
        }
        Ok(hashes)
    }

    /// The block a consensus hash was generated at, if the server knows it.
    pub fn get_block_from_consensus(&self, consensus_hash: &str) -> Result<Option<u64>, RpcError> {
        let body = self
            .request_body(&GetBlockFromConsensus {
                consensus_hash: consensus_hash.to_string(),
            })
            .inspect_err(|e| error!("Failed to find block ID for {}: {}", consensus_hash, e))?;
        Ok(body.block_id)
    }
}
