use thiserror::Error;

use bns_transport::RpcError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Invalid history data: {0}")]
    InvalidHistoryData(String),

    #[error("Invalid history data: block key '{0}' is not a height")]
    InvalidBlockKey(String),

    /// The record was reported as affected at a block its history does not
    /// mention.
    #[error("No history at block {0} for a record affected there")]
    MissingBlock(u64),

    #[error("History replay mismatch: expected txid {expected}, found {found}")]
    ReplayMismatch { expected: String, found: String },

    #[error("Invalid reconstructed state: {0}")]
    InvalidState(String),

    #[error("No earlier consensus hash for {name} at block {block}")]
    MissingConsensusHash { name: String, block: u64 },

    #[error("{opcode} operation at block {block} has no name")]
    MissingName { opcode: String, block: u64 },

    #[error("Invalid op_fee {0}")]
    InvalidOpFee(String),
}

impl From<HistoryError> for RpcError {
    fn from(err: HistoryError) -> Self {
        RpcError::Integrity(err.to_string())
    }
}
