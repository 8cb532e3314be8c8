//! Error taxonomy for every boundary call.

use serde_json::{json, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use thiserror::Error;

use bns_types::env_utils::env_bool;

use crate::method::RpcMethod;

/// The three failure families a caller needs to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connectivity, timeout or an undecodable body. Always local.
    Transport,
    /// The server reported a failure, or its reply does not match the
    /// expected schema.
    Validation,
    /// The reply is well-formed but semantically wrong.
    Integrity,
}

#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("{0}")]
    Transport(String),

    /// The server answered with the `{"error": ...}` shape.
    #[error("{0}")]
    Server(String),

    #[error("Invalid response to {method}: {message}")]
    Schema {
        method: RpcMethod,
        message: String,
        /// Captured when `BNS_DEBUG` is set or `RUST_BACKTRACE` enables it.
        backtrace: Option<String>,
    },

    /// Rejected locally before anything was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Integrity(String),
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::Transport(_) => ErrorKind::Transport,
            RpcError::Server(_) | RpcError::Schema { .. } | RpcError::InvalidArgument(_) => {
                ErrorKind::Validation
            }
            RpcError::Integrity(_) => ErrorKind::Integrity,
        }
    }

    /// Build a schema error, capturing a backtrace in debug contexts.
    pub fn schema(method: RpcMethod, message: impl Into<String>) -> Self {
        let backtrace = if env_bool("BNS_DEBUG") {
            Some(Backtrace::force_capture().to_string())
        } else {
            let bt = Backtrace::capture();
            match bt.status() {
                BacktraceStatus::Captured => Some(bt.to_string()),
                _ => None,
            }
        };
        RpcError::Schema {
            method,
            message: message.into(),
            backtrace,
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        RpcError::Integrity(message.into())
    }

    pub fn message(&self) -> String {
        match self {
            RpcError::Transport(m)
            | RpcError::Server(m)
            | RpcError::InvalidArgument(m)
            | RpcError::Integrity(m) => m.clone(),
            RpcError::Schema { .. } => self.to_string(),
        }
    }

    /// The wire-style `{"error": ..., "traceback": [...]}` rendering.
    pub fn to_json(&self) -> Value {
        match self {
            RpcError::Schema {
                backtrace: Some(bt),
                ..
            } => json!({
                "error": self.message(),
                "traceback": bt.lines().collect::<Vec<_>>(),
            }),
            _ => json!({ "error": self.message() }),
        }
    }
}
