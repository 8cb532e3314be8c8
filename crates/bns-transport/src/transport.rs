//! The boundary every remote call goes through.

use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use bns_types::{ClientConfig, PeerAddress};

use crate::error::RpcError;
use crate::method::RpcMethod;
use crate::xmlrpc;

/// Sends one method call and returns the raw decoded JSON reply.
///
/// Implementations must be usable from several threads at once; the
/// production transport shares one connection pool.
pub trait Transport: Send + Sync {
    fn call(&self, method: RpcMethod, params: &[Value]) -> Result<Value, RpcError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn call(&self, method: RpcMethod, params: &[Value]) -> Result<Value, RpcError> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&self, method: RpcMethod, params: &[Value]) -> Result<Value, RpcError> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn call(&self, method: RpcMethod, params: &[Value]) -> Result<Value, RpcError> {
        (**self).call(method, params)
    }
}

/// XML-RPC over HTTP POST to `/RPC2`.
pub struct XmlRpcTransport {
    endpoint: String,
    agent: ureq::Agent,
    next_id: AtomicU64,
}

impl XmlRpcTransport {
    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    pub fn new(config: &ClientConfig) -> Self {
        Self::with_timeouts(&config.endpoint(), config.timeout, config.connect_timeout)
    }

    /// Create a transport for an explicit endpoint URL.
    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
            next_id: AtomicU64::new(0),
        }
    }

    /// A transport to an Atlas peer. The connect timeout is capped by the
    /// overall timeout.
    pub fn for_peer(peer: &PeerAddress, timeout: Duration) -> Self {
        let connect_timeout =
            timeout.min(Duration::from_secs(bns_types::config::DEFAULT_CONNECT_TIMEOUT_SECS));
        Self::with_timeouts(&peer.url(), timeout, connect_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, body: &str) -> Result<String, RpcError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "text/xml")
            .send_string(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => RpcError::Transport(format!(
                    "HTTP status {} from {}",
                    code, self.endpoint
                )),
                ureq::Error::Transport(t) => {
                    RpcError::Transport(format!("Failed to reach {}: {}", self.endpoint, t))
                }
            })?;
        response
            .into_string()
            .map_err(|e| RpcError::Transport(format!("Failed to read response body: {}", e)))
    }
}

impl Transport for XmlRpcTransport {
    fn call(&self, method: RpcMethod, params: &[Value]) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        debug!(rpc_id = id, method = %method, endpoint = %self.endpoint, "RPC begin");

        let body = xmlrpc::encode_call(method.as_str(), params)?;
        let result = self.post(&body).and_then(|text| {
            let payload = xmlrpc::decode_response(&text)?;
            parse_payload(method, payload)
        });

        match &result {
            Ok(_) => debug!(
                rpc_id = id,
                method = %method,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "RPC end"
            ),
            Err(e) => debug!(
                rpc_id = id,
                method = %method,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "RPC failed"
            ),
        }
        result
    }
}

/// Parse the JSON text carried in the response. Every method replies with
/// a JSON string, so a missing, non-string or blank parameter is as bad as
/// unparseable text.
fn parse_payload(method: RpcMethod, payload: Option<String>) -> Result<Value, RpcError> {
    let text = payload.unwrap_or_default();
    serde_json::from_str(&text).map_err(|e| {
        debug!(method = %method, raw = %text, "unparseable reply: {}", e);
        error!("Server replied invalid JSON");
        RpcError::Transport("Server replied invalid JSON".to_string())
    })
}
