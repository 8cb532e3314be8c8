//! Test utilities: a scripted in-memory transport and JSON fixture builders.
//!
//! ```ignore
//! let mock = MockTransport::new();
//! mock.reply(RpcMethod::GetNumNames, envelope(json!({"count": 2})));
//! mock.on(RpcMethod::GetAllNames, |params| Ok(envelope(json!({"names": [...]}))));
//! let client = LedgerClient::new(&mock);
//! assert_eq!(mock.call_count(RpcMethod::GetAllNames), 1);
//! ```

use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bns_types::Opcode;

use crate::error::RpcError;
use crate::method::RpcMethod;
use crate::transport::Transport;

type Handler = Arc<dyn Fn(&[Value]) -> Result<Value, RpcError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: RpcMethod,
    pub params: Vec<Value>,
}

/// Answers calls from per-method reply queues, falling back to a
/// per-method handler. Every call is recorded.
#[derive(Default)]
pub struct MockTransport {
    queued: Mutex<HashMap<RpcMethod, VecDeque<Result<Value, RpcError>>>>,
    handlers: Mutex<HashMap<RpcMethod, Handler>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw reply for the next call to `method`.
    pub fn reply(&self, method: RpcMethod, value: Value) -> &Self {
        self.queued
            .lock()
            .entry(method)
            .or_default()
            .push_back(Ok(value));
        self
    }

    /// Queue a transport-level failure for the next call to `method`.
    pub fn fail(&self, method: RpcMethod, error: RpcError) -> &Self {
        self.queued
            .lock()
            .entry(method)
            .or_default()
            .push_back(Err(error));
        self
    }

    /// Answer every call to `method` not covered by a queued reply.
    pub fn on<F>(&self, method: RpcMethod, handler: F) -> &Self
    where
        F: Fn(&[Value]) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        self.handlers.lock().insert(method, Arc::new(handler));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, method: RpcMethod) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    pub fn params_of(&self, method: RpcMethod) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.params.clone())
            .collect()
    }
}

impl Transport for MockTransport {
    fn call(&self, method: RpcMethod, params: &[Value]) -> Result<Value, RpcError> {
        self.calls.lock().push(RecordedCall {
            method,
            params: params.to_vec(),
        });

        let queued = self
            .queued
            .lock()
            .get_mut(&method)
            .and_then(VecDeque::pop_front);
        if let Some(reply) = queued {
            return reply;
        }

        // Clone out so the handler runs without holding the lock.
        let handler = self.handlers.lock().get(&method).cloned();
        match handler {
            Some(handler) => handler(params),
            None => Err(RpcError::Transport(format!(
                "no scripted reply for {}",
                method
            ))),
        }
    }
}

// ---- Fixtures ----

pub const TEST_ADDRESS: &str = "1BoatSLRHtKNngkdXEeobR76b53LETtpyT";

/// Add the status envelope to a response body.
pub fn envelope(body: Value) -> Value {
    envelope_at(body, Some(1000))
}

pub fn envelope_at(body: Value, lastblock: Option<u64>) -> Value {
    let mut map = Map::new();
    map.insert("status".into(), json!(true));
    map.insert("indexing".into(), json!(false));
    map.insert("lastblock".into(), json!(lastblock));
    if let Value::Object(fields) = body {
        map.extend(fields);
    }
    Value::Object(map)
}

pub fn error_reply(message: &str) -> Value {
    json!({ "error": message })
}

/// A 64-hex transaction id derived from `seed`.
pub fn txid(seed: u8) -> String {
    format!("{:02x}", seed).repeat(32)
}

/// A 40-hex consensus hash derived from `seed`.
pub fn consensus_hash(seed: u8) -> String {
    format!("{:02x}", seed).repeat(20)
}

/// A 40-hex value hash derived from `seed`.
pub fn value_hash(seed: u8) -> String {
    format!("{:02x}", seed.wrapping_add(0x80)).repeat(20)
}

/// P2PKH script paying to a hash derived from `seed`.
pub fn p2pkh_script(seed: u8) -> String {
    format!("76a914{}88ac", format!("{:02x}", seed).repeat(20))
}

/// A server history row with `history_data` serialized from `prior`.
pub fn history_row(name: &str, block: u64, vtxindex: u64, txid: &str, op: &str, prior: Value) -> Value {
    json!({
        "txid": txid,
        "history_id": name,
        "block_id": block,
        "vtxindex": vtxindex,
        "op": op,
        "history_data": prior.to_string(),
    })
}

/// Builder for name operation JSON as the server reports it.
///
/// # Example
///
/// ```ignore
/// let op = NameOpBuilder::new("alice.id")
///     .op("+")
///     .txid(&txid(7))
///     .vtxindex(3)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct NameOpBuilder {
    fields: Map<String, Value>,
}

impl NameOpBuilder {
    /// A registration of `name` at block 100 with test defaults.
    pub fn new(name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), json!(name));
        fields.insert("op".into(), json!(":"));
        fields.insert("opcode".into(), json!(Opcode::NameRegistration.as_str()));
        fields.insert("txid".into(), json!(txid(1)));
        fields.insert("vtxindex".into(), json!(1));
        fields.insert("address".into(), json!(TEST_ADDRESS));
        fields.insert("sender".into(), json!(p2pkh_script(1)));
        fields.insert("block_number".into(), json!(100));
        fields.insert("first_registered".into(), json!(100));
        fields.insert("last_renewed".into(), json!(100));
        fields.insert("op_fee".into(), json!(6_400_000));
        fields.insert("consensus_hash".into(), json!(consensus_hash(1)));
        fields.insert("value_hash".into(), Value::Null);
        fields.insert("revoked".into(), json!(false));
        Self { fields }
    }

    /// Set the wire op code; the symbolic opcode follows it.
    pub fn op(mut self, op: &str) -> Self {
        self.fields.insert("op".into(), json!(op));
        if let Some(opcode) = Opcode::from_op(op) {
            self.fields.insert("opcode".into(), json!(opcode.as_str()));
        }
        self
    }

    pub fn txid(mut self, txid: &str) -> Self {
        self.fields.insert("txid".into(), json!(txid));
        self
    }

    pub fn vtxindex(mut self, vtxindex: u64) -> Self {
        self.fields.insert("vtxindex".into(), json!(vtxindex));
        self
    }

    pub fn block_number(mut self, block: u64) -> Self {
        self.fields.insert("block_number".into(), json!(block));
        self
    }

    pub fn consensus_hash(mut self, hash: Option<&str>) -> Self {
        self.fields.insert("consensus_hash".into(), json!(hash));
        self
    }

    pub fn value_hash(mut self, hash: Option<&str>) -> Self {
        self.fields.insert("value_hash".into(), json!(hash));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}
