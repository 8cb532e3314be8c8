//! Shared helpers for the integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};

use bns_snv::RpcError;
use bns_transport::test_utils::{envelope, history_row};

pub fn test_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("name{}.id", i)).collect()
}

pub fn param_u64(params: &[Value], index: usize) -> u64 {
    params[index].as_u64().unwrap()
}

pub fn param_str(params: &[Value], index: usize) -> &str {
    params[index].as_str().unwrap()
}

/// Handler serving `(offset, count)` pages of `items` under `key`, the
/// offset and count read from `params[first_param..]`.
pub fn paged(
    key: &'static str,
    items: Vec<Value>,
    first_param: usize,
) -> impl Fn(&[Value]) -> Result<Value, RpcError> + Send + Sync + 'static {
    move |params| {
        let offset = param_u64(params, first_param) as usize;
        let count = param_u64(params, first_param + 1) as usize;
        let end = (offset + count).min(items.len());
        let page: Vec<Value> = items[offset.min(end)..end].to_vec();
        Ok(envelope(json!({ key: page })))
    }
}

/// Rows for `alice.id`: a registration at block 100, then two updates at
/// block 200 by `txid(2)` (vtxindex 1) and `txid(3)` (vtxindex 4). The
/// second update's prior state has no consensus hash.
pub fn alice_rows() -> Vec<Value> {
    use bns_transport::test_utils::{consensus_hash, txid, value_hash};
    vec![
        history_row(
            "alice.id",
            100,
            1,
            &txid(1),
            ":",
            json!({"history_snapshot": true, "op": "?", "txid": txid(0), "vtxindex": 0}),
        ),
        history_row(
            "alice.id",
            200,
            1,
            &txid(2),
            "+",
            json!({
                "txid": txid(1), "vtxindex": 1, "op": ":",
                "value_hash": null, "consensus_hash": consensus_hash(1),
            }),
        ),
        history_row(
            "alice.id",
            200,
            4,
            &txid(3),
            "+",
            json!({
                "txid": txid(2), "vtxindex": 1, "op": "+",
                "value_hash": value_hash(2), "consensus_hash": null,
            }),
        ),
    ]
}
