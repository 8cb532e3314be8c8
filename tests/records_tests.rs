//! Current records and the predicates built on them.

use serde_json::{json, Value};

use bns_snv::{zonefile_hash, ErrorKind, LedgerClient, RpcError, RpcMethod};
use bns_transport::test_utils::{
    envelope, error_reply, txid, MockTransport, NameOpBuilder, TEST_ADDRESS,
};

const ZONEFILE: &[u8] = b"$ORIGIN alice.id\n$TTL 3600\n";

fn name_record(op: Value) -> Value {
    let mut record = op;
    record["history"] = json!({});
    envelope(json!({ "record": record }))
}

fn record_server(op: Value) -> MockTransport {
    let reply = name_record(op);
    let mock = MockTransport::new();
    mock.on(RpcMethod::GetNameBlockchainRecord, move |_| Ok(reply.clone()));
    mock
}

#[test]
fn test_name_record_keeps_unknown_fields() {
    let op = NameOpBuilder::new("alice.id")
        .field("expire_block", json!(152000))
        .build();
    let mock = record_server(op);
    let client = LedgerClient::new(&mock);

    let record = client.get_name_blockchain_record("alice.id").unwrap();
    assert_eq!(record.operation.name.as_deref(), Some("alice.id"));
    assert_eq!(record.operation.extra["expire_block"], json!(152000));
    assert!(record.history.is_empty());
}

#[test]
fn test_name_record_missing_required_field() {
    let mock = record_server(NameOpBuilder::new("alice.id").without("sender").build());
    let client = LedgerClient::new(&mock);

    let err = client.get_name_blockchain_record("alice.id").unwrap_err();
    assert!(matches!(err, RpcError::Schema { .. }));
    assert!(err.to_string().contains("sender"));
}

#[test]
fn test_predicates_on_a_live_record() {
    let op = NameOpBuilder::new("alice.id")
        .op("+")
        .txid(&txid(2))
        .value_hash(Some(&zonefile_hash(ZONEFILE)))
        .build();
    let mock = record_server(op);
    let client = LedgerClient::new(&mock);

    assert!(client.is_name_registered("alice.id"));
    assert!(client.has_zonefile_hash("alice.id"));
    assert!(client.is_zonefile_current("alice.id", ZONEFILE));
    assert!(!client.is_zonefile_current("alice.id", b"$ORIGIN mallory.id\n"));
    assert!(client.is_zonefile_hash_current("alice.id", &zonefile_hash(ZONEFILE)));
    assert!(client.is_name_owner("alice.id", TEST_ADDRESS));
    assert!(!client.is_name_owner("alice.id", "1CounterpartyXXXXXXXXXXXXXXXUWLpVr"));
}

#[test]
fn test_revoked_name_is_not_registered() {
    let op = NameOpBuilder::new("alice.id")
        .op("~")
        .field("revoked", json!(true))
        .build();
    let mock = record_server(op);
    let client = LedgerClient::new(&mock);

    assert!(!client.is_name_registered("alice.id"));
    assert!(!client.has_zonefile_hash("alice.id"));
}

#[test]
fn test_predicates_are_false_when_the_lookup_fails() {
    let mock = MockTransport::new();
    mock.on(RpcMethod::GetNameBlockchainRecord, |_| Ok(error_reply("Not found.")));
    let client = LedgerClient::new(&mock);

    assert!(!client.is_name_registered("ghost.id"));
    assert!(!client.has_zonefile_hash("ghost.id"));
    assert!(!client.is_zonefile_current("ghost.id", ZONEFILE));
    assert!(!client.is_name_owner("ghost.id", TEST_ADDRESS));
    assert_eq!(mock.call_count(RpcMethod::GetNameBlockchainRecord), 4);

    // No scripted reply at all is a transport failure; still just false.
    let offline = MockTransport::new();
    assert!(!LedgerClient::new(&offline).is_name_registered("alice.id"));
}

fn namespace_record() -> Value {
    json!({
        "namespace_id": "id",
        "op": "!",
        "opcode": "NAMESPACE_READY",
        "txid": txid(4),
        "vtxindex": 3,
        "address": TEST_ADDRESS,
        "sender": "76a914000000000000000000000000000000000000000088ac",
        "sender_pubkey": null,
        "recipient": null,
        "recipient_address": null,
        "block_number": 370000,
        "reveal_block": 370100,
        "ready_block": 370200,
        "ready": true,
        "lifetime": 52595,
        "base": 4,
        "coeff": 250,
        "buckets": [6, 5, 4, 3, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        "nonalpha_discount": 10,
        "no_vowel_discount": 10,
        "version": 2,
        "history": {
            "370100": [{
                "op": "*", "opcode": "NAMESPACE_PREORDER", "txid": txid(2), "vtxindex": 1,
                "history_snapshot": true,
            }],
            "370200": [{
                "op": "&", "opcode": "NAMESPACE_REVEAL", "txid": txid(3), "vtxindex": 5,
                "ready": false, "ready_block": null,
            }],
        },
    })
}

#[test]
fn test_namespace_record_and_its_past() {
    let mock = MockTransport::new();
    mock.on(RpcMethod::GetNamespaceBlockchainRecord, |_| {
        Ok(envelope(json!({ "record": namespace_record() })))
    });
    let client = LedgerClient::new(&mock);

    let record = client.get_namespace_blockchain_record("id").unwrap();
    assert!(record.operation.ready);
    assert!(!record.operation.extra.contains_key("opcode"));

    let revealed = client.get_namespace_record_at("id", 370150).unwrap().unwrap();
    assert!(!revealed.ready);
    assert_eq!(revealed.txid, txid(3));
    assert!(!revealed.extra.contains_key("opcode"));

    assert!(client.get_namespace_record_at("id", 369000).unwrap().is_none());
}

#[test]
fn test_nameops_hash() {
    let mock = MockTransport::new();
    mock.reply(RpcMethod::GetNameopsHashAt, envelope(json!({"ops_hash": "ab".repeat(32)})))
        .reply(RpcMethod::GetNameopsHashAt, envelope(json!({"ops_hash": "not hex"})));
    let client = LedgerClient::new(&mock);

    assert_eq!(client.get_nameops_hash_at(400000).unwrap(), "ab".repeat(32));
    assert_eq!(
        client.get_nameops_hash_at(400000).unwrap_err().kind(),
        ErrorKind::Validation
    );
}
