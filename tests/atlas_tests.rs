//! Atlas peer exchange against a scripted peer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use bns_snv::{zonefile_hash, AtlasClient, ErrorKind, PeerAddress, RpcMethod};
use bns_transport::test_utils::{envelope, MockTransport};

const ZONEFILE: &[u8] = b"$ORIGIN alice.id\n$TTL 3600\n_http._tcp URI 10 1 \"https://example.com\"\n";
const BOB_ZONEFILE: &[u8] = b"$ORIGIN bob.id\n";

#[test]
fn test_inventory_within_bit_count() {
    let mock = MockTransport::new();
    mock.reply(
        RpcMethod::GetZonefileInventory,
        envelope(json!({"inv": STANDARD.encode([0xffu8, 0x01])})),
    );
    let atlas = AtlasClient::new(&mock);

    assert_eq!(atlas.get_zonefile_inventory(0, 9).unwrap(), vec![0xff, 0x01]);
    assert_eq!(
        mock.params_of(RpcMethod::GetZonefileInventory)[0],
        vec![json!(0), json!(9)]
    );
}

#[test]
fn test_inventory_longer_than_requested() {
    let mock = MockTransport::new();
    mock.reply(
        RpcMethod::GetZonefileInventory,
        envelope(json!({"inv": STANDARD.encode([0u8; 3])})),
    );
    let atlas = AtlasClient::new(&mock);

    let err = atlas.get_zonefile_inventory(0, 16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_peer_listing() {
    let mock = MockTransport::new();
    mock.reply(
        RpcMethod::GetAtlasPeers,
        envelope(json!({"peers": ["node.example.com:6264", "10.0.0.7:16264"]})),
    );
    let atlas = AtlasClient::new(&mock);

    let peers = atlas.get_atlas_peers().unwrap();
    assert_eq!(peers[0], PeerAddress::new("node.example.com", 6264).unwrap());
    assert_eq!(peers[1].port, 16264);
}

#[test]
fn test_malformed_peers_are_rejected() {
    for listing in ["node.example.com", "node:080", "node:9", "node:99999", ":6264"] {
        let mock = MockTransport::new();
        mock.reply(
            RpcMethod::GetAtlasPeers,
            envelope(json!({"peers": ["good.example.com:6264", listing]})),
        );
        let atlas = AtlasClient::new(&mock);

        let err = atlas.get_atlas_peers().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity, "{}", listing);
        assert_eq!(err.to_string(), "Invalid peer listing");
    }
}

#[test]
fn test_zonefiles_are_checked_against_their_hash() {
    let hash = zonefile_hash(ZONEFILE);
    let missing = "00".repeat(20);
    let mock = MockTransport::new();
    mock.reply(
        RpcMethod::GetZonefiles,
        envelope(json!({"zonefiles": { hash.clone(): STANDARD.encode(ZONEFILE) }})),
    );
    let atlas = AtlasClient::new(&mock);

    let zonefiles = atlas.get_zonefiles(&[hash.clone(), missing.clone()]).unwrap();
    assert_eq!(zonefiles.len(), 1);
    assert_eq!(zonefiles[&hash], ZONEFILE);
    assert_eq!(
        mock.params_of(RpcMethod::GetZonefiles)[0],
        vec![json!([hash, missing])]
    );
}

#[test]
fn test_tampered_zonefile() {
    let hash = zonefile_hash(ZONEFILE);
    let mock = MockTransport::new();
    mock.reply(
        RpcMethod::GetZonefiles,
        envelope(json!({"zonefiles": { hash.clone(): STANDARD.encode(b"$ORIGIN mallory.id\n") }})),
    );
    let atlas = AtlasClient::new(&mock);

    let err = atlas.get_zonefiles(&[hash]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(err.to_string(), "Zonefile data mismatch");
}

#[test]
fn test_unrequested_zonefile() {
    let other = BOB_ZONEFILE;
    let mock = MockTransport::new();
    mock.reply(
        RpcMethod::GetZonefiles,
        envelope(json!({"zonefiles": { zonefile_hash(other): STANDARD.encode(other) }})),
    );
    let atlas = AtlasClient::new(&mock);

    let err = atlas.get_zonefiles(&[zonefile_hash(ZONEFILE)]).unwrap_err();
    assert_eq!(err.to_string(), "Zonefile data mismatch");
}

#[test]
fn test_non_canonical_base64_is_rejected() {
    let hash = zonefile_hash(b"a");
    for data in ["YQ", "YR==", "Y Q==", "YQ==="] {
        let mock = MockTransport::new();
        mock.reply(
            RpcMethod::GetZonefiles,
            envelope(json!({"zonefiles": { hash.clone(): data }})),
        )
        .reply(RpcMethod::GetZonefileInventory, envelope(json!({ "inv": data })));
        let atlas = AtlasClient::new(&mock);

        let err = atlas.get_zonefiles(&[hash.clone()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", data);
        let err = atlas.get_zonefile_inventory(0, 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", data);
    }
}

#[test]
fn test_put_zonefiles_sends_base64() {
    let mock = MockTransport::new();
    mock.reply(RpcMethod::PutZonefiles, envelope(json!({"saved": [1, 0]})));
    let atlas = AtlasClient::new(&mock);

    let saved = atlas.put_zonefiles(&[ZONEFILE, BOB_ZONEFILE]).unwrap();
    assert_eq!(saved, vec![1, 0]);
    assert_eq!(
        mock.params_of(RpcMethod::PutZonefiles)[0],
        vec![json!([STANDARD.encode(ZONEFILE), STANDARD.encode(BOB_ZONEFILE)])]
    );
}

#[test]
fn test_put_zonefiles_status_count_must_match() {
    let mock = MockTransport::new();
    mock.reply(RpcMethod::PutZonefiles, envelope(json!({"saved": [1]})));
    let atlas = AtlasClient::new(&mock);

    let err = atlas.put_zonefiles(&[ZONEFILE, ZONEFILE]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
