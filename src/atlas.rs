//! Atlas peer gossip: zonefile inventories, peer lists and zonefile
//! exchange with a single peer.
//!
//! Zonefiles are content-addressed, so every zonefile a peer returns is
//! checked against the hash it was requested under.

use base64::Engine;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use bns_transport::endpoints::{GetAtlasPeers, GetZonefileInventory, GetZonefiles, PutZonefiles};
use bns_transport::{Envelope, RpcCall, RpcClient, RpcError, Transport, XmlRpcTransport};
use bns_types::PeerAddress;

use crate::zonefile::verify_zonefile;

/// Default per-call timeout when talking to a peer.
pub const ATLAS_TIMEOUT_SECS: u64 = 30;

const ZONEFILE_MISMATCH: &str = "Zonefile data mismatch";
const INVALID_PEER_LISTING: &str = "Invalid peer listing";

pub struct AtlasClient<T: Transport = XmlRpcTransport> {
    rpc: RpcClient<T>,
}

impl AtlasClient<XmlRpcTransport> {
    pub fn for_peer(peer: &PeerAddress, timeout: Duration) -> Self {
        Self::new(XmlRpcTransport::for_peer(peer, timeout))
    }
}

impl<T: Transport> AtlasClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            rpc: RpcClient::new(transport),
        }
    }

    fn request_body<C, B>(&self, call: &C) -> Result<B, RpcError>
    where
        C: RpcCall<Response = Envelope<B>>,
    {
        Ok(self.rpc.request(call)?.body)
    }

    /// The peer's inventory bitmap for `bit_count` names from `bit_offset`.
    pub fn get_zonefile_inventory(
        &self,
        bit_offset: u64,
        bit_count: u64,
    ) -> Result<Vec<u8>, RpcError> {
        let body = self.request_body(&GetZonefileInventory {
            bit_offset,
            bit_count,
        })?;
        let inv = base64::engine::general_purpose::STANDARD
            .decode(&body.inv)
            .map_err(|e| RpcError::integrity(format!("Failed to decode zonefile inventory: {}", e)))?;

        let max_len = bit_count.div_ceil(8);
        if inv.len() as u64 > max_len {
            return Err(RpcError::integrity(format!(
                "Zonefile inventory is too long (got {} bytes, expected at most {})",
                inv.len(),
                max_len
            )));
        }
        Ok(inv)
    }

    pub fn get_atlas_peers(&self) -> Result<Vec<PeerAddress>, RpcError> {
        let body = self.request_body(&GetAtlasPeers)?;
        body.peers
            .iter()
            .map(|listing| {
                if !PeerAddress::is_listing_form(listing) {
                    warn!(listing = %listing, "malformed peer listing");
                    return Err(RpcError::integrity(INVALID_PEER_LISTING));
                }
                listing.parse::<PeerAddress>().map_err(|e| {
                    warn!(listing = %listing, "unparseable peer listing: {}", e);
                    RpcError::integrity(INVALID_PEER_LISTING)
                })
            })
            .collect()
    }

    /// Fetch zonefiles by hash, keyed by hash.
    ///
    /// Hashes the peer does not hold are simply absent. A zonefile that was
    /// not requested, or whose content does not hash to its key, fails the
    /// whole batch.
    pub fn get_zonefiles<S: AsRef<str>>(
        &self,
        zonefile_hashes: &[S],
    ) -> Result<BTreeMap<String, Vec<u8>>, RpcError> {
        let requested: HashSet<String> = zonefile_hashes
            .iter()
            .map(|h| h.as_ref().to_ascii_lowercase())
            .collect();
        let body = self.request_body(&GetZonefiles {
            zonefile_hashes: zonefile_hashes.iter().map(|h| h.as_ref().to_string()).collect(),
        })?;

        let mut zonefiles = BTreeMap::new();
        for (hash, data) in body.zonefiles {
            if !requested.contains(&hash.to_ascii_lowercase()) {
                warn!(hash = %hash, "peer sent a zonefile that was not requested");
                return Err(RpcError::integrity(ZONEFILE_MISMATCH));
            }
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&data)
                .map_err(|_| RpcError::integrity(ZONEFILE_MISMATCH))?;
            if !verify_zonefile(&bytes, &hash) {
                warn!(hash = %hash, "zonefile does not match its hash");
                return Err(RpcError::integrity(ZONEFILE_MISMATCH));
            }
            zonefiles.insert(hash, bytes);
        }
        debug!(
            requested = requested.len(),
            received = zonefiles.len(),
            "fetched zonefiles"
        );
        Ok(zonefiles)
    }

    /// Push zonefiles to the peer. Returns one status per zonefile.
    pub fn put_zonefiles<Z: AsRef<[u8]>>(&self, zonefiles: &[Z]) -> Result<Vec<i64>, RpcError> {
        let encoded = zonefiles
            .iter()
            .map(|z| base64::engine::general_purpose::STANDARD.encode(z.as_ref()))
            .collect();
        let body = self.request_body(&PutZonefiles { zonefiles: encoded })?;
        Ok(body.saved)
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(ATLAS_TIMEOUT_SECS)
}

/// [`AtlasClient::get_zonefile_inventory`] against `peer` with the default
/// timeout.
pub fn get_zonefile_inventory(
    peer: &PeerAddress,
    bit_offset: u64,
    bit_count: u64,
) -> Result<Vec<u8>, RpcError> {
    AtlasClient::for_peer(peer, default_timeout()).get_zonefile_inventory(bit_offset, bit_count)
}

pub fn get_atlas_peers(peer: &PeerAddress) -> Result<Vec<PeerAddress>, RpcError> {
    AtlasClient::for_peer(peer, default_timeout()).get_atlas_peers()
}

pub fn get_zonefiles<S: AsRef<str>>(
    peer: &PeerAddress,
    zonefile_hashes: &[S],
) -> Result<BTreeMap<String, Vec<u8>>, RpcError> {
    AtlasClient::for_peer(peer, default_timeout()).get_zonefiles(zonefile_hashes)
}

pub fn put_zonefiles<Z: AsRef<[u8]>>(
    peer: &PeerAddress,
    zonefiles: &[Z],
) -> Result<Vec<i64>, RpcError> {
    AtlasClient::for_peer(peer, default_timeout()).put_zonefiles(zonefiles)
}
