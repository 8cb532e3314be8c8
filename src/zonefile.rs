//! Zonefile content addressing.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// `RIPEMD160(SHA256(data))`, hex-encoded.
pub fn hash160(data: &[u8]) -> String {
    let sha = Sha256::digest(data);
    hex::encode(Ripemd160::digest(sha))
}

/// The hash a zonefile is published under.
pub fn zonefile_hash(data: &[u8]) -> String {
    hash160(data)
}

/// Whether `data` is the zonefile published as `hash` (case-insensitive).
pub fn verify_zonefile(data: &[u8], hash: &str) -> bool {
    zonefile_hash(data).eq_ignore_ascii_case(hash)
}
