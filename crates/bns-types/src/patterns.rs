//! Fixed-format checks for untrusted wire fields.
//!
//! Every check is a plain predicate over `&str`. [`check_str`] and
//! [`check_opt_str`] turn a failed predicate into a message naming the field,
//! which is what the response validator reports.

use base64::Engine;

/// Length of a consensus hash in bytes (hex-encoded on the wire).
pub const LENGTH_CONSENSUS_HASH: usize = 20;
/// Length of a value (zonefile) hash in bytes.
pub const LENGTH_VALUE_HASH: usize = 20;
/// Length of a transaction id in bytes.
pub const LENGTH_TXID: usize = 32;
/// Maximum length of a fully-qualified name.
pub const LENGTH_MAX_NAME: usize = 37;
/// Maximum length of a namespace id.
pub const LENGTH_MAX_NAMESPACE_ID: usize = 19;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Single-character op codes plus the three two-character forms
/// (transfer-keep, transfer-remove, renewal).
const SINGLE_OP_CODES: &str = "?:+>~;*&!#";
const DOUBLE_OP_CODES: [&str; 3] = [">>", ">~", "::"];

pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn is_hex_len(s: &str, chars: usize) -> bool {
    s.len() == chars && is_hex(s)
}

pub fn is_consensus_hash(s: &str) -> bool {
    is_hex_len(s, LENGTH_CONSENSUS_HASH * 2)
}

pub fn is_value_hash(s: &str) -> bool {
    is_hex_len(s, LENGTH_VALUE_HASH * 2)
}

pub fn is_txid(s: &str) -> bool {
    is_hex_len(s, LENGTH_TXID * 2)
}

pub fn is_namespace_id_hash(s: &str) -> bool {
    is_hex_len(s, 16)
}

/// Pay-to-pubkey-hash script: `76a914<20-byte hash>88ac`.
pub fn is_p2pkh_script(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.len() == 50
        && lower.starts_with("76a914")
        && lower.ends_with("88ac")
        && is_hex(&lower[6..46])
}

/// Scripts and public keys are arbitrary non-empty hex.
pub fn is_script(s: &str) -> bool {
    is_hex(s)
}

pub fn is_address(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

pub fn is_op_code(s: &str) -> bool {
    match s.len() {
        1 => SINGLE_OP_CODES.contains(s),
        2 => DOUBLE_OP_CODES.contains(&s),
        _ => false,
    }
}

/// Matches the name character pattern only (3-37 chars of `[a-z0-9-_.+]`).
pub fn is_name_pattern(s: &str) -> bool {
    (3..=LENGTH_MAX_NAME).contains(&s.len())
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"-_.+".contains(&b))
}

pub fn is_namespace_id(s: &str) -> bool {
    (1..=LENGTH_MAX_NAMESPACE_ID).contains(&s.len())
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"-_+".contains(&b))
}

/// A fully-qualified name: `label.namespace`, within the name pattern.
pub fn is_name_valid(s: &str) -> bool {
    if !is_name_pattern(s) {
        return false;
    }
    match s.split_once('.') {
        Some((label, namespace)) => !label.is_empty() && is_namespace_id(namespace),
        None => false,
    }
}

/// Canonical standard base64 (padding required). The empty string is valid.
pub fn is_base64(s: &str) -> bool {
    s.len() % 4 == 0 && base64::engine::general_purpose::STANDARD.decode(s).is_ok()
}

/// Check a required string field against a predicate.
pub fn check_str(field: &str, value: &str, pred: fn(&str) -> bool) -> Result<(), String> {
    if pred(value) {
        Ok(())
    } else {
        Err(format!("field '{}' has invalid value '{}'", field, value))
    }
}

/// Check an optional string field; `None` always passes.
pub fn check_opt_str(
    field: &str,
    value: Option<&str>,
    pred: fn(&str) -> bool,
) -> Result<(), String> {
    match value {
        Some(v) => check_str(field, v, pred),
        None => Ok(()),
    }
}
