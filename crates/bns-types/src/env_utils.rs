//! Environment variable parsing utilities.
//!
//! Client settings (server host, port, timeouts, debug capture) can all be
//! overridden from the environment. These helpers keep that parsing in one
//! place:
//!
//! ```
//! use bns_types::env_utils::{env_bool, env_string_or, env_var_or};
//!
//! let port: u16 = env_var_or("BNS_PORT", 6264);
//! let server = env_string_or("BNS_SERVER", "localhost");
//! let debug = env_bool("BNS_DEBUG");
//! # let _ = (port, server, debug);
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or unparseable.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Check if an environment variable is set to a truthy value.
///
/// Truthy values are "1", "true", "yes" and "on" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Get an environment variable as a string with a default value.
pub fn env_string_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("BNS_TEST_U64", " 42 ");
        let val: Option<u64> = env_var("BNS_TEST_U64");
        assert_eq!(val, Some(42));

        std::env::set_var("BNS_TEST_U64_BAD", "forty-two");
        let bad: Option<u64> = env_var("BNS_TEST_U64_BAD");
        assert_eq!(bad, None);

        let missing: Option<u64> = env_var("BNS_NONEXISTENT_VAR_1");
        assert_eq!(missing, None);

        std::env::remove_var("BNS_TEST_U64");
        std::env::remove_var("BNS_TEST_U64_BAD");
    }

    #[test]
    fn test_env_var_or() {
        std::env::set_var("BNS_TEST_PORT", "7000");
        let val: u16 = env_var_or("BNS_TEST_PORT", 6264);
        assert_eq!(val, 7000);

        // Out of range for u16 falls back to the default
        std::env::set_var("BNS_TEST_PORT", "70000");
        let val: u16 = env_var_or("BNS_TEST_PORT", 6264);
        assert_eq!(val, 6264);

        std::env::remove_var("BNS_TEST_PORT");
    }

    #[test]
    fn test_env_bool() {
        std::env::set_var("BNS_TEST_BOOL_ON", "On");
        std::env::set_var("BNS_TEST_BOOL_OFF", "0");

        assert!(env_bool("BNS_TEST_BOOL_ON"));
        assert!(!env_bool("BNS_TEST_BOOL_OFF"));
        assert!(!env_bool("BNS_NONEXISTENT_VAR_2"));

        std::env::remove_var("BNS_TEST_BOOL_ON");
        std::env::remove_var("BNS_TEST_BOOL_OFF");
    }

    #[test]
    fn test_env_string_or_ignores_blank() {
        std::env::set_var("BNS_TEST_STRING", "   ");
        assert_eq!(env_string_or("BNS_TEST_STRING", "localhost"), "localhost");
        std::env::set_var("BNS_TEST_STRING", "node.example.org");
        assert_eq!(
            env_string_or("BNS_TEST_STRING", "localhost"),
            "node.example.org"
        );
        std::env::remove_var("BNS_TEST_STRING");
    }
}
