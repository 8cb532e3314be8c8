//! Symbolic operation names and their wire op codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transfer op code that keeps the name's value hash.
pub const TRANSFER_KEEP_DATA: &str = ">>";
/// Transfer op code that clears the name's value hash.
pub const TRANSFER_REMOVE_DATA: &str = ">~";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    NamePreorder,
    NameRegistration,
    NameRenewal,
    NameUpdate,
    NameTransfer,
    NameRevoke,
    NameImport,
    NamespacePreorder,
    NamespaceReveal,
    NamespaceReady,
    Announce,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::NamePreorder,
        Opcode::NameRegistration,
        Opcode::NameRenewal,
        Opcode::NameUpdate,
        Opcode::NameTransfer,
        Opcode::NameRevoke,
        Opcode::NameImport,
        Opcode::NamespacePreorder,
        Opcode::NamespaceReveal,
        Opcode::NamespaceReady,
        Opcode::Announce,
    ];

    /// Resolve a wire op code (`"+"`, `">>"`, ...) to its symbolic opcode.
    pub fn from_op(op: &str) -> Option<Opcode> {
        let opcode = match op {
            "?" => Opcode::NamePreorder,
            ":" => Opcode::NameRegistration,
            "::" => Opcode::NameRenewal,
            "+" => Opcode::NameUpdate,
            ">" | TRANSFER_KEEP_DATA | TRANSFER_REMOVE_DATA => Opcode::NameTransfer,
            "~" => Opcode::NameRevoke,
            ";" => Opcode::NameImport,
            "*" => Opcode::NamespacePreorder,
            "&" => Opcode::NamespaceReveal,
            "!" => Opcode::NamespaceReady,
            "#" => Opcode::Announce,
            _ => return None,
        };
        Some(opcode)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::NamePreorder => "NAME_PREORDER",
            Opcode::NameRegistration => "NAME_REGISTRATION",
            Opcode::NameRenewal => "NAME_RENEWAL",
            Opcode::NameUpdate => "NAME_UPDATE",
            Opcode::NameTransfer => "NAME_TRANSFER",
            Opcode::NameRevoke => "NAME_REVOKE",
            Opcode::NameImport => "NAME_IMPORT",
            Opcode::NamespacePreorder => "NAMESPACE_PREORDER",
            Opcode::NamespaceReveal => "NAMESPACE_REVEAL",
            Opcode::NamespaceReady => "NAMESPACE_READY",
            Opcode::Announce => "ANNOUNCE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown opcode '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_variants_share_opcode() {
        assert_eq!(Opcode::from_op(">"), Some(Opcode::NameTransfer));
        assert_eq!(Opcode::from_op(">>"), Some(Opcode::NameTransfer));
        assert_eq!(Opcode::from_op(">~"), Some(Opcode::NameTransfer));
        assert_eq!(Opcode::from_op("::"), Some(Opcode::NameRenewal));
        assert_eq!(Opcode::from_op("%"), None);
    }

    #[test]
    fn test_name_round_trips_through_from_str() {
        for opcode in Opcode::ALL {
            assert_eq!(opcode.as_str().parse::<Opcode>(), Ok(opcode));
        }
        assert!("NAME_FROBNICATE".parse::<Opcode>().is_err());
    }

    #[test]
    fn test_serde_uses_symbolic_names() {
        let json = serde_json::to_string(&Opcode::NamespaceReveal).unwrap();
        assert_eq!(json, "\"NAMESPACE_REVEAL\"");
    }
}
