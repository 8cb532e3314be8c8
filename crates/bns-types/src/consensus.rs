//! Consensus hashes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::patterns::is_consensus_hash;

/// A 40-hex-char consensus hash, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConsensusHash(String);

impl ConsensusHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConsensusHash {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_consensus_hash(&value) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(format!("invalid consensus hash '{}'", value))
        }
    }
}

impl FromStr for ConsensusHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<ConsensusHash> for String {
    fn from(value: ConsensusHash) -> Self {
        value.0
    }
}

impl fmt::Display for ConsensusHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
