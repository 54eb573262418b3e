//! Chain identifier newtype.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chain of the Ethereum mainnet, the only chain whose default account
/// family is [`Legacy`](crate::VersionFamily::Legacy).
pub const MAINNET: &str = "1";

/// Decimal EIP-155 chain id as published by the chain registry (e.g. `"1"`,
/// `"560000"`).
///
/// The registry keys chains by their string id, so the string form is the
/// canonical one; [`ChainId::as_u64`] is only used when comparing against a
/// numeric id reported by an RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Creates a chain id from its decimal string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the decimal string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the id as a numeric EIP-155 chain id.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Returns the CAIP-2 form of this id (`"eip155:<id>"`).
    #[must_use]
    pub fn caip2(&self) -> String {
        format!("eip155:{}", self.0)
    }

    /// Whether this is Ethereum mainnet.
    #[must_use]
    pub fn is_mainnet(&self) -> bool {
        self.0 == MAINNET
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    /// Accepts a plain decimal id or a CAIP-2 `eip155:` id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("eip155:").unwrap_or(s);
        let numeric: u64 = raw.parse()?;
        Ok(Self(numeric.to_string()))
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl PartialEq<&str> for ChainId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_caip2_ids() {
        assert_eq!("560000".parse::<ChainId>().unwrap(), ChainId::from(560_000));
        assert_eq!("eip155:1".parse::<ChainId>().unwrap(), ChainId::new("1"));
        assert!("eth".parse::<ChainId>().is_err());
    }

    #[test]
    fn mainnet_detection() {
        assert!(ChainId::new("1").is_mainnet());
        assert!(!ChainId::new("10").is_mainnet());
        assert_eq!(ChainId::new("10").caip2(), "eip155:10");
    }
}
