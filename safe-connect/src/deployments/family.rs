//! Contract interface families and version classification.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// The two mutually exclusive Safe contract interface families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionFamily {
    /// Single-layer singleton without indexer events.
    Legacy,
    /// L2 singleton emitting the extra events off-chain indexers rely on.
    #[serde(rename = "l2", alias = "layered_l2")]
    LayeredL2,
}

impl VersionFamily {
    /// Family assumed for a chain when nothing else is known: Legacy on
    /// mainnet, LayeredL2 everywhere else.
    #[must_use]
    pub fn default_for(chain_id: &ChainId) -> Self {
        if chain_id.is_mainnet() {
            Self::Legacy
        } else {
            Self::LayeredL2
        }
    }
}

impl fmt::Display for VersionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::LayeredL2 => f.write_str("l2"),
        }
    }
}

/// Error parsing a [`VersionFamily`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown version family '{0}', expected 'legacy' or 'l2'")]
pub struct ParseFamilyError(String);

impl FromStr for VersionFamily {
    type Err = ParseFamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "l1" => Ok(Self::Legacy),
            "l2" | "layered_l2" | "layeredl2" => Ok(Self::LayeredL2),
            _ => Err(ParseFamilyError(s.to_owned())),
        }
    }
}

/// First release that ships an L2 singleton.
const FIRST_LAYERED_RELEASE: Version = Version::new(1, 3, 0);

/// Whether `version` predates layered (L2) deployments, i.e. is below 1.3.0.
///
/// Build metadata such as `1.3.0+L2` is ignored. Unparseable versions are not
/// considered legacy.
#[must_use]
pub fn is_legacy_version(version: &str) -> bool {
    Version::parse(version.trim().trim_start_matches('v'))
        .is_ok_and(|v| Version::new(v.major, v.minor, v.patch) < FIRST_LAYERED_RELEASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_versions() {
        assert!(is_legacy_version("1.1.1"));
        assert!(is_legacy_version("1.2.0"));
        assert!(is_legacy_version("v1.0.0"));
        assert!(!is_legacy_version("1.3.0"));
        assert!(!is_legacy_version("1.3.0+L2"));
        assert!(!is_legacy_version("1.4.1"));
        assert!(!is_legacy_version("unknown"));
    }

    #[test]
    fn family_parsing_and_defaults() {
        assert_eq!("L2".parse::<VersionFamily>().unwrap(), VersionFamily::LayeredL2);
        assert_eq!("legacy".parse::<VersionFamily>().unwrap(), VersionFamily::Legacy);
        assert!("l3".parse::<VersionFamily>().is_err());
        assert_eq!(VersionFamily::default_for(&ChainId::new("1")), VersionFamily::Legacy);
        assert_eq!(
            VersionFamily::default_for(&ChainId::new("560000")),
            VersionFamily::LayeredL2
        );
    }
}
