//! Lookup tables consulted by the account binder.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use alloy_primitives::{Address, B256};
use serde::Deserialize;

use super::canonical::{CANONICAL, Deployment, FALLBACK, FALLBACK_VERSION};
use super::{ContractAddressSet, VersionFamily};
use crate::chain::ChainId;

/// Static deployment of a chain missing from the canonical registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FallbackDeployment {
    /// Release version the contracts were built from.
    #[serde(default = "default_fallback_version")]
    pub version: String,
    /// Deployed addresses.
    #[serde(flatten)]
    pub contracts: ContractAddressSet,
}

fn default_fallback_version() -> String {
    FALLBACK_VERSION.to_owned()
}

/// Code hash of an upgradeable L2 singleton and the version it implements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeHashEntry {
    /// `keccak256` of the runtime bytecode.
    pub code_hash: B256,
    /// Version implemented by that bytecode.
    pub version: String,
}

/// `[deployments]` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeploymentsConfig {
    /// Additional chains bound exclusively through the fallback table.
    pub non_canonical: Vec<ChainId>,
    /// Additional or replacement fallback entries, keyed by chain id.
    pub fallback: BTreeMap<ChainId, FallbackDeployment>,
    /// Recognized upgradeable L2 singleton code hashes.
    pub l2_code_hashes: Vec<CodeHashEntry>,
}

/// A singleton matched in the canonical registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingletonMatch {
    /// Version of the matched release.
    pub version: &'static str,
    /// Family of the matched singleton.
    pub family: VersionFamily,
    /// Address set of the matched release.
    pub contracts: ContractAddressSet,
}

impl From<&Deployment> for SingletonMatch {
    fn from(d: &Deployment) -> Self {
        Self {
            version: d.version,
            family: d.family,
            contracts: d.contracts,
        }
    }
}

/// Canonical registry, fallback table and code-hash table in one place.
///
/// Every lookup is a pure function of the tables; the registry is built once
/// at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct DeploymentRegistry {
    canonical: &'static [Deployment],
    non_canonical: BTreeSet<ChainId>,
    fallback: BTreeMap<ChainId, FallbackDeployment>,
    l2_code_hashes: HashMap<B256, String>,
}

impl Default for DeploymentRegistry {
    fn default() -> Self {
        let fallback: BTreeMap<_, _> = FALLBACK
            .iter()
            .map(|(chain, contracts)| {
                (
                    ChainId::new(*chain),
                    FallbackDeployment {
                        version: default_fallback_version(),
                        contracts: *contracts,
                    },
                )
            })
            .collect();
        Self {
            canonical: CANONICAL,
            non_canonical: fallback.keys().cloned().collect(),
            fallback,
            l2_code_hashes: HashMap::new(),
        }
    }
}

impl DeploymentRegistry {
    /// Built-in tables extended with `config`.
    ///
    /// Every chain given a fallback entry is treated as non-canonical.
    #[must_use]
    pub fn with_config(config: &DeploymentsConfig) -> Self {
        let mut registry = Self::default();
        registry.non_canonical.extend(config.non_canonical.iter().cloned());
        for (chain, deployment) in &config.fallback {
            registry.non_canonical.insert(chain.clone());
            registry.fallback.insert(chain.clone(), deployment.clone());
        }
        registry.l2_code_hashes.extend(
            config
                .l2_code_hashes
                .iter()
                .map(|e| (e.code_hash, e.version.clone())),
        );
        registry
    }

    /// Registers an upgradeable L2 singleton code hash.
    #[must_use]
    pub fn with_l2_code_hash(mut self, code_hash: B256, version: impl Into<String>) -> Self {
        self.l2_code_hashes.insert(code_hash, version.into());
        self
    }

    /// Whether `chain_id` is bound only through the fallback table.
    #[must_use]
    pub fn is_non_canonical(&self, chain_id: &ChainId) -> bool {
        self.non_canonical.contains(chain_id)
    }

    /// Fallback deployment of a non-canonical chain.
    #[must_use]
    pub fn fallback(&self, chain_id: &ChainId) -> Option<&FallbackDeployment> {
        self.fallback.get(chain_id)
    }

    fn on_chain<'a>(
        &'a self,
        chain_id: &'a ChainId,
    ) -> impl DoubleEndedIterator<Item = &'a Deployment> {
        self.canonical
            .iter()
            .filter(move |d| d.networks.contains(&chain_id.as_str()))
    }

    /// Canonical address set of `version` and `family` on `chain_id`.
    #[must_use]
    pub fn lookup(
        &self,
        chain_id: &ChainId,
        version: &str,
        family: VersionFamily,
    ) -> Option<ContractAddressSet> {
        let version = normalize_version(version);
        self.on_chain(chain_id)
            .find(|d| d.family == family && d.version == version)
            .map(|d| d.contracts)
    }

    /// Finds the canonical release whose singleton is `implementation`.
    ///
    /// With a `version`, only that release is considered; otherwise every
    /// release deployed on the chain is, newest first.
    #[must_use]
    pub fn find_singleton(
        &self,
        chain_id: &ChainId,
        implementation: Address,
        version: Option<&str>,
    ) -> Option<SingletonMatch> {
        let version = version.map(normalize_version);
        self.on_chain(chain_id)
            .rev()
            .filter(|d| version.is_none_or(|v| d.version == v))
            .find(|d| d.contracts.singleton_address == implementation)
            .map(SingletonMatch::from)
    }

    /// Version implemented by an upgradeable L2 singleton with this code hash.
    #[must_use]
    pub fn l2_version_by_code_hash(&self, code_hash: &B256) -> Option<&str> {
        self.l2_code_hashes.get(code_hash).map(String::as_str)
    }
}

/// Strips build metadata such as `+L2` from a reported version.
fn normalize_version(version: &str) -> &str {
    let version = version.trim();
    version.split_once('+').map_or(version, |(v, _)| v)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256};

    use super::*;

    #[test]
    fn canonical_lookup_by_family() {
        let registry = DeploymentRegistry::default();
        let mainnet = ChainId::new("1");
        let l1 = registry.lookup(&mainnet, "1.3.0", VersionFamily::Legacy).unwrap();
        let l2 = registry.lookup(&mainnet, "1.3.0+L2", VersionFamily::LayeredL2).unwrap();
        assert_eq!(l1.singleton_address, address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552"));
        assert_eq!(l2.singleton_address, address!("3E5c63644E683549055b9Be8653de26E0B4CD36E"));
        assert_eq!(l1.multi_send_address, l2.multi_send_address);
        assert!(l1.is_complete());
        assert!(registry.lookup(&mainnet, "1.1.1", VersionFamily::LayeredL2).is_none());
        assert!(registry.lookup(&ChainId::new("560000"), "1.4.1", VersionFamily::LayeredL2).is_none());
    }

    #[test]
    fn finds_singletons_with_and_without_version() {
        let registry = DeploymentRegistry::default();
        let chain = ChainId::new("137");
        let l2 = address!("29fcB43b46531BcA003ddC8FCB67FFE91900C762");

        let found = registry.find_singleton(&chain, l2, None).unwrap();
        assert_eq!((found.version, found.family), ("1.4.1", VersionFamily::LayeredL2));
        assert!(registry.find_singleton(&chain, l2, Some("1.3.0")).is_none());
        assert!(registry.find_singleton(&ChainId::new("7777"), l2, None).is_none());
    }

    #[test]
    fn fallback_table_and_config_overrides() {
        let hash = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let config: DeploymentsConfig = toml::from_str(&format!(
            r#"
            non_canonical = ["999"]
            [fallback."777"]
            version = "1.3.0"
            singleton_address = "0x279caD2eA77c124e5c65091333E9c3FfE1ee5aCf"
            [[l2_code_hashes]]
            code_hash = "{hash}"
            version = "1.4.1"
            "#
        ))
        .unwrap();
        let registry = DeploymentRegistry::with_config(&config);

        assert!(registry.is_non_canonical(&ChainId::new("560000")));
        assert!(registry.is_non_canonical(&ChainId::new("565000")));
        assert!(registry.is_non_canonical(&ChainId::new("999")));
        assert!(registry.fallback(&ChainId::new("999")).is_none());

        let custom = registry.fallback(&ChainId::new("777")).unwrap();
        assert_eq!(custom.version, "1.3.0");
        assert_eq!(custom.contracts.proxy_factory_address, None);

        let hetu = registry.fallback(&ChainId::new("560000")).unwrap();
        assert_eq!(hetu.version, "1.4.1");
        assert!(hetu.contracts.is_complete());

        assert_eq!(registry.l2_version_by_code_hash(&hash), Some("1.4.1"));
        assert_eq!(registry.l2_version_by_code_hash(&B256::ZERO), None);
    }
}
