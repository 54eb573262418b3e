//! Insertion-ordered registry of supported chains.

use indexmap::IndexMap;

use super::{ChainConfig, ChainId};

/// Supported chains keyed by [`ChainId`], in the order the registry service
/// returned them.
///
/// A registry is built once from a complete listing and never edited
/// afterwards; a refetch produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: IndexMap<ChainId, ChainConfig>,
}

impl ChainRegistry {
    /// Number of chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the registry has no chains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Looks up a chain by id.
    #[must_use]
    pub fn get(&self, chain_id: &ChainId) -> Option<&ChainConfig> {
        self.chains.get(chain_id)
    }

    /// Whether `chain_id` is supported.
    #[must_use]
    pub fn contains(&self, chain_id: &ChainId) -> bool {
        self.chains.contains_key(chain_id)
    }

    /// Iterates chains in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }

    /// Finds a chain by its EIP-3770 short name.
    #[must_use]
    pub fn by_short_name(&self, short_name: &str) -> Option<&ChainConfig> {
        self.chains.values().find(|c| c.short_name == short_name)
    }

    /// Resolves a user-supplied chain reference: a short name, or a numeric id
    /// the registry knows about.
    #[must_use]
    pub fn resolve(&self, query: &str) -> Option<&ChainConfig> {
        if let Some(chain) = self.by_short_name(query) {
            return Some(chain);
        }
        if query.bytes().all(|b| b.is_ascii_digit()) {
            return self.chains.get(&ChainId::new(query));
        }
        None
    }

    /// Picks the active chain: an explicit hint (short name or id) wins, then
    /// the chain the wallet is connected to if the registry supports it, then
    /// `default`.
    #[must_use]
    pub fn select(
        &self,
        hint: Option<&str>,
        wallet_chain: Option<&ChainId>,
        default: &ChainId,
    ) -> ChainId {
        if let Some(chain) = hint.and_then(|h| self.resolve(h)) {
            return chain.chain_id.clone();
        }
        if let Some(chain_id) = wallet_chain.filter(|id| self.contains(id)) {
            return chain_id.clone();
        }
        default.clone()
    }
}

impl FromIterator<ChainConfig> for ChainRegistry {
    /// Later duplicates of a chain id replace the earlier entry in place.
    fn from_iter<I: IntoIterator<Item = ChainConfig>>(iter: I) -> Self {
        let chains = iter
            .into_iter()
            .map(|chain| (chain.chain_id.clone(), chain))
            .collect();
        Self { chains }
    }
}

#[cfg(test)]
mod tests {
    use crate::chain::fixtures::chain;
    use super::*;

    fn registry() -> ChainRegistry {
        [chain("1", "eth"), chain("560000", "hetu"), chain("137", "matic")]
            .into_iter()
            .collect()
    }

    #[test]
    fn keeps_registry_order() {
        let ids: Vec<_> = registry().iter().map(|c| c.chain_id.to_string()).collect();
        assert_eq!(ids, ["1", "560000", "137"]);
    }

    #[test]
    fn resolves_short_names_and_known_ids() {
        let registry = registry();
        assert_eq!(registry.resolve("hetu").unwrap().chain_id, "560000");
        assert_eq!(registry.resolve("137").unwrap().short_name, "matic");
        assert!(registry.resolve("42161").is_none());
        assert!(registry.resolve("arb1").is_none());
    }

    #[test]
    fn select_prefers_hint_then_wallet_then_default() {
        let registry = registry();
        let default = ChainId::new("1");
        let wallet = ChainId::new("137");
        let unsupported = ChainId::new("42161");

        assert_eq!(registry.select(Some("hetu"), Some(&wallet), &default), "560000");
        assert_eq!(registry.select(Some("nope"), Some(&wallet), &default), "137");
        assert_eq!(registry.select(None, Some(&unsupported), &default), "1");
    }
}
