//! Chain configuration types and the gateway wire format they are decoded from.

use std::collections::BTreeSet;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use super::ChainId;

/// How an RPC endpoint expects to be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcAuthentication {
    /// The URL is usable as-is.
    #[default]
    NoAuthentication,
    /// An API key must be appended to the URL path.
    ApiKeyPath,
    /// Any value this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// Single RPC endpoint published for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoint {
    /// Authentication scheme of the endpoint.
    #[serde(default)]
    pub authentication: RpcAuthentication,
    /// Endpoint URL.
    #[serde(rename = "value")]
    pub url: Url,
}

/// Native currency of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    /// Currency name (e.g. `"Ether"`).
    pub name: String,
    /// Ticker symbol (e.g. `"ETH"`).
    pub symbol: String,
    /// Number of decimals.
    pub decimals: u8,
    /// Optional logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

/// Block explorer URL templates; `{{address}}` / `{{txHash}}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTemplate {
    /// Address page template.
    #[serde(default)]
    pub address: String,
    /// Transaction page template.
    #[serde(default)]
    pub tx_hash: String,
}

/// Configuration of one supported chain.
///
/// Values are immutable snapshots: a registry refetch replaces the whole
/// [`ChainRegistry`](super::ChainRegistry) rather than editing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Unique key of the chain in the registry.
    pub chain_id: ChainId,
    /// EIP-3770 short name (e.g. `"eth"`).
    pub short_name: String,
    /// Human readable name.
    pub display_name: String,
    /// RPC endpoints in preference order.
    pub rpc_endpoints: Vec<RpcEndpoint>,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Enabled feature flags.
    pub feature_flags: BTreeSet<String>,
    /// Explorer URL templates.
    pub explorer: ExplorerTemplate,
    /// Whether the chain is flagged as L2 by the registry.
    pub l2: bool,
    /// Whether the chain is a testnet.
    pub is_testnet: bool,
}

impl ChainConfig {
    /// Whether the registry enabled `feature` for this chain.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.feature_flags.contains(feature)
    }

    /// First endpoint usable without an API key.
    #[must_use]
    pub fn default_rpc(&self) -> Option<&Url> {
        self.rpc_endpoints
            .iter()
            .find(|ep| ep.authentication == RpcAuthentication::NoAuthentication)
            .map(|ep| &ep.url)
    }

    /// Explorer page for `address`, if the chain publishes a template.
    #[must_use]
    pub fn explorer_address_link(&self, address: Address) -> Option<String> {
        if self.explorer.address.is_empty() {
            return None;
        }
        Some(
            self.explorer
                .address
                .replace("{{address}}", &address.to_checksum(None)),
        )
    }
}

/// Chain entry as returned by the registry service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayChain {
    /// Decimal chain id.
    pub chain_id: ChainId,
    /// Human readable name.
    pub chain_name: String,
    /// EIP-3770 short name.
    pub short_name: String,
    /// Primary RPC endpoint.
    pub rpc_uri: RpcEndpoint,
    /// Public fallback endpoint.
    #[serde(default)]
    pub public_rpc_uri: Option<RpcEndpoint>,
    /// Endpoint used by embedded apps.
    #[serde(default)]
    pub safe_apps_rpc_uri: Option<RpcEndpoint>,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Enabled feature flags.
    #[serde(default)]
    pub features: Vec<String>,
    /// Explorer URL templates.
    #[serde(default)]
    pub block_explorer_uri_template: ExplorerTemplate,
    /// L2 flag.
    #[serde(default)]
    pub l2: bool,
    /// Testnet flag.
    #[serde(default)]
    pub is_testnet: bool,
}

impl From<GatewayChain> for ChainConfig {
    fn from(chain: GatewayChain) -> Self {
        let mut rpc_endpoints = vec![chain.rpc_uri];
        for ep in [chain.public_rpc_uri, chain.safe_apps_rpc_uri]
            .into_iter()
            .flatten()
        {
            if !rpc_endpoints.contains(&ep) {
                rpc_endpoints.push(ep);
            }
        }
        Self {
            chain_id: chain.chain_id,
            short_name: chain.short_name,
            display_name: chain.chain_name,
            rpc_endpoints,
            native_currency: chain.native_currency,
            feature_flags: chain.features.into_iter().collect(),
            explorer: chain.block_explorer_uri_template,
            l2: chain.l2,
            is_testnet: chain.is_testnet,
        }
    }
}

/// One page of the paginated `/v1/chains` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainPage {
    /// Total number of chains across all pages.
    #[serde(default)]
    pub count: Option<usize>,
    /// URL of the next page, absent on the last page.
    #[serde(default)]
    pub next: Option<Url>,
    /// Chains on this page in registry order.
    pub results: Vec<GatewayChain>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Registry JSON for a chain with the given id and short name.
    pub(crate) fn gateway_json(chain_id: &str, short_name: &str) -> serde_json::Value {
        serde_json::json!({
            "chainId": chain_id,
            "chainName": format!("Chain {chain_id}"),
            "shortName": short_name,
            "rpcUri": { "authentication": "NO_AUTHENTICATION", "value": format!("https://rpc.{short_name}.example") },
            "publicRpcUri": { "authentication": "NO_AUTHENTICATION", "value": format!("https://public.{short_name}.example") },
            "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18, "logoUri": null },
            "features": ["SAFE_APPS", "EIP1559"],
            "blockExplorerUriTemplate": {
                "address": format!("https://scan.{short_name}.example/address/{{{{address}}}}"),
                "txHash": format!("https://scan.{short_name}.example/tx/{{{{txHash}}}}"),
                "api": ""
            },
            "l2": chain_id != "1",
            "isTestnet": false,
            "theme": { "textColor": "#fff" }
        })
    }

    pub(crate) fn chain(chain_id: &str, short_name: &str) -> ChainConfig {
        let gateway: GatewayChain =
            serde_json::from_value(gateway_json(chain_id, short_name)).unwrap();
        gateway.into()
    }
}
