//! Wallet-provider construction.

use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use url::Url;

use super::provider::{ChainReader, RpcChainReader, RpcError};
use crate::chain::{ChainConfig, ChainId, ChainRegistry};

/// Failure to construct a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    /// Neither an override nor a usable registry endpoint exists.
    #[error("no usable RPC endpoint for chain {0}")]
    NoRpcEndpoint(ChainId),

    /// The endpoint serves a different chain.
    #[error("RPC endpoint serves chain {actual}, expected {expected}")]
    WrongNetwork {
        /// Selected chain.
        expected: ChainId,
        /// Chain reported by the endpoint.
        actual: u64,
    },

    /// The endpoint could not be queried.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Everything the provider factory is given.
#[derive(Debug, Clone, Copy)]
pub struct ConnectRequest<'a> {
    /// Full chain list, as the provider may offer chain switching.
    pub chains: &'a ChainRegistry,
    /// Selected chain.
    pub chain: &'a ChainConfig,
    /// User-supplied RPC URL replacing the registry endpoint.
    pub rpc_override: Option<&'a Url>,
}

impl ConnectRequest<'_> {
    /// Endpoint to connect to: the override, else the chain's default RPC.
    #[must_use]
    pub fn rpc_url(&self) -> Option<&Url> {
        self.rpc_override.or_else(|| self.chain.default_rpc())
    }
}

/// A constructed provider, not yet published as a session.
#[derive(Clone)]
pub struct WalletConnection {
    /// Read access to the chain.
    pub reader: Arc<dyn ChainReader>,
    /// Connected account, if a signer is attached.
    pub address: Option<Address>,
    /// Signing provider for transaction submission, if available.
    pub provider: Option<DynProvider>,
}

impl std::fmt::Debug for WalletConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnection")
            .field("reader", &self.reader)
            .field("address", &self.address)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

impl WalletConnection {
    /// Read-only connection without an account.
    #[must_use]
    pub fn read_only(reader: Arc<dyn ChainReader>) -> Self {
        Self {
            reader,
            address: None,
            provider: None,
        }
    }
}

/// Builds wallet providers.
///
/// Construction may prompt the user and has no imposed timeout.
#[async_trait]
pub trait WalletConnector: Send + Sync + std::fmt::Debug {
    /// Constructs a provider for `request.chain`.
    async fn connect(&self, request: ConnectRequest<'_>) -> Result<WalletConnection, ConnectorError>;
}

/// Connector over HTTP JSON-RPC with an optional local signing key.
#[derive(Debug, Clone, Default)]
pub struct RpcWalletConnector {
    signer: Option<PrivateKeySigner>,
}

impl RpcWalletConnector {
    /// Connector producing read-only sessions.
    #[must_use]
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Connector signing with `signer`.
    #[must_use]
    pub const fn with_signer(signer: PrivateKeySigner) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    /// Address of the configured signer.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(PrivateKeySigner::address)
    }
}

#[async_trait]
impl WalletConnector for RpcWalletConnector {
    async fn connect(&self, request: ConnectRequest<'_>) -> Result<WalletConnection, ConnectorError> {
        let chain_id = &request.chain.chain_id;
        let url = request
            .rpc_url()
            .cloned()
            .ok_or_else(|| ConnectorError::NoRpcEndpoint(chain_id.clone()))?;
        tracing::debug!(%chain_id, %url, signer = self.signer.is_some(), "building wallet provider");

        let provider = match &self.signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };

        let reader = RpcChainReader::new(provider.clone());
        let actual = reader.chain_id().await?;
        if chain_id.as_u64() != Some(actual) {
            return Err(ConnectorError::WrongNetwork {
                expected: chain_id.clone(),
                actual,
            });
        }

        Ok(WalletConnection {
            reader: Arc::new(reader),
            address: self.address(),
            provider: Some(provider),
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use alloy_primitives::address;

    use super::*;
    use crate::wallet::provider::fakes::FakeReader;

    /// Account every fake connection reports.
    pub(crate) const ACCOUNT: Address = address!("00000000000000000000000000000000000000aa");

    /// Connector that counts constructions and can be made to fail.
    #[derive(Debug, Default)]
    pub(crate) struct FakeConnector {
        pub(crate) latency: Duration,
        pub(crate) failure: Mutex<Option<ConnectorError>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) last_url: Mutex<Option<Url>>,
    }

    impl FakeConnector {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn fail_with(&self, error: Option<ConnectorError>) {
            *self.failure.lock().unwrap() = error;
        }
    }

    #[async_trait]
    impl WalletConnector for FakeConnector {
        async fn connect(
            &self,
            request: ConnectRequest<'_>,
        ) -> Result<WalletConnection, ConnectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = request.rpc_url().cloned();
            tokio::time::sleep(self.latency).await;
            if let Some(err) = self.failure.lock().unwrap().clone() {
                return Err(err);
            }
            let chain_id = request.chain.chain_id.as_u64().unwrap();
            Ok(WalletConnection {
                reader: Arc::new(FakeReader::new(chain_id)),
                address: Some(ACCOUNT),
                provider: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::chain::fixtures::chain;

    #[test]
    fn override_wins_over_registry_endpoint() {
        let registry: ChainRegistry = [chain("1", "eth")].into_iter().collect();
        let config = registry.get(&ChainId::new("1")).unwrap();
        let custom = Url::parse("https://my-node.example/").unwrap();

        let request = ConnectRequest {
            chains: &registry,
            chain: config,
            rpc_override: None,
        };
        assert_eq!(request.rpc_url().map(Url::as_str), Some("https://rpc.eth.example/"));

        let request = ConnectRequest {
            rpc_override: Some(&custom),
            ..request
        };
        assert_eq!(request.rpc_url(), Some(&custom));
    }

    #[test]
    fn signer_address_is_exposed() {
        // Well-known development key.
        let signer: PrivateKeySigner =
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .parse()
                .unwrap();
        let connector = RpcWalletConnector::with_signer(signer);
        assert_eq!(
            connector.address(),
            Some(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))
        );
        assert_eq!(RpcWalletConnector::read_only().address(), None);
    }
}
