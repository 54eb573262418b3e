//! Read access to the chain a session is bound to.

use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, Provider};
use async_trait::async_trait;

use crate::retry::Transient;

/// A failed chain read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rpc error: {0}")]
pub struct RpcError(pub String);

impl RpcError {
    pub(crate) fn from_display(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }
}

impl Transient for RpcError {
    fn is_transient(&self) -> bool {
        true
    }
}

/// The read-only chain calls the account binder and the connector need.
#[async_trait]
pub trait ChainReader: Send + Sync + std::fmt::Debug {
    /// Chain id reported by the endpoint.
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// Runtime bytecode at `address`; empty for accounts without code.
    async fn code_at(&self, address: Address) -> Result<Bytes, RpcError>;

    /// Storage word at `slot` of `address`.
    async fn storage_at(&self, address: Address, slot: U256) -> Result<U256, RpcError>;
}

/// [`ChainReader`] over an alloy provider.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider,
}

impl std::fmt::Debug for RpcChainReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainReader").finish_non_exhaustive()
    }
}

impl RpcChainReader {
    /// Wraps `provider`.
    #[must_use]
    pub const fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Underlying provider, for calls beyond [`ChainReader`].
    #[must_use]
    pub const fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(RpcError::from_display)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, RpcError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(RpcError::from_display)
    }

    async fn storage_at(&self, address: Address, slot: U256) -> Result<U256, RpcError> {
        self.provider
            .get_storage_at(address, slot)
            .await
            .map_err(RpcError::from_display)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// In-memory chain state that counts every read.
    #[derive(Debug, Default)]
    pub(crate) struct FakeReader {
        pub(crate) chain_id: u64,
        pub(crate) code: HashMap<Address, Bytes>,
        pub(crate) storage: HashMap<(Address, U256), U256>,
        pub(crate) fail: bool,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeReader {
        pub(crate) fn new(chain_id: u64) -> Self {
            Self {
                chain_id,
                ..Self::default()
            }
        }

        /// Deploys a proxy at `proxy` whose slot 0 points to `implementation`.
        pub(crate) fn with_proxy(mut self, proxy: Address, implementation: Address) -> Self {
            self.code.insert(proxy, Bytes::from_static(&[0x60, 0x80]));
            self.storage
                .insert((proxy, U256::ZERO), U256::from_be_slice(implementation.as_slice()));
            self
        }

        pub(crate) fn with_code(mut self, address: Address, code: Bytes) -> Self {
            self.code.insert(address, code);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self) -> Result<(), RpcError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RpcError("connection reset".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ChainReader for FakeReader {
        async fn chain_id(&self) -> Result<u64, RpcError> {
            self.record()?;
            Ok(self.chain_id)
        }

        async fn code_at(&self, address: Address) -> Result<Bytes, RpcError> {
            self.record()?;
            Ok(self.code.get(&address).cloned().unwrap_or_default())
        }

        async fn storage_at(&self, address: Address, slot: U256) -> Result<U256, RpcError> {
            self.record()?;
            Ok(self.storage.get(&(address, slot)).copied().unwrap_or_default())
        }
    }
}
