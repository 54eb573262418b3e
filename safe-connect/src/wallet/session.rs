//! Published wallet sessions.

use std::sync::Arc;

use alloy_primitives::Address;
use alloy_provider::DynProvider;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::connector::WalletConnection;
use super::provider::ChainReader;
use crate::chain::{ChainConfig, ChainId};

/// A wallet connection bound to one chain.
///
/// Sessions are never mutated after publication. A chain switch or
/// disconnect publishes a replacement and invalidates this one; holders can
/// observe that through [`WalletSession::is_current`] or
/// [`WalletSession::invalidated`].
pub struct WalletSession {
    chain: ChainConfig,
    connection: WalletConnection,
    token: CancellationToken,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("chain_id", &self.chain.chain_id)
            .field("connection", &self.connection)
            .field("current", &self.is_current())
            .finish()
    }
}

impl WalletSession {
    /// Wraps a fully constructed connection.
    #[must_use]
    pub fn new(chain: ChainConfig, connection: WalletConnection) -> Self {
        Self {
            chain,
            connection,
            token: CancellationToken::new(),
        }
    }

    /// Chain the session is bound to.
    #[must_use]
    pub const fn chain_id(&self) -> &ChainId {
        &self.chain.chain_id
    }

    /// Configuration of the bound chain.
    #[must_use]
    pub const fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Connected account, if any.
    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        self.connection.address
    }

    /// Read access to the bound chain.
    #[must_use]
    pub fn reader(&self) -> &dyn ChainReader {
        self.connection.reader.as_ref()
    }

    /// Shared handle to the reader.
    #[must_use]
    pub fn reader_arc(&self) -> Arc<dyn ChainReader> {
        Arc::clone(&self.connection.reader)
    }

    /// Signing provider for transaction submission.
    #[must_use]
    pub const fn provider(&self) -> Option<&DynProvider> {
        self.connection.provider.as_ref()
    }

    /// Whether this is still the coordinator's current session.
    #[must_use]
    pub fn is_current(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Resolves once the session has been superseded or disconnected.
    pub fn invalidated(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub(crate) fn invalidate(&self) {
        self.token.cancel();
    }
}
