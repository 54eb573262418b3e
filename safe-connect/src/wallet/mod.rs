//! Wallet session bootstrap.
//!
//! [`WalletCoordinator`] waits for the chain registry, asks a
//! [`WalletConnector`] to build a provider for the selected chain, and
//! publishes the result as the single current [`WalletSession`].

mod connector;
mod coordinator;
mod error;
mod provider;
mod session;

pub use self::connector::{
    ConnectRequest, ConnectorError, RpcWalletConnector, WalletConnection, WalletConnector,
};
pub use self::coordinator::{
    BootstrapState, CoordinatorSettings, DEFAULT_REGISTRY_TIMEOUT, WalletCoordinator,
};
pub use self::error::ConnectError;
pub use self::provider::{ChainReader, RpcChainReader, RpcError};
pub use self::session::WalletSession;

#[cfg(test)]
pub(crate) use self::provider::fakes::FakeReader;
