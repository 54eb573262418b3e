//! Wallet bootstrap errors.

use std::time::Duration;

use crate::chain::ChainId;
use crate::registry::RegistryError;
use crate::retry::Transient;

/// Failure to produce a [`WalletSession`](super::WalletSession).
///
/// Every caller waiting on the same initialization receives a clone of the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The chain registry did not become available in time.
    #[error("chain registry not available after {0:?}")]
    RegistryTimeout(Duration),

    /// The chain registry failed to load.
    #[error("chain registry unavailable: {0}")]
    RegistryUnavailable(RegistryError),

    /// The selected chain is not in the registry.
    #[error("chain {0} is not supported by the registry")]
    UnknownChain(ChainId),

    /// The wallet provider could not be constructed.
    #[error("wallet initialization failed: {0}")]
    InitializationFailed(String),
}

impl Transient for ConnectError {
    fn is_transient(&self) -> bool {
        match self {
            Self::RegistryTimeout(_) => true,
            Self::RegistryUnavailable(err) => err.is_transient(),
            Self::UnknownChain(_) | Self::InitializationFailed(_) => false,
        }
    }
}

impl From<RegistryError> for ConnectError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Timeout(waited) => Self::RegistryTimeout(waited),
            other => Self::RegistryUnavailable(other),
        }
    }
}
