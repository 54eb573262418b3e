//! Account binding errors.

use alloy_primitives::{Address, B256};

use crate::chain::ChainId;
use crate::deployments::VersionFamily;
use crate::retry::Transient;
use crate::wallet::RpcError;

/// How a [`BindError`] should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Safe to retry with backoff.
    Transient,
    /// Fatal for this attempt; the request or environment must change.
    Configuration,
    /// Fatal; transaction construction must be blocked.
    Integrity,
}

/// Failure to bind an account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The session is bound to a different chain than requested.
    #[error("session is bound to chain {session}, binding requested for chain {requested}")]
    ChainMismatch {
        /// Chain of the session.
        session: ChainId,
        /// Chain of the request.
        requested: ChainId,
    },

    /// No bytecode at the account or its implementation.
    #[error("no contract code at {0}")]
    NoCodeAtAddress(Address),

    /// The implementation is neither a canonical singleton nor a recognized
    /// upgradeable L2 singleton.
    #[error("unrecognized master copy {implementation} (code hash {code_hash})")]
    UnrecognizedMasterCopy {
        /// Implementation address.
        implementation: Address,
        /// `keccak256` of its bytecode.
        code_hash: B256,
    },

    /// The chain has no fallback deployment.
    #[error("chain {0} has no known deployment")]
    UnsupportedChain(ChainId),

    /// The canonical registry has no address set for the resolved release.
    #[error("no {family} deployment of version {version} on chain {chain_id}")]
    RegistryLookupFailed {
        /// Chain looked up.
        chain_id: ChainId,
        /// Version looked up.
        version: String,
        /// Family looked up.
        family: VersionFamily,
    },

    /// A counterfactual binding was requested without a target deployment.
    #[error("counterfactual account requires a target deployment")]
    MissingDeploymentTarget,

    /// A chain read failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl BindError {
    /// Handling class of the error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::RegistryLookupFailed { .. } | Self::Rpc(_) => ErrorClass::Transient,
            Self::ChainMismatch { .. } | Self::UnsupportedChain(_) | Self::MissingDeploymentTarget => {
                ErrorClass::Configuration
            }
            Self::NoCodeAtAddress(_) | Self::UnrecognizedMasterCopy { .. } => ErrorClass::Integrity,
        }
    }
}

impl Transient for BindError {
    fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}
