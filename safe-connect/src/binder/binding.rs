//! Binding requests and results.

use alloy_primitives::Address;
use serde::Serialize;

use crate::chain::ChainId;
use crate::deployments::{ContractAddressSet, VersionFamily};

/// What the caller already knows about the account's implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImplementationState {
    /// The implementation was validated as current and official.
    UpToDate,
    /// The implementation is official but outdated.
    Outdated,
    /// Nothing is known.
    #[default]
    Unknown,
}

/// Deployment a counterfactual account will be created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    /// Version to deploy.
    pub version: String,
    /// Family to deploy.
    pub family: VersionFamily,
    /// Explicit address set, e.g. for a replayed account; resolved from the
    /// deployment tables when absent.
    pub contracts: Option<ContractAddressSet>,
}

impl DeploymentTarget {
    /// Target resolved from the deployment tables.
    pub fn new(version: impl Into<String>, family: VersionFamily) -> Self {
        Self {
            version: version.into(),
            family,
            contracts: None,
        }
    }

    /// Uses `contracts` instead of the deployment tables.
    #[must_use]
    pub const fn with_contracts(mut self, contracts: ContractAddressSet) -> Self {
        self.contracts = Some(contracts);
        self
    }
}

/// Input of [`AccountBinder::bind`](super::AccountBinder::bind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// Chain the account lives on.
    pub chain_id: ChainId,
    /// Account address; `None` for an undeployed account.
    pub address: Option<Address>,
    /// Version reported for the account.
    pub version: Option<String>,
    /// Implementation (singleton) address, when already known.
    pub implementation: Option<Address>,
    /// Validation state of the implementation.
    pub implementation_state: ImplementationState,
    /// Family the caller expects.
    pub family: Option<VersionFamily>,
    /// Deployment of an undeployed account.
    pub target: Option<DeploymentTarget>,
    /// Return a degraded binding instead of failing on an unrecognized
    /// implementation.
    pub allow_unrecognized: bool,
}

impl BindRequest {
    /// Request for a deployed account.
    #[must_use]
    pub const fn deployed(chain_id: ChainId, address: Address) -> Self {
        Self {
            chain_id,
            address: Some(address),
            version: None,
            implementation: None,
            implementation_state: ImplementationState::Unknown,
            family: None,
            target: None,
            allow_unrecognized: false,
        }
    }

    /// Request for an account that will be deployed with `target`.
    #[must_use]
    pub const fn counterfactual(chain_id: ChainId, target: DeploymentTarget) -> Self {
        Self {
            chain_id,
            address: None,
            version: None,
            implementation: None,
            implementation_state: ImplementationState::Unknown,
            family: None,
            target: Some(target),
            allow_unrecognized: false,
        }
    }

    /// Sets the reported version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the implementation address.
    #[must_use]
    pub const fn with_implementation(mut self, implementation: Address) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// Sets the implementation validation state.
    #[must_use]
    pub const fn with_state(mut self, state: ImplementationState) -> Self {
        self.implementation_state = state;
        self
    }

    /// Sets the expected family.
    #[must_use]
    pub const fn with_family(mut self, family: VersionFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Opts into degraded bindings for unrecognized implementations.
    #[must_use]
    pub const fn allow_unrecognized(mut self) -> Self {
        self.allow_unrecognized = true;
        self
    }

    /// Whether the caller vouches for the implementation.
    pub(crate) const fn is_trusted(&self) -> bool {
        matches!(self.implementation_state, ImplementationState::UpToDate) && self.version.is_some()
    }
}

/// Where a binding's family and addresses came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// Declared deployment of an undeployed account.
    Counterfactual,
    /// Static table of a non-canonical chain.
    FallbackTable,
    /// Implementation matched a canonical singleton.
    CanonicalRegistry,
    /// Caller-declared family of a trusted implementation.
    Trusted,
    /// Bytecode matched a known upgradeable L2 singleton.
    CodeHash,
    /// Unrecognized implementation accepted in degraded mode.
    Unrecognized,
}

/// Resolved contract family and addresses for one account.
///
/// Superseded, never mutated, when the chain or account changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBinding {
    /// Chain of the account.
    pub chain_id: ChainId,
    /// Account address; `None` when counterfactual.
    pub address: Option<Address>,
    /// Contract interface family to encode transactions for.
    pub version_family: VersionFamily,
    /// Singleton and helper addresses.
    pub contract_addresses: ContractAddressSet,
    /// Whether the account is not deployed yet.
    pub is_counterfactual: bool,
    /// Resolved version, unknown in degraded mode.
    pub version: Option<String>,
    /// Whether the implementation could not be recognized.
    pub degraded: bool,
    /// Resolution step that produced the binding.
    pub source: BindingSource,
}
