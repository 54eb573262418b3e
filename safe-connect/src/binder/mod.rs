//! Account binding: decides which contract family and address set an account
//! is driven through.
//!
//! Resolution order, first match wins:
//!
//! 1. Undeployed account: the declared target deployment, no chain calls.
//! 2. Non-canonical chain: the static fallback table, always L2, no chain
//!    calls.
//! 3. Implementation is a canonical singleton: its release and family.
//! 4. Caller vouches for the implementation: the declared family.
//! 5. Implementation bytecode hash is a known upgradeable L2 singleton.
//!
//! Anything else is [`BindError::UnrecognizedMasterCopy`] unless the caller
//! opted into degraded bindings. Pre-1.3.0 releases always bind Legacy.

mod binding;
mod error;

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256, keccak256};
use tracing::{debug, info, warn};

pub use self::binding::{
    AccountBinding, BindRequest, BindingSource, DeploymentTarget, ImplementationState,
};
pub use self::error::{BindError, ErrorClass};
use crate::chain::ChainId;
use crate::deployments::{
    ContractAddressSet, DeploymentRegistry, VersionFamily, is_legacy_version,
};
use crate::wallet::{ChainReader, WalletSession};

/// Storage slot where a proxy keeps its singleton address.
pub const SINGLETON_SLOT: U256 = U256::ZERO;

/// Resolves [`AccountBinding`]s against a [`DeploymentRegistry`].
#[derive(Debug, Clone, Default)]
pub struct AccountBinder {
    deployments: Arc<DeploymentRegistry>,
}

impl AccountBinder {
    /// Creates a binder over `deployments`.
    #[must_use]
    pub const fn new(deployments: Arc<DeploymentRegistry>) -> Self {
        Self { deployments }
    }

    /// Deployment tables in use.
    #[must_use]
    pub fn deployments(&self) -> &DeploymentRegistry {
        &self.deployments
    }

    /// Binds the account described by `request` using `session` for chain
    /// reads.
    ///
    /// Performs at most two read-only calls: the implementation slot when no
    /// implementation is supplied, and the implementation bytecode when no
    /// table resolves it.
    ///
    /// # Errors
    ///
    /// See [`BindError`].
    pub async fn bind(
        &self,
        session: &WalletSession,
        request: &BindRequest,
    ) -> Result<AccountBinding, BindError> {
        if session.chain_id() != &request.chain_id {
            return Err(BindError::ChainMismatch {
                session: session.chain_id().clone(),
                requested: request.chain_id.clone(),
            });
        }
        self.bind_with(session.reader(), request).await
    }

    /// Same as [`bind`](Self::bind) with an explicit reader assumed to be on
    /// `request.chain_id`.
    ///
    /// # Errors
    ///
    /// See [`BindError`].
    pub async fn bind_with(
        &self,
        reader: &dyn ChainReader,
        request: &BindRequest,
    ) -> Result<AccountBinding, BindError> {
        let chain_id = &request.chain_id;
        let binding = match request.address {
            None => self.bind_counterfactual(request)?,
            Some(address) if self.deployments.is_non_canonical(chain_id) => {
                self.bind_fallback(request, address)?
            }
            Some(address) => self.bind_deployed(reader, request, address).await?,
        };
        info!(
            %chain_id,
            address = ?binding.address,
            family = %binding.version_family,
            version = ?binding.version,
            source = ?binding.source,
            degraded = binding.degraded,
            "account bound"
        );
        Ok(binding)
    }

    fn bind_counterfactual(&self, request: &BindRequest) -> Result<AccountBinding, BindError> {
        let target = request
            .target
            .as_ref()
            .ok_or(BindError::MissingDeploymentTarget)?;
        let family = legacy_override(&target.version, target.family);
        let contracts = match target.contracts {
            Some(contracts) => contracts,
            None if self.deployments.is_non_canonical(&request.chain_id) => {
                self.deployments
                    .fallback(&request.chain_id)
                    .ok_or_else(|| BindError::UnsupportedChain(request.chain_id.clone()))?
                    .contracts
            }
            None => self.lookup(&request.chain_id, &target.version, family)?,
        };
        debug!(chain_id = %request.chain_id, %family, "binding counterfactual account");
        Ok(AccountBinding {
            chain_id: request.chain_id.clone(),
            address: None,
            version_family: family,
            contract_addresses: contracts,
            is_counterfactual: true,
            version: Some(target.version.clone()),
            degraded: false,
            source: BindingSource::Counterfactual,
        })
    }

    fn bind_fallback(
        &self,
        request: &BindRequest,
        address: Address,
    ) -> Result<AccountBinding, BindError> {
        let deployment = self
            .deployments
            .fallback(&request.chain_id)
            .ok_or_else(|| BindError::UnsupportedChain(request.chain_id.clone()))?;
        Ok(AccountBinding {
            chain_id: request.chain_id.clone(),
            address: Some(address),
            version_family: VersionFamily::LayeredL2,
            contract_addresses: deployment.contracts,
            is_counterfactual: false,
            version: Some(
                request
                    .version
                    .clone()
                    .unwrap_or_else(|| deployment.version.clone()),
            ),
            degraded: false,
            source: BindingSource::FallbackTable,
        })
    }

    async fn bind_deployed(
        &self,
        reader: &dyn ChainReader,
        request: &BindRequest,
        address: Address,
    ) -> Result<AccountBinding, BindError> {
        let chain_id = &request.chain_id;
        let implementation = match request.implementation {
            Some(implementation) => implementation,
            None => read_implementation(reader, address).await?,
        };

        if let Some(found) =
            self.deployments
                .find_singleton(chain_id, implementation, request.version.as_deref())
        {
            return Ok(Self::deployed(
                request,
                address,
                found.version.to_owned(),
                found.family,
                found.contracts,
                BindingSource::CanonicalRegistry,
            ));
        }

        // Trust only skips bytecode inspection; a canonical match above wins.
        if request.is_trusted()
            && let Some(version) = &request.version
        {
            let declared = request
                .family
                .unwrap_or_else(|| VersionFamily::default_for(chain_id));
            let family = legacy_override(version, declared);
            let contracts = self.lookup(chain_id, version, family)?;
            debug!(%chain_id, %address, %implementation, %family, "trusting declared implementation");
            return Ok(Self::deployed(
                request,
                address,
                version.clone(),
                family,
                contracts,
                BindingSource::Trusted,
            ));
        }

        let code = reader.code_at(implementation).await?;
        if code.is_empty() {
            return Err(BindError::NoCodeAtAddress(implementation));
        }
        let code_hash = keccak256(&code);

        if let Some(version) = self.deployments.l2_version_by_code_hash(&code_hash) {
            let family = legacy_override(version, VersionFamily::LayeredL2);
            debug!(%chain_id, %implementation, %code_hash, version, "upgradeable L2 singleton");
            return Ok(Self::deployed(
                request,
                address,
                version.to_owned(),
                family,
                ContractAddressSet::singleton_only(implementation),
                BindingSource::CodeHash,
            ));
        }

        if !request.allow_unrecognized {
            return Err(BindError::UnrecognizedMasterCopy {
                implementation,
                code_hash,
            });
        }
        warn!(
            %chain_id,
            %implementation,
            %code_hash,
            "binding unrecognized master copy in degraded mode"
        );
        let family = request
            .family
            .unwrap_or_else(|| VersionFamily::default_for(chain_id));
        Ok(AccountBinding {
            chain_id: chain_id.clone(),
            address: Some(address),
            version_family: family,
            contract_addresses: ContractAddressSet::singleton_only(implementation),
            is_counterfactual: false,
            version: None,
            degraded: true,
            source: BindingSource::Unrecognized,
        })
    }

    fn deployed(
        request: &BindRequest,
        address: Address,
        version: String,
        family: VersionFamily,
        contracts: ContractAddressSet,
        source: BindingSource,
    ) -> AccountBinding {
        let family = legacy_override(&version, family);
        AccountBinding {
            chain_id: request.chain_id.clone(),
            address: Some(address),
            version_family: family,
            contract_addresses: contracts,
            is_counterfactual: false,
            version: Some(version),
            degraded: false,
            source,
        }
    }

    fn lookup(
        &self,
        chain_id: &ChainId,
        version: &str,
        family: VersionFamily,
    ) -> Result<ContractAddressSet, BindError> {
        self.deployments
            .lookup(chain_id, version, family)
            .ok_or_else(|| BindError::RegistryLookupFailed {
                chain_id: chain_id.clone(),
                version: version.to_owned(),
                family,
            })
    }
}

/// Pre-1.3.0 releases have no layered singleton.
fn legacy_override(version: &str, family: VersionFamily) -> VersionFamily {
    if is_legacy_version(version) {
        VersionFamily::Legacy
    } else {
        family
    }
}

/// Reads the singleton address from the proxy's first storage slot.
async fn read_implementation(
    reader: &dyn ChainReader,
    proxy: Address,
) -> Result<Address, BindError> {
    let word = reader.storage_at(proxy, SINGLETON_SLOT).await?;
    let implementation = Address::from_word(B256::from(word.to_be_bytes::<32>()));
    if implementation.is_zero() {
        return Err(BindError::NoCodeAtAddress(proxy));
    }
    Ok(implementation)
}
