//! Command implementations.

use std::path::Path;
use std::sync::Arc;

use dotenvy::dotenv;
use safe_connect::chain::ChainId;
use safe_connect::config::{Config, load_config_or_default};
use safe_connect::registry::{ChainRegistryLoader, HttpRegistrySource};
use safe_connect::wallet::{RpcWalletConnector, WalletCoordinator};
use safe_connect::Error;

use crate::signal::SigDown;
use crate::telemetry::{Telemetry, TelemetryGuard};

pub mod bind;
pub mod chains;
pub mod connect;
pub mod init;

/// Shared state of the network-facing commands.
pub struct Context {
    pub config: Config,
    pub registry: ChainRegistryLoader,
    pub sig_down: SigDown,
    _telemetry: TelemetryGuard,
}

impl Context {
    /// Loads `.env` and the configuration, installs logging, and prepares the
    /// registry loader.
    pub fn load(config_path: &Path) -> Result<Self, Error> {
        dotenv().ok();
        let config = load_config_or_default(config_path)?;
        let telemetry = Telemetry::new()
            .with_name(env!("CARGO_PKG_NAME"))
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_log_level(config.log_level.clone())
            .register();

        let source = HttpRegistrySource::new(&config.registry_url)?;
        let registry = ChainRegistryLoader::with_retry(source, config.retry_policy());
        Ok(Self {
            config,
            registry,
            sig_down: SigDown::try_new()?,
            _telemetry: telemetry,
        })
    }

    /// Resolves a chain given by short name or id; `None` selects the
    /// configured chain.
    pub async fn resolve_chain(&self, hint: Option<&str>) -> Result<ChainId, Error> {
        let Some(hint) = hint else {
            return Ok(self.config.chain.clone());
        };
        let registry = self.registry.ready(self.config.registry_timeout()).await?;
        registry
            .resolve(hint)
            .map(|chain| chain.chain_id.clone())
            .ok_or_else(|| Error::usage(format!("chain '{hint}' is not in the registry")))
    }

    /// Coordinator bound to `chain`, signing with the configured key if any.
    pub fn coordinator(&self, chain: ChainId) -> Result<WalletCoordinator, Error> {
        let connector = match self.config.signer.signer()? {
            Some(signer) => RpcWalletConnector::with_signer(signer),
            None => RpcWalletConnector::read_only(),
        };
        Ok(WalletCoordinator::new(
            self.registry.clone(),
            Arc::new(connector),
            self.config.coordinator_settings(Some(chain)),
        ))
    }
}
