//! Configuration loading and default template generation.
//!
//! ```toml
//! registry_url = "https://safe-client.safe.global"
//! chain = "1"
//! registry_timeout_secs = 5
//!
//! [signer]
//! private_key = "$SAFE_CONNECT_PRIVATE_KEY"
//!
//! [deployments.fallback."560000"]
//! singleton_address = "0x26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_signer_local::PrivateKeySigner;
use serde::Deserialize;
use url::Url;

use crate::chain::{ChainId, MAINNET};
use crate::deployments::DeploymentsConfig;
use crate::retry::RetryPolicy;
use crate::wallet::CoordinatorSettings;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "safe-connect.toml";

/// Default registry service.
pub const DEFAULT_REGISTRY_URL: &str = "https://safe-client.safe.global";

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        /// Configuration path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`Config`].
    #[error("failed to parse TOML config '{}': {source}", path.display())]
    Parse {
        /// Configuration path.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// A `$VAR` reference names an unset variable.
    #[error("env var '{var}' not found (referenced as '{reference}')")]
    MissingEnv {
        /// Variable name.
        var: String,
        /// Reference as written in the file.
        reference: String,
    },

    /// The signing key is malformed.
    #[error("invalid signer private key: {0}")]
    InvalidSigner(String),
}

/// Local signing key.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Hex private key or a `$VAR` / `${VAR}` reference to one.
    pub private_key: Option<String>,
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SignerConfig {
    /// Resolves and parses the configured key.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment reference is unset or the key does
    /// not parse.
    pub fn signer(&self) -> Result<Option<PrivateKeySigner>, ConfigError> {
        let Some(raw) = &self.private_key else {
            return Ok(None);
        };
        let key = resolve_env(raw)?;
        key.trim()
            .parse::<PrivateKeySigner>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidSigner(e.to_string()))
    }
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the chain registry service.
    pub registry_url: Url,
    /// Chain selected at startup.
    pub chain: ChainId,
    /// RPC URL replacing the registry endpoints.
    pub rpc_override: Option<Url>,
    /// Bound on waiting for the registry, in seconds.
    pub registry_timeout_secs: u64,
    /// Retries of a failed registry page.
    pub registry_retries: usize,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Local signing key.
    pub signer: SignerConfig,
    /// Deployment table extensions.
    pub deployments: DeploymentsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            chain: ChainId::new(MAINNET),
            rpc_override: None,
            registry_timeout_secs: 5,
            registry_retries: 2,
            log_level: "info".to_owned(),
            signer: SignerConfig::default(),
            deployments: DeploymentsConfig::default(),
        }
    }
}

fn default_registry_url() -> Url {
    Url::parse(DEFAULT_REGISTRY_URL).expect("default registry URL is valid")
}

impl Config {
    /// Registry wait bound.
    #[must_use]
    pub const fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    /// Retry policy for registry pages.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_retries(self.registry_retries)
    }

    /// Coordinator settings for the configured chain, optionally replaced by
    /// `chain`.
    #[must_use]
    pub fn coordinator_settings(&self, chain: Option<ChainId>) -> CoordinatorSettings {
        CoordinatorSettings {
            chain: chain.unwrap_or_else(|| self.chain.clone()),
            rpc_override: self.rpc_override.clone(),
            registry_timeout: self.registry_timeout(),
        }
    }
}

/// Reads and parses the configuration file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_config`], but a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read or parsed.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

/// Resolves an environment-variable reference (`$VAR` or `${VAR}`), returning
/// the literal string unchanged if it does not match either pattern.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnv`] if the referenced variable is unset.
pub fn resolve_env(value: &str) -> Result<String, ConfigError> {
    resolve_env_with(value, |name| std::env::var(name).ok())
}

fn resolve_env_with(
    value: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let var = value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .or_else(|| {
            value
                .strip_prefix('$')
                .filter(|name| !name.is_empty())
                .filter(|name| name.chars().all(|c| c.is_alphanumeric() || c == '_'))
        });
    match var {
        Some(var) => lookup(var).ok_or_else(|| ConfigError::MissingEnv {
            var: var.to_owned(),
            reference: value.to_owned(),
        }),
        None => Ok(value.to_owned()),
    }
}

/// Commented TOML template written by `safe-connect init`.
#[must_use]
pub fn generate_default_config() -> String {
    format!(
        r#"# safe-connect configuration

# Chain registry service; chains are read from {{registry_url}}/v1/chains.
registry_url = "{DEFAULT_REGISTRY_URL}"

# Chain selected at startup (decimal chain id).
chain = "1"

# Custom RPC endpoint replacing the registry one.
# rpc_override = "https://my-node.example"

# Seconds to wait for the chain registry before giving up.
registry_timeout_secs = 5

# Retries of a failed registry page (exponential backoff).
registry_retries = 2

# Log filter used when RUST_LOG is not set.
log_level = "info"

# ── Signer ──────────────────────────────────────────────────────────
# Values support environment variable references: "$VAR" or "${{VAR}}"

[signer]
# private_key = "$SAFE_CONNECT_PRIVATE_KEY"

# ── Deployments ─────────────────────────────────────────────────────
# Chains missing from the canonical deployment registry are bound
# through a static table (always as L2). Hetu mainnet (560000) and
# testnet (565000) are built in.

[deployments]
# non_canonical = ["12345"]

# [deployments.fallback."12345"]
# version = "1.4.1"
# singleton_address = "0x..."
# proxy_factory_address = "0x..."
# fallback_handler_address = "0x..."
# multi_send_address = "0x..."
# multi_send_call_only_address = "0x..."
# sign_message_lib_address = "0x..."
# create_call_address = "0x..."
# simulate_tx_accessor_address = "0x..."

# Upgradeable L2 singletons recognized by bytecode hash.
# [[deployments.l2_code_hashes]]
# code_hash = "0x..."
# version = "1.4.1"
"#
    )
}
