//! Unified error type for the `safe-connect` binary.

use thiserror::Error;

use crate::binder::BindError;
use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::wallet::ConnectError;

/// Top-level error aggregating every stage of the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed, or a key is invalid.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Chain registry could not be loaded.
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// Wallet session could not be established.
    #[error("connect: {0}")]
    Connect(#[from] ConnectError),

    /// Account could not be bound.
    #[error("bind: {0}")]
    Bind(#[from] BindError),

    /// Invalid command-line input.
    #[error("usage: {0}")]
    Usage(String),

    /// Filesystem or signal registration failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The operation was interrupted by a shutdown signal.
    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// Creates a [`Error::Usage`] error from a message.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
