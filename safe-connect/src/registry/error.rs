//! Chain registry errors.

use std::time::Duration;

use url::Url;

use crate::retry::Transient;

/// Failure to produce a complete [`ChainRegistry`](crate::chain::ChainRegistry).
///
/// Cloneable so a single in-flight load can hand the same outcome to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry service could not be reached.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The registry answered with a non-success status.
    #[error("registry returned HTTP {status} for {url}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Requested page URL.
        url: Url,
    },

    /// A page could not be decoded.
    #[error("malformed registry page: {0}")]
    Decode(String),

    /// The caller stopped waiting for the load to complete.
    #[error("timed out after {0:?} waiting for the chain registry")]
    Timeout(Duration),
}

impl Transient for RegistryError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

impl RegistryError {
    pub(crate) fn unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Unavailable(format!("{context}: {err}"))
    }
}
