//! Chain registry loading, exactly-once wallet session bootstrap, and Safe
//! account binding.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`ChainRegistryLoader`] fetches the paginated chain list from the
//!    registry service and caches it process-wide. Concurrent loads share one
//!    fetch.
//! 2. [`WalletCoordinator`] waits for the registry and constructs a single
//!    [`WalletSession`] for the selected chain, however many callers ask for
//!    it at once.
//! 3. [`AccountBinder`] decides whether an account is driven through the
//!    Legacy or the L2 contract family and which singleton and helper
//!    addresses to use, from the deployment tables and the account's on-chain
//!    implementation.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use safe_connect::binder::BindRequest;
//! use safe_connect::registry::HttpRegistrySource;
//! use safe_connect::wallet::{CoordinatorSettings, RpcWalletConnector};
//! use safe_connect::{AccountBinder, ChainRegistryLoader, WalletCoordinator};
//!
//! # async fn demo() -> Result<(), safe_connect::Error> {
//! let source = HttpRegistrySource::new(&"https://safe-client.safe.global".parse().unwrap())?;
//! let coordinator = WalletCoordinator::new(
//!     ChainRegistryLoader::new(source),
//!     Arc::new(RpcWalletConnector::read_only()),
//!     CoordinatorSettings::default(),
//! );
//! let session = coordinator.connect().await?;
//! let request = BindRequest::deployed(
//!     session.chain_id().clone(),
//!     "0x1000000000000000000000000000000000000001".parse().unwrap(),
//! );
//! let binding = AccountBinder::default().bind(&session, &request).await?;
//! println!("{} {:?}", binding.version_family, binding.version);
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod chain;
pub mod config;
pub mod deployments;
pub mod error;
pub mod registry;
pub mod retry;
pub mod wallet;

pub use binder::{AccountBinder, AccountBinding, BindError};
pub use chain::{ChainConfig, ChainId, ChainRegistry};
pub use deployments::{ContractAddressSet, DeploymentRegistry, VersionFamily};
pub use error::Error;
pub use registry::{ChainRegistryLoader, RegistryError};
pub use wallet::{ConnectError, WalletCoordinator, WalletSession};
