//! Safe contract deployments: the canonical registry, the fallback table for
//! chains missing from it, and recognized upgradeable L2 singletons.

mod addresses;
mod canonical;
mod family;
mod registry;

pub use self::addresses::ContractAddressSet;
pub use self::canonical::{CANONICAL, Deployment, FALLBACK_VERSION};
pub use self::family::{ParseFamilyError, VersionFamily, is_legacy_version};
pub use self::registry::{
    CodeHashEntry, DeploymentRegistry, DeploymentsConfig, FallbackDeployment, SingletonMatch,
};
