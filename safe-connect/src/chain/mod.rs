//! Chain identifiers, configuration and the insertion-ordered chain registry.
//!
//! - [`id`] — [`ChainId`] newtype.
//! - [`config`] — [`ChainConfig`] and the registry service wire format.
//! - [`registry`] — [`ChainRegistry`] lookups and chain selection.
//! - [`prefixed`] — `shortName:0x…` address parsing.

mod config;
mod id;
mod prefixed;
mod registry;

pub use self::config::*;
pub use self::id::*;
pub use self::prefixed::*;
pub use self::registry::*;

#[cfg(test)]
pub(crate) use self::config::fixtures;
