//! Chain registry loading.
//!
//! - [`source`] — [`RegistrySource`] trait and the HTTP implementation.
//! - [`loader`] — [`ChainRegistryLoader`], the shared cache and in-flight load.

mod error;
mod loader;
mod source;

pub use self::error::*;
pub use self::loader::*;
pub use self::source::*;

#[cfg(test)]
pub(crate) use self::loader::fakes;
