//! Helper-contract address sets.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Addresses of the singleton and helper contracts an account is driven
/// through.
///
/// Helpers are optional: legacy releases did not ship all of them, and a set
/// derived from an upgraded implementation only pins the singleton, leaving
/// helper resolution to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractAddressSet {
    /// Singleton (master copy) the proxy delegates to.
    pub singleton_address: Address,
    /// Proxy factory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_factory_address: Option<Address>,
    /// Default fallback handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_handler_address: Option<Address>,
    /// `MultiSend` library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_send_address: Option<Address>,
    /// `MultiSendCallOnly` library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_send_call_only_address: Option<Address>,
    /// `SignMessageLib` library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_message_lib_address: Option<Address>,
    /// `CreateCall` library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_call_address: Option<Address>,
    /// `SimulateTxAccessor` contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulate_tx_accessor_address: Option<Address>,
}

impl ContractAddressSet {
    /// Set pinning only the singleton.
    #[must_use]
    pub const fn singleton_only(singleton: Address) -> Self {
        Self {
            singleton_address: singleton,
            proxy_factory_address: None,
            fallback_handler_address: None,
            multi_send_address: None,
            multi_send_call_only_address: None,
            sign_message_lib_address: None,
            create_call_address: None,
            simulate_tx_accessor_address: None,
        }
    }

    /// Whether every helper address is present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.proxy_factory_address.is_some()
            && self.fallback_handler_address.is_some()
            && self.multi_send_address.is_some()
            && self.multi_send_call_only_address.is_some()
            && self.sign_message_lib_address.is_some()
            && self.create_call_address.is_some()
            && self.simulate_tx_accessor_address.is_some()
    }
}
