//! EIP-3770 chain-prefixed addresses (`shortName:0x…`).

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;

/// Error returned when a prefixed address cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{input}': {reason}")]
pub struct PrefixedAddressError {
    input: String,
    reason: String,
}

/// Address optionally qualified with a chain short name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixedAddress<'a> {
    /// Short-name prefix, if one was given.
    pub prefix: Option<&'a str>,
    /// The account address.
    pub address: Address,
}

impl<'a> PrefixedAddress<'a> {
    /// Splits `input` into prefix and address. A bare address has no prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is empty or the address part is not a
    /// valid hex address.
    pub fn parse(input: &'a str) -> Result<Self, PrefixedAddressError> {
        let (prefix, raw) = match input.split_once(':') {
            Some((prefix, raw)) => (Some(prefix), raw),
            None => (None, input),
        };
        if prefix.is_some_and(str::is_empty) {
            return Err(PrefixedAddressError {
                input: input.to_owned(),
                reason: "empty chain prefix".to_owned(),
            });
        }
        let address = Address::from_str(raw).map_err(|e| PrefixedAddressError {
            input: input.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { prefix, address })
    }
}

impl fmt::Display for PrefixedAddress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.address.to_checksum(None)),
            None => write!(f, "{}", self.address.to_checksum(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn parses_prefixed_and_bare() {
        let parsed = PrefixedAddress::parse("hetu:0x26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582").unwrap();
        assert_eq!(parsed.prefix, Some("hetu"));
        assert_eq!(
            parsed.address,
            address!("26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582")
        );

        let bare = PrefixedAddress::parse("0x26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582").unwrap();
        assert_eq!(bare.prefix, None);
        assert_eq!(bare.to_string(), "0x26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(PrefixedAddress::parse(":0x26B06FBdBDc84Ae740b4Ed3c9A2588Bd63Da3582").is_err());
        assert!(PrefixedAddress::parse("eth:0x1234").is_err());
    }
}
