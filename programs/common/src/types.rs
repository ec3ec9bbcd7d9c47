//! Shared identifiers and fixed-point aliases

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AllocatorError;

/// Token amount in the token's own base units
pub type Amount = u128;

/// Fixed-point number scaled by [`ONE`](crate::ONE) (1e18)
pub type FixedPoint = u128;

/// 32-byte identifier for accounts, tokens, strategies and portfolios
///
/// Ordering is plain byte order; allocation tables use it as their
/// canonical sort order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

pub type TokenId = Address;
pub type StrategyId = Address;
pub type PortfolioId = Address;

impl Address {
    pub const LEN: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        write!(f, "Address({})", &hex::encode(self.0)[..8])
    }
}

impl FromStr for Address {
    type Err = AllocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| AllocatorError::InvalidAddress)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| AllocatorError::InvalidAddress)?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AllocatorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}
