//! Price feed state

use allocator_common::{Address, AllocatorError, FixedPoint, TokenId};

/// Price feed for one token
///
/// Stores the current price of one whole token in value units (1e18 scale)
/// and the token's decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFeed {
    /// Authority that can update prices
    pub authority: Address,

    /// Token this feed prices
    pub token: TokenId,

    /// Decimal places of the token's base unit
    pub decimals: u8,

    /// Current price (value units per whole token)
    pub price: FixedPoint,

    /// Last update timestamp (Unix timestamp)
    pub timestamp: i64,

    /// Price confidence interval (value units)
    pub confidence: FixedPoint,
}

impl PriceFeed {
    /// Maximum supported decimal places
    pub const MAX_DECIMALS: u8 = 30;

    /// Create a new price feed
    pub fn new(authority: Address, token: TokenId, decimals: u8, price: FixedPoint) -> Self {
        Self {
            authority,
            token,
            decimals,
            price,
            timestamp: 0,
            confidence: 0,
        }
    }

    /// Validate the feed configuration
    pub fn validate(&self) -> bool {
        self.decimals <= Self::MAX_DECIMALS
    }

    /// Usable price: `None` when zero
    pub fn usable_price(&self) -> Option<FixedPoint> {
        if self.price == 0 {
            None
        } else {
            Some(self.price)
        }
    }

    /// Update the price (authority only)
    pub fn update_price(
        &mut self,
        caller: &Address,
        price: FixedPoint,
        timestamp: i64,
        confidence: FixedPoint,
    ) -> Result<(), AllocatorError> {
        if caller != &self.authority {
            return Err(AllocatorError::Unauthorized(*caller));
        }
        self.price = price;
        self.timestamp = timestamp;
        self.confidence = confidence;
        Ok(())
    }
}
