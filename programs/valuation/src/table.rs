//! Price table: the in-memory `ValuationAdapter`

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use allocator_common::{Address, AllocatorError, FixedPoint, TokenId, ValuationAdapter};

use crate::state::PriceFeed;

/// Token -> feed map
///
/// Prices are updated through `&self` so a table shared behind an `Arc`
/// by several ledgers stays current for all of them.
#[derive(Debug, Default)]
pub struct PriceTable {
    feeds: RwLock<BTreeMap<TokenId, PriceFeed>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<TokenId, PriceFeed>> {
        self.feeds.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<TokenId, PriceFeed>> {
        self.feeds.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register or replace a feed
    pub fn register(&self, feed: PriceFeed) -> Result<(), AllocatorError> {
        if !feed.validate() {
            return Err(AllocatorError::ValuationUnavailable(feed.token));
        }
        log::info!("PriceTable: registered feed for {} ({} decimals)", feed.token, feed.decimals);
        self.write().insert(feed.token, feed);
        Ok(())
    }

    /// Register a feed with the default authority
    pub fn set_price(&self, token: TokenId, decimals: u8, price: FixedPoint) -> Result<(), AllocatorError> {
        self.register(PriceFeed::new(Address::default(), token, decimals, price))
    }

    /// Update an existing feed (feed authority only)
    pub fn update_price(
        &self,
        caller: &Address,
        token: &TokenId,
        price: FixedPoint,
        timestamp: i64,
    ) -> Result<(), AllocatorError> {
        let mut feeds = self.write();
        let feed = feeds
            .get_mut(token)
            .ok_or(AllocatorError::ValuationUnavailable(*token))?;
        feed.update_price(caller, price, timestamp, 0)
    }

    pub fn remove(&self, token: &TokenId) -> Option<PriceFeed> {
        self.write().remove(token)
    }

    pub fn feed(&self, token: &TokenId) -> Option<PriceFeed> {
        self.read().get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl ValuationAdapter for PriceTable {
    fn value(&self, token: &TokenId) -> Result<FixedPoint, AllocatorError> {
        self.read()
            .get(token)
            .and_then(PriceFeed::usable_price)
            .ok_or(AllocatorError::ValuationUnavailable(*token))
    }

    fn decimals(&self, token: &TokenId) -> Result<u8, AllocatorError> {
        self.read()
            .get(token)
            .map(|feed| feed.decimals)
            .ok_or(AllocatorError::ValuationUnavailable(*token))
    }
}
