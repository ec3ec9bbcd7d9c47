//! Valuation capability: token amounts to the common value unit

use std::fmt;

use crate::error::AllocatorError;
use crate::math::{checked_add, mul_div};
use crate::types::{Amount, FixedPoint, TokenId};

pub trait ValuationAdapter: fmt::Debug + Send + Sync {
    /// Price of one whole token, in value units
    ///
    /// Fails with `ValuationUnavailable` when no feed is registered or the
    /// feed reports zero.
    fn value(&self, token: &TokenId) -> Result<FixedPoint, AllocatorError>;

    /// Decimal places of the token's base unit
    fn decimals(&self, token: &TokenId) -> Result<u8, AllocatorError>;

    /// Value of `amount` base units: floor(amount * price / 10^decimals)
    fn value_of(&self, token: &TokenId, amount: Amount) -> Result<FixedPoint, AllocatorError> {
        let price = self.value(token)?;
        let unit = ledger_model::math::pow10(self.decimals(token)?)
            .ok_or(AllocatorError::MathOverflow)?;
        mul_div(amount, price, unit)
    }

    /// Sum of `value_of` over parallel token and amount slices
    fn total_value(&self, tokens: &[TokenId], amounts: &[Amount]) -> Result<FixedPoint, AllocatorError> {
        tokens
            .iter()
            .zip(amounts)
            .try_fold(0u128, |acc, (token, amount)| checked_add(acc, self.value_of(token, *amount)?))
    }
}
