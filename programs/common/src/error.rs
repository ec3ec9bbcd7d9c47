//! Error taxonomy shared by both ledger tiers

use thiserror::Error;

use crate::types::Address;

/// Coarse classification of [`AllocatorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any mutation; the requested state would break an invariant
    Invariant,
    /// Caller must fix something externally (toggle, sync, smaller amount) and retry
    Precondition,
    /// Price data missing or unusable
    Valuation,
    /// Caller lacks the required role
    Authorization,
    /// Fixed-point overflow or division by zero
    Arithmetic,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocatorError {
    // Invariant violations
    #[error("deposit-eligible percentages must sum to exactly 100%")]
    InvalidAllocationTotal,
    #[error("duplicate allocation key {0}")]
    DuplicateKey(Address),
    #[error("combined fee rates exceed 100%")]
    FeeExceeds100Percent,
    #[error("allocation table holds at most {max} entries")]
    TooManyEntries { max: usize },
    #[error("percentage above 100%")]
    PercentageOutOfRange,
    #[error("post-operation invariant check failed: {0}")]
    InvariantViolation(&'static str),

    // Preconditions
    #[error("configuration is locked while deposits or withdrawals are open")]
    TransfersOpen,
    #[error("deposits are closed")]
    DepositClosed,
    #[error("withdrawals are closed")]
    WithdrawClosed,
    #[error("non-zero amount for deposit-closed token {0}")]
    DepositClosedToken(Address),
    #[error("amounts do not match the token allocation")]
    AllocationMismatch,
    #[error("amounts do not match the combined strategy allocation")]
    InvalidAllocation,
    #[error("pushed value does not match the strategy allocation")]
    InvalidStrategyAllocation,
    #[error("expected {expected} amounts, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("amount count does not match the utilized token set ({expected} != {actual})")]
    InvalidTokenSetLength { expected: usize, actual: usize },
    #[error("per-strategy amount lengths do not match")]
    InvalidLengths,
    #[error("portfolio token cache is stale; call sync first")]
    SyncRequired,
    #[error("insufficient shares")]
    InsufficientShares,
    #[error("insufficient balance of token {0}")]
    InsufficientTokenBalance(Address),
    #[error("token {0} is not available at portfolio level; pull it from strategies first")]
    TokenNotAvailable(Address),
    #[error("{0} is not a recognized strategy")]
    InvalidStrategyReference(Address),
    #[error("unknown strategy {0}")]
    UnknownStrategy(Address),
    #[error("unknown portfolio {0}")]
    UnknownPortfolio(Address),
    #[error("entity {0} already exists")]
    EntityExists(Address),
    #[error("amount must be non-zero")]
    ZeroAmount,
    #[error("invalid address encoding")]
    InvalidAddress,

    // Valuation
    #[error("no usable valuation for token {0}")]
    ValuationUnavailable(Address),
    #[error("deposit has zero total value")]
    ZeroValue,

    // Authorization
    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    // Arithmetic
    #[error("fixed-point overflow")]
    MathOverflow,
}

impl AllocatorError {
    pub fn kind(&self) -> ErrorKind {
        use AllocatorError::*;

        match self {
            InvalidAllocationTotal
            | DuplicateKey(_)
            | FeeExceeds100Percent
            | TooManyEntries { .. }
            | PercentageOutOfRange
            | InvariantViolation(_) => ErrorKind::Invariant,
            ValuationUnavailable(_) | ZeroValue => ErrorKind::Valuation,
            Unauthorized(_) => ErrorKind::Authorization,
            MathOverflow => ErrorKind::Arithmetic,
            _ => ErrorKind::Precondition,
        }
    }
}
