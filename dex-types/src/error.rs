//! The consensus-visible error surface. Every rejection a validating node can reach
//! for this transaction family is a `DexTxError` variant with a stable numeric code;
//! the code is part of the wire-visible `REJECT_INVALID` sub-reason (spec.md §6) and
//! must never be renumbered once shipped.
//!
//! Non-consensus plumbing errors (a backing store returning an I/O failure, for
//! example) are not represented here — those are propagated as `anyhow::Error` by
//! the `dex-core` context traits and must never be mistaken for a validation
//! rejection.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DexTxError {
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid fee: {0}")]
    InvalidFee(String),

    #[error("invalid order option: {0}")]
    InvalidOrderOpt(String),

    #[error("dex operator not found: {0}")]
    OperatorNotFound(String),

    #[error("dex operator disabled: {0}")]
    OperatorDisabled(String),

    #[error("operator authorization failed: {0}")]
    OperatorAuthFailed(String),

    #[error("payer authorization failed: {0}")]
    PayerAuthFailed(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("order side mismatch: {0}")]
    OrderSideMismatch(String),

    #[error("order pair mismatch: {0}")]
    OrderPairMismatch(String),

    #[error("order dex mismatch: {0}")]
    OrderDexMismatch(String),

    #[error("deal price out of bound: {0}")]
    DealPriceOutOfBound(String),

    #[error("deal amount inconsistent: {0}")]
    DealAmountInconsistent(String),

    #[error("deal residual exceeded: {0}")]
    DealResidualExceeded(String),
}

impl DexTxError {
    /// Stable numeric code carried on the `REJECT_INVALID` sub-reason. Never reorder
    /// or reuse a code across releases.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidSymbol(_) => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::InvalidPrice(_) => 1003,
            Self::InvalidFee(_) => 1004,
            Self::InvalidOrderOpt(_) => 1005,
            Self::OperatorNotFound(_) => 1006,
            Self::OperatorDisabled(_) => 1007,
            Self::OperatorAuthFailed(_) => 1008,
            Self::PayerAuthFailed(_) => 1009,
            Self::InsufficientBalance(_) => 1010,
            Self::OrderNotFound(_) => 1011,
            Self::OrderSideMismatch(_) => 1012,
            Self::OrderPairMismatch(_) => 1013,
            Self::OrderDexMismatch(_) => 1014,
            Self::DealPriceOutOfBound(_) => 1015,
            Self::DealAmountInconsistent(_) => 1016,
            Self::DealResidualExceeded(_) => 1017,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidSymbol(_) => "INVALID_SYMBOL",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidPrice(_) => "INVALID_PRICE",
            Self::InvalidFee(_) => "INVALID_FEE",
            Self::InvalidOrderOpt(_) => "INVALID_ORDER_OPT",
            Self::OperatorNotFound(_) => "OPERATOR_NOT_FOUND",
            Self::OperatorDisabled(_) => "OPERATOR_DISABLED",
            Self::OperatorAuthFailed(_) => "OPERATOR_AUTH_FAILED",
            Self::PayerAuthFailed(_) => "PAYER_AUTH_FAILED",
            Self::InsufficientBalance(_) => "INSUFFICIENT_BALANCE",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::OrderSideMismatch(_) => "ORDER_SIDE_MISMATCH",
            Self::OrderPairMismatch(_) => "ORDER_PAIR_MISMATCH",
            Self::OrderDexMismatch(_) => "ORDER_DEX_MISMATCH",
            Self::DealPriceOutOfBound(_) => "DEAL_PRICE_OUT_OF_BOUND",
            Self::DealAmountInconsistent(_) => "DEAL_AMOUNT_INCONSISTENT",
            Self::DealResidualExceeded(_) => "DEAL_RESIDUAL_EXCEEDED",
        }
    }
}

pub type DexTxResult<T> = Result<T, DexTxError>;
