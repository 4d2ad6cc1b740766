//! Structural field validators, in the same `validator`-crate style as the
//! teacher's own transaction-field validators. These catch malformed wire content
//! (a memo too long, a fee ratio above what the fixed-point scale can represent)
//! independently of the semantic `ProcessOrder` checks in `dex-core`.

use validator::{Validate, ValidationError};

use crate::amount::FEE_RATIO_SCALE;
use crate::order::MAX_MEMO_LEN;

/// - memo length should be <= `MAX_MEMO_LEN`
pub fn memo_len_validator(memo: &Vec<u8>) -> Result<(), ValidationError> {
    if memo.len() > MAX_MEMO_LEN {
        return Err(ValidationError::new("memo exceeds maximum length"));
    }
    Ok(())
}

/// - a fee ratio should be strictly less than the scale it's expressed against
///   (a ratio of 1.0 or more is not a fee, it's confiscation)
pub fn fee_ratio_validator(ratio: &u64) -> Result<(), ValidationError> {
    if *ratio >= FEE_RATIO_SCALE {
        return Err(ValidationError::new("fee ratio must be < FEE_RATIO_SCALE"));
    }
    Ok(())
}

/// - a price of 0 is never valid on the wire, even for a market order (those
///   encode price as 0 by convention but this validator applies only where a
///   nonzero price is structurally required, i.e. limit orders)
pub fn nonzero_price_validator(price: &u64) -> Result<(), ValidationError> {
    if *price == 0 {
        return Err(ValidationError::new("price must be nonzero"));
    }
    Ok(())
}

/// The subset of an extended limit order's fields worth validating structurally
/// before the semantic checks in `dex-core::order_checks` run.
#[derive(Debug, Validate)]
pub struct ExtendedLimitOrderFields {
    #[validate(custom = "memo_len_validator")]
    pub memo: Vec<u8>,
    #[validate(custom = "fee_ratio_validator")]
    pub match_fee_ratio: u64,
    #[validate(custom = "nonzero_price_validator")]
    pub price: u64,
}
